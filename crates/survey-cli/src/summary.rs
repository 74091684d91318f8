use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use survey_codebook::CodebookReport;
use survey_model::RowAudit;
use survey_model::fields::AUDIT_FIELDS;

use survey_cli::types::ConvertResult;

pub fn print_summary(result: &ConvertResult) {
    let summary = &result.summary;
    println!("Survey: {} ({})", summary.survey, summary.survey.description());
    let mut table = Table::new();
    table.set_header(vec![header_cell("Rows"), header_cell("Count")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Total in export"), Cell::new(summary.total_rows)]);
    table.add_row(vec![Cell::new("Real responses"), Cell::new(summary.real_rows)]);
    table.add_row(vec![
        Cell::new("Preview (flagged)"),
        count_cell(summary.preview_rows, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Metadata (dropped)"),
        count_cell(summary.dropped_rows, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Invalid identifier, not preview"),
        count_cell(summary.invalid_id_non_preview, Color::Red),
    ]);
    println!("{table}");

    if !result.dropped.is_empty() {
        println!();
        println!("Rows being dropped:");
        println!("{}", audit_table(&result.dropped));
    }

    if result.has_errors() {
        eprintln!();
        eprintln!(
            "Error: {} row(s) marked as metadata carry a valid participant identifier.",
            result.violations.len()
        );
        eprintln!("{}", audit_table(&result.violations));
        eprintln!("Nothing was written. Check the export before converting.");
        return;
    }

    if result.audit.needs_review() {
        eprintln!();
        eprintln!(
            "Warning: {} retained row(s) without a valid participant identifier \
             ({} preview, {} not preview). First {}:",
            result.audit.invalid_id_rows,
            result.audit.invalid_id_preview,
            result.audit.invalid_id_non_preview,
            result.audit.examples.len()
        );
        eprintln!("{}", audit_table(&result.audit.examples));
    }

    println!();
    match &result.output {
        Some(output) => {
            println!("Output: {}", output.path.display());
            println!(
                "  {} observations, {} variables (verified)",
                output.rows, output.columns
            );
            println!("  sha256 {}", output.checksum);
        }
        None if result.dry_run => {
            println!(
                "Dry run: {} observations, {} variables would be written",
                summary.output_rows, summary.output_columns
            );
        }
        None => {}
    }
}

pub fn print_codebook_summary(report: &CodebookReport) {
    println!("Survey: {}", report.survey);
    println!("Template: {}", report.template.display());
    println!("Codebook: {}", report.codebook.display());
    println!(
        "  {} continuous, {} categorical variables merged",
        report.continuous_variables, report.categorical_variables
    );
}

fn audit_table(rows: &[RowAudit]) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("Row")];
    header.extend(AUDIT_FIELDS.iter().map(|field| header_cell(field)));
    table.set_header(header);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for audit in rows {
        table.add_row(vec![
            Cell::new(audit.row),
            text_cell(&audit.record_id),
            text_cell(&audit.participant_id),
            text_cell(&audit.channel),
            text_cell(&audit.status),
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn text_cell(value: &str) -> Cell {
    if value.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(value)
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
