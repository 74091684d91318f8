use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::info;

use survey_cli::pipeline::convert_survey;
use survey_cli::types::{ConvertOptions, ConvertResult, ProjectPaths};
use survey_codebook::{CodebookReport, build_codebook};
use survey_model::Survey;

use crate::cli::{CodebookArgs, ConvertArgs};
use crate::summary::{apply_table_style, header_cell};

pub fn run_surveys() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Survey"),
        header_cell("Description"),
        header_cell("Export"),
        header_cell("Dataset"),
    ]);
    apply_table_style(&mut table);
    for survey in Survey::ALL {
        table.add_row(vec![
            survey.as_str().to_string(),
            survey.description().to_string(),
            survey.default_export_file().to_string(),
            survey.output_file(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_convert(args: &ConvertArgs) -> Result<ConvertResult> {
    let survey = Survey::from(args.survey);
    let mut paths = ProjectPaths::new(&args.project_dir);
    if let Some(data_dir) = &args.data_dir {
        paths = paths.with_data_dir(data_dir);
    }
    let export_path = paths.export_path(survey, args.export_file.as_deref());
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| paths.output_path(survey));
    let options = ConvertOptions::new()
        .with_release(args.release.into())
        .with_dry_run(args.dry_run);
    info!(
        survey = %survey,
        export = %export_path.display(),
        output = %output_path.display(),
        release = %options.release,
        dry_run = options.dry_run,
        "starting conversion"
    );
    convert_survey(survey, &export_path, &output_path, &options)
        .with_context(|| format!("convert {survey} survey"))
}

pub fn run_codebook(args: &CodebookArgs) -> Result<CodebookReport> {
    let survey = Survey::from(args.survey);
    let mut paths = ProjectPaths::new(&args.project_dir);
    if let Some(output_dir) = &args.output_dir {
        paths = paths.with_output_dir(output_dir);
    }
    build_codebook(survey, &paths.output_dir)
        .with_context(|| format!("build {survey} codebook"))
}
