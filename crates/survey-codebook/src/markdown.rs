//! Markdown codebook rewriting.
//!
//! All functions take and return the whole document; lines are split on
//! `\n` and joined back unchanged apart from the edits.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::Result;
use crate::format::{format_grouped, format_n_pct};
use crate::stats::{CategoricalStats, CodeKey, ContinuousStats, VariableCounts};

static VARIABLE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^### `(\w+)`").expect("Invalid variable header regex"));

const VALUE_TABLE_HEADER: &str = "| Code | Label |";
const INDICATOR_HEADER: &str = "| Variable | Label |";
const INDICATOR_SEPARATOR: &str = "|----------|-------|";
const INDICATOR_HEADER_WITH_STATS: &str = "| Variable | Label | N (%) Yes |";
const INDICATOR_SEPARATOR_WITH_STATS: &str = "|----------|-------|-----------|";

/// Add an `N (%)` column to a `| Code | Label |` table.
///
/// The first line is the header, the second the separator; every further
/// row gets the count for its code, or `-` when there is none.
pub fn update_value_table<S: AsRef<str>>(lines: &[S], stats: &VariableCounts) -> Vec<String> {
    if lines.len() < 3 {
        return lines.iter().map(|l| l.as_ref().to_string()).collect();
    }
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let line = line.as_ref();
            match idx {
                0 => format!("{} N (%) |", line.trim_end()),
                1 => format!("{}-------|", line.trim_end()),
                _ => {
                    let parts: Vec<&str> = line.split('|').collect();
                    if parts.len() < 3 {
                        return line.to_string();
                    }
                    let cell = parts[1].trim();
                    let n_pct = stats
                        .lookup_cell(cell)
                        .map_or_else(|| "-".to_string(), |c| format_n_pct(c.n, c.pct));
                    format!("{} {n_pct} |", line.trim_end())
                }
            }
        })
        .collect()
}

/// Add counts to every value table of a variable with categorical stats.
///
/// A table starts at a line that is exactly `| Code | Label |` (ignoring
/// surrounding whitespace) below a `` ### `name` `` header, and runs over
/// the following lines that start with `|`. Tables that already carry an
/// `N (%)` column do not match, so running this twice changes nothing.
pub fn find_and_update_tables(content: &str, stats: &CategoricalStats) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut current: Option<&str> = None;
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx];
        if let Some(caps) = VARIABLE_HEADER.captures(line) {
            current = caps.get(1).map(|m| m.as_str());
            out.push(line.to_string());
            idx += 1;
            continue;
        }

        let var_stats = current.and_then(|name| stats.get(name));
        if let Some(var_stats) = var_stats
            && line.trim() == VALUE_TABLE_HEADER
        {
            let start = idx;
            while idx < lines.len() && lines[idx].trim().starts_with('|') {
                idx += 1;
            }
            out.extend(update_value_table(&lines[start..idx], var_stats));
            continue;
        }

        out.push(line.to_string());
        idx += 1;
    }

    out.join("\n")
}

/// Add a `N (%) Yes` column to the binary indicator table.
///
/// Only applies when a `| Variable | Label |` header is directly followed
/// by its separator. Each listed indicator's row gets the count of code 1.
pub fn update_binary_indicator_table(
    content: &str,
    stats: &CategoricalStats,
    indicators: &[&str],
) -> Result<String> {
    let block = format!("{INDICATOR_HEADER}\n{INDICATOR_SEPARATOR}");
    if !content.contains(&block) {
        return Ok(content.to_string());
    }

    let mut updated = content
        .split('\n')
        .map(|line| match line {
            INDICATOR_HEADER => INDICATOR_HEADER_WITH_STATS,
            INDICATOR_SEPARATOR => INDICATOR_SEPARATOR_WITH_STATS,
            other => other,
        })
        .collect::<Vec<_>>()
        .join("\n");

    for name in indicators {
        let Some(count) = stats.get(*name).and_then(|v| v.get(&CodeKey::Int(1))) else {
            continue;
        };
        let n_pct = format_n_pct(count.n, count.pct);
        let row = Regex::new(&format!(r"(\| `{}` \| [^|]+ \|)", regex::escape(name)))?;
        updated = row
            .replace_all(&updated, |caps: &Captures<'_>| format!("{} {n_pct} |", &caps[1]))
            .into_owned();
    }
    Ok(updated)
}

/// Insert a summary statistics table after each variable's label line.
pub fn add_continuous_stats(content: &str, stats: &[(String, ContinuousStats)]) -> Result<String> {
    let mut updated = content.to_string();
    for (name, values) in stats {
        let pattern = Regex::new(&format!(
            r"(?s)(### `{}`\n.*?- \*\*Label:\*\* [^\n]+)",
            regex::escape(name)
        ))?;
        let table = summary_table(values);
        updated = pattern
            .replace_all(&updated, |caps: &Captures<'_>| format!("{}{table}", &caps[1]))
            .into_owned();
    }
    Ok(updated)
}

fn summary_table(stats: &ContinuousStats) -> String {
    format!(
        "\n- **Summary Statistics (N={}):**\n\
         \n\
         | Statistic | Value |\n\
         |-----------|-------|\n\
         | Mean | {} |\n\
         | SD | {} |\n\
         | Min | {} |\n\
         | Median | {} |\n\
         | Max | {} |",
        format_grouped(stats.n as f64, 0),
        format_grouped(stats.mean, 1),
        format_grouped(stats.sd, 1),
        format_grouped(stats.min, 0),
        format_grouped(stats.median, 0),
        format_grouped(stats.max, 0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::CategoryCount;

    fn counts(entries: &[(i64, i64, f64)]) -> VariableCounts {
        let mut counts = VariableCounts::default();
        for (code, n, pct) in entries {
            counts
                .codes
                .insert(CodeKey::Int(*code), CategoryCount { n: *n, pct: *pct });
        }
        counts
    }

    #[test]
    fn value_table_gets_counts() {
        let lines = ["| Code | Label |", "|------|-------|", "| 0 | No |", "| 1 | Yes |", "| 9 | Unsure |"];
        let stats = counts(&[(0, 4413, 56.05), (1, 3435, 43.63)]);
        let out = update_value_table(&lines, &stats);
        assert_eq!(
            out,
            vec![
                "| Code | Label | N (%) |",
                "|------|-------|-------|",
                "| 0 | No | 4,413 (56.05%) |",
                "| 1 | Yes | 3,435 (43.63%) |",
                "| 9 | Unsure | - |",
            ]
        );
    }

    #[test]
    fn short_tables_are_unchanged() {
        let lines = ["| Code | Label |", "|------|-------|"];
        let out = update_value_table(&lines, &VariableCounts::default());
        assert_eq!(out, lines);
    }

    #[test]
    fn rows_without_cells_are_unchanged() {
        let lines = ["| Code | Label |", "|------|-------|", "| orphan"];
        let out = update_value_table(&lines, &VariableCounts::default());
        assert_eq!(out[2], "| orphan");
    }

    #[test]
    fn missing_bucket_matches_dot_code() {
        let mut stats = counts(&[]);
        stats.missing = Some(CategoryCount { n: 25, pct: 0.32 });
        let lines = ["| Code | Label |", "|------|-------|", "| . | Missing |"];
        let out = update_value_table(&lines, &stats);
        assert_eq!(out[2], "| . | Missing | 25 (0.32%) |");
    }

    #[test]
    fn summary_table_formats_values() {
        let table = summary_table(&ContinuousStats {
            n: 7848,
            mean: 41.234,
            sd: 12.56,
            min: 18.0,
            median: 40.0,
            max: 1234.0,
        });
        assert!(table.starts_with("\n- **Summary Statistics (N=7,848):**\n\n"));
        assert!(table.contains("| Mean | 41.2 |"));
        assert!(table.contains("| SD | 12.6 |"));
        assert!(table.ends_with("| Max | 1,234 |"));
    }
}
