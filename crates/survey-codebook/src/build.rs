//! Reading inputs and writing the merged codebook.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, info_span};

use survey_model::Survey;

use crate::error::{CodebookError, Result};
use crate::markdown::{add_continuous_stats, find_and_update_tables, update_binary_indicator_table};
use crate::stats::{CategoricalStats, ContinuousTable, read_categorical_stats, read_continuous_stats};

/// What a codebook build read and wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodebookReport {
    pub survey: Survey,
    pub continuous_variables: usize,
    pub categorical_variables: usize,
    pub template: PathBuf,
    pub codebook: PathBuf,
}

/// Apply every codebook edit to a template.
///
/// Order: value tables, then the indicator table (when `indicators` is not
/// empty), then continuous summaries. CRLF line endings are converted to LF
/// first, so the output always uses LF.
pub fn merge_codebook(
    template: &str,
    continuous: &ContinuousTable,
    categorical: &CategoricalStats,
    indicators: &[&str],
) -> Result<String> {
    let template = template.replace("\r\n", "\n");
    let mut content = find_and_update_tables(&template, categorical);
    if !indicators.is_empty() {
        content = update_binary_indicator_table(&content, categorical, indicators)?;
    }
    add_continuous_stats(&content, continuous)
}

/// Build `<survey>_codebook.md` from its template and statistics under
/// `output_dir`.
pub fn build_codebook(survey: Survey, output_dir: &Path) -> Result<CodebookReport> {
    let span = info_span!("codebook", survey = %survey);
    let _guard = span.enter();
    let start = Instant::now();

    let paths = survey.codebook_paths(output_dir);
    let continuous = read_continuous_stats(&paths.continuous_stats)?;
    let categorical = read_categorical_stats(&paths.categorical_stats)?;
    info!(
        continuous = continuous.len(),
        categorical = categorical.len(),
        "read statistics"
    );

    if !paths.template.exists() {
        return Err(CodebookError::FileNotFound {
            path: paths.template.clone(),
        });
    }
    let template = fs::read_to_string(&paths.template)
        .map_err(|e| CodebookError::io("read", &paths.template, e))?;

    let content = merge_codebook(
        &template,
        &continuous,
        &categorical,
        survey.binary_indicators(),
    )?;

    if let Some(parent) = paths.codebook.parent() {
        fs::create_dir_all(parent).map_err(|e| CodebookError::io("create", parent, e))?;
    }
    fs::write(&paths.codebook, content)
        .map_err(|e| CodebookError::io("write", &paths.codebook, e))?;

    info!(
        path = %paths.codebook.display(),
        duration_ms = start.elapsed().as_millis(),
        "codebook written"
    );

    Ok(CodebookReport {
        survey,
        continuous_variables: continuous.len(),
        categorical_variables: categorical.len(),
        template: paths.template,
        codebook: paths.codebook,
    })
}
