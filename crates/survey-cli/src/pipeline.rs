//! Conversion pipeline stages.
//!
//! Each stage runs inside its own `tracing` span and reports `duration_ms`
//! on completion. [`convert_survey`] chains them; the stage functions are
//! public so callers can supply their own classification.

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use polars::prelude::DataFrame;
use tracing::{error, info, info_span, warn};

use survey_core::{
    RetainedAudit, SafetyCheck, audit_retained_rows, check_metadata_rows, classify_rows,
    prepare_output, summarize,
};
use survey_dta::{DtaWriterOptions, dataframe_to_dta, encode_dataset, read_dta};
use survey_ingest::{ResponseExport, read_response_export};
use survey_model::{Classification, Survey};

use crate::checksum::{compute_file_sha256, sha256_hex};
use crate::logging::redact_value;
use crate::types::{ConvertOptions, ConvertResult, WrittenOutput};

/// Load the export into a response table.
pub fn ingest_export(path: &Path) -> Result<ResponseExport> {
    let span = info_span!("ingest", path = %path.display());
    let _guard = span.enter();
    let start = Instant::now();
    let export = read_response_export(path)
        .with_context(|| format!("read survey export {}", path.display()))?;
    info!(
        responses = export.response_count(),
        fields = export.field_count(),
        duration_ms = start.elapsed().as_millis(),
        "ingest complete"
    );
    Ok(export)
}

/// Label every row as real, preview, or metadata.
pub fn classify_export(df: &DataFrame) -> Classification {
    let span = info_span!("classify");
    let _guard = span.enter();
    let start = Instant::now();
    let classification = classify_rows(df);
    info!(
        real = classification.real_count(),
        preview = classification.preview_count(),
        metadata = classification.metadata_count(),
        duration_ms = start.elapsed().as_millis(),
        "classify complete"
    );
    classification
}

/// Check dropped rows for real identifiers and audit the retained rows.
pub fn run_safety_checks(
    df: &DataFrame,
    classification: &Classification,
) -> (SafetyCheck, RetainedAudit) {
    let span = info_span!("safety");
    let _guard = span.enter();
    let start = Instant::now();
    let check = check_metadata_rows(df, classification);
    for violation in &check.violations {
        error!(
            row = violation.row,
            record_id = %violation.record_id,
            participant_id = redact_value(&violation.participant_id),
            channel = %violation.channel,
            "metadata row carries a valid participant identifier"
        );
    }
    let audit = audit_retained_rows(df, classification);
    for example in &audit.examples {
        warn!(
            row = example.row,
            record_id = %example.record_id,
            participant_id = redact_value(&example.participant_id),
            "retained row without a valid participant identifier"
        );
    }
    info!(
        dropped = check.dropped.len(),
        violations = check.violations.len(),
        invalid_id_rows = audit.invalid_id_rows,
        duration_ms = start.elapsed().as_millis(),
        "safety checks complete"
    );
    (check, audit)
}

/// Encode the output table, write it, and verify it by reading it back.
///
/// With `dry_run` the file is encoded but not written and `None` is returned.
pub fn write_output(
    df: &DataFrame,
    path: &Path,
    options: &DtaWriterOptions,
    dry_run: bool,
) -> Result<Option<WrittenOutput>> {
    let span = info_span!("write", path = %path.display(), release = %options.release);
    let _guard = span.enter();
    let start = Instant::now();
    let dataset = dataframe_to_dta(df, options).context("convert table to dta")?;
    let bytes = encode_dataset(&dataset, options).context("encode dta file")?;
    if dry_run {
        info!(
            bytes = bytes.len(),
            duration_ms = start.elapsed().as_millis(),
            "dry run, dataset not written"
        );
        return Ok(None);
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output directory {}", parent.display()))?;
    }
    fs::write(path, &bytes).with_context(|| format!("write {}", path.display()))?;

    let written = read_dta(path).with_context(|| format!("read back {}", path.display()))?;
    if written.num_rows() != dataset.num_rows() || written.num_columns() != dataset.num_columns()
    {
        bail!(
            "verification failed for {}: expected {} observations and {} variables, found {} and {}",
            path.display(),
            dataset.num_rows(),
            dataset.num_columns(),
            written.num_rows(),
            written.num_columns()
        );
    }
    let checksum = compute_file_sha256(path)?;
    if checksum != sha256_hex(&bytes) {
        bail!("checksum mismatch after writing {}", path.display());
    }
    info!(
        observations = written.num_rows(),
        variables = written.num_columns(),
        sha256 = %checksum,
        duration_ms = start.elapsed().as_millis(),
        "write complete"
    );
    Ok(Some(WrittenOutput {
        path: path.to_path_buf(),
        rows: written.num_rows(),
        columns: written.num_columns(),
        checksum,
    }))
}

/// Run safety checks, preparation, and writing on a classified table.
///
/// A failed safety check returns a result carrying the violations and
/// writes nothing.
pub fn convert_classified(
    survey: Survey,
    df: &DataFrame,
    classification: &Classification,
    output_path: &Path,
    options: &ConvertOptions,
) -> Result<ConvertResult> {
    let (check, audit) = run_safety_checks(df, classification);
    if let Err(err) = check.ensure_safe() {
        error!(survey = %survey, "{err}");
        let summary = summarize(survey, classification, &audit, &DataFrame::empty());
        return Ok(ConvertResult {
            summary,
            dropped: check.dropped,
            violations: check.violations,
            audit,
            output: None,
            dry_run: options.dry_run,
        });
    }

    let prepared = prepare_output(df, classification).context("prepare output table")?;
    let mut summary = summarize(survey, classification, &audit, &prepared);
    let dta_options = DtaWriterOptions::new()
        .with_release(options.release)
        .with_data_label(format!("{} (raw)", survey.description()));
    let output = write_output(&prepared, output_path, &dta_options, options.dry_run)?;
    if let Some(written) = &output {
        summary.output_path = Some(written.path.clone());
        summary.checksum = Some(written.checksum.clone());
    }
    Ok(ConvertResult {
        summary,
        dropped: check.dropped,
        violations: check.violations,
        audit,
        output,
        dry_run: options.dry_run,
    })
}

/// Convert one survey export to a dta dataset.
pub fn convert_survey(
    survey: Survey,
    export_path: &Path,
    output_path: &Path,
    options: &ConvertOptions,
) -> Result<ConvertResult> {
    let span = info_span!("convert", survey = %survey);
    let _guard = span.enter();
    let start = Instant::now();
    let export = ingest_export(export_path)?;
    let classification = classify_export(&export.frame);
    let result = convert_classified(
        survey,
        &export.frame,
        &classification,
        output_path,
        options,
    )?;
    info!(
        rows = result.summary.output_rows,
        written = result.is_written(),
        duration_ms = start.elapsed().as_millis(),
        "convert complete"
    );
    Ok(result)
}
