//! Turn a classified response table into the table that gets written.

use polars::prelude::{BooleanChunked, DataFrame, NamedFrom, NewChunkedArray, Series};
use tracing::{debug, info};

use survey_ingest::{column_strings, parse_f64};
use survey_model::fields::{IS_PREVIEW, NUMERIC_FIELDS, RECORD_ID, RESPONSE_ID};
use survey_model::{Classification, ConvertSummary, Result, Survey, SurveyError};

use crate::safety::RetainedAudit;

/// Drop metadata rows, flag previews, rename the record id, coerce numerics.
pub fn prepare_output(df: &DataFrame, classification: &Classification) -> Result<DataFrame> {
    let mut out = drop_metadata_rows(df, classification)?;
    let retained_preview: Vec<bool> = classification
        .classes()
        .iter()
        .filter(|class| !class.is_metadata())
        .map(|class| class.is_preview())
        .collect();
    add_preview_flag(&mut out, &retained_preview)?;
    rename_record_id(&mut out)?;
    coerce_numeric_columns(&mut out, NUMERIC_FIELDS)?;
    info!(
        rows = out.height(),
        columns = out.width(),
        dropped = df.height() - out.height(),
        "prepared output table"
    );
    Ok(out)
}

/// Remove metadata rows, keeping source order.
pub fn drop_metadata_rows(df: &DataFrame, classification: &Classification) -> Result<DataFrame> {
    ensure_same_height(df, classification.len())?;
    let mask = BooleanChunked::from_slice("retain".into(), &classification.retained_mask());
    df.filter(&mask).map_err(SurveyError::table)
}

/// Add (or replace) the 0/1 `is_preview` column.
pub fn add_preview_flag(df: &mut DataFrame, preview: &[bool]) -> Result<()> {
    if df.width() > 0 {
        ensure_same_height(df, preview.len())?;
    }
    let values: Vec<i32> = preview.iter().map(|flag| i32::from(*flag)).collect();
    let series = Series::new(IS_PREVIEW.into(), values);
    df.with_column(series).map_err(SurveyError::table)?;
    Ok(())
}

/// Rename the platform's internal record id to its public name.
pub fn rename_record_id(df: &mut DataFrame) -> Result<()> {
    if df.column(RECORD_ID).is_err() {
        debug!(column = RECORD_ID, "record id column missing, nothing to rename");
        return Ok(());
    }
    if df.column(RESPONSE_ID).is_ok() {
        return Err(SurveyError::Table(format!(
            "cannot rename {RECORD_ID}: column {RESPONSE_ID} already exists"
        )));
    }
    df.rename(RECORD_ID, RESPONSE_ID.into())
        .map_err(SurveyError::table)?;
    Ok(())
}

/// Convert text columns to Float64; unparseable cells become null.
pub fn coerce_numeric_columns(df: &mut DataFrame, columns: &[&str]) -> Result<()> {
    for name in columns {
        let Some(values) = column_strings(df, name) else {
            continue;
        };
        let mut unparsed = 0usize;
        let numbers: Vec<Option<f64>> = values
            .iter()
            .map(|value| {
                let parsed = value.as_deref().and_then(parse_f64);
                if parsed.is_none() && value.as_deref().is_some_and(|v| !v.trim().is_empty()) {
                    unparsed += 1;
                }
                parsed
            })
            .collect();
        if unparsed > 0 {
            debug!(column = name, unparsed, "non-numeric values set to missing");
        }
        df.with_column(Series::new((*name).into(), numbers))
            .map_err(SurveyError::table)?;
    }
    Ok(())
}

/// Build the run summary from the stages' results.
pub fn summarize(
    survey: Survey,
    classification: &Classification,
    audit: &RetainedAudit,
    output: &DataFrame,
) -> ConvertSummary {
    ConvertSummary {
        survey,
        total_rows: classification.len(),
        real_rows: classification.real_count(),
        preview_rows: classification.preview_count(),
        dropped_rows: classification.metadata_count(),
        invalid_id_rows: audit.invalid_id_rows,
        invalid_id_non_preview: audit.invalid_id_non_preview,
        output_rows: output.height(),
        output_columns: output.width(),
        output_path: None,
        checksum: None,
    }
}

fn ensure_same_height(df: &DataFrame, expected: usize) -> Result<()> {
    if df.height() == expected {
        Ok(())
    } else {
        Err(SurveyError::Table(format!(
            "expected {expected} rows, table has {}",
            df.height()
        )))
    }
}
