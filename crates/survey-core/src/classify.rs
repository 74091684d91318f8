//! Row classification.
//!
//! Metadata is decided first and only from the participant identifier: a
//! placeholder token always wins over preview channel or status.

use std::sync::LazyLock;

use polars::prelude::DataFrame;
use regex::Regex;
use tracing::debug;

use survey_ingest::column_strings;
use survey_model::fields::{
    DISTRIBUTION_CHANNEL, PARTICIPANT_ID, PREVIEW_CHANNEL, PREVIEW_STATUS, STATUS,
};
use survey_model::{Classification, RowClass};

/// Panel identifiers are 24 lowercase hex characters.
static PARTICIPANT_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9]{24}$").expect("Invalid participant id regex"));

/// Opening marker of an unsubstituted template token such as `{{%PROLIFIC_PID%}}`.
pub const PLACEHOLDER_OPEN: &str = "{{%";
/// Closing marker of an unsubstituted template token.
pub const PLACEHOLDER_CLOSE: &str = "%}}";

/// True when the value looks like a real panel identifier.
pub fn is_valid_participant_id(value: &str) -> bool {
    PARTICIPANT_ID_REGEX.is_match(value.trim())
}

/// True when the value still carries a template token.
pub fn is_placeholder_id(value: &str) -> bool {
    value.contains(PLACEHOLDER_OPEN) || value.contains(PLACEHOLDER_CLOSE)
}

/// Classify a single row from its identifier, channel, and status fields.
pub fn classify_row(
    participant_id: Option<&str>,
    channel: Option<&str>,
    status: Option<&str>,
) -> RowClass {
    if participant_id.is_some_and(is_placeholder_id) {
        return RowClass::Metadata;
    }
    let preview_channel = channel == Some(PREVIEW_CHANNEL);
    let preview_status = status == Some(PREVIEW_STATUS);
    if preview_channel || preview_status {
        RowClass::Preview
    } else {
        RowClass::Real
    }
}

/// Classify every row of a response table.
///
/// Absent classification columns behave as all-null.
pub fn classify_rows(df: &DataFrame) -> Classification {
    let height = df.height();
    let participant = column_or_nulls(df, PARTICIPANT_ID, height);
    let channel = column_or_nulls(df, DISTRIBUTION_CHANNEL, height);
    let status = column_or_nulls(df, STATUS, height);

    let classes: Vec<RowClass> = (0..height)
        .map(|idx| {
            classify_row(
                participant[idx].as_deref(),
                channel[idx].as_deref(),
                status[idx].as_deref(),
            )
        })
        .collect();
    let classification = Classification::new(classes);
    debug!(
        rows = classification.len(),
        real = classification.real_count(),
        preview = classification.preview_count(),
        metadata = classification.metadata_count(),
        "classified rows"
    );
    classification
}

fn column_or_nulls(df: &DataFrame, name: &str, height: usize) -> Vec<Option<String>> {
    match column_strings(df, name) {
        Some(values) => values,
        None => {
            debug!(column = name, "classification column missing, treating as null");
            vec![None; height]
        }
    }
}
