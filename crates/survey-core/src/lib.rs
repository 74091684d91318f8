//! Core processing for survey exports.
//!
//! The pipeline is a single pass over the response table:
//!
//! 1. [`classify::classify_rows`] labels every row as real, preview, or
//!    placeholder metadata.
//! 2. [`safety::check_metadata_rows`] refuses to continue when a row about to
//!    be dropped carries a well-formed participant identifier.
//! 3. [`prepare::prepare_output`] drops metadata rows, flags previews,
//!    renames the record identifier, and coerces numeric columns.

pub mod classify;
pub mod prepare;
pub mod safety;

pub use classify::{classify_row, classify_rows, is_placeholder_id, is_valid_participant_id};
pub use prepare::{
    add_preview_flag, coerce_numeric_columns, drop_metadata_rows, prepare_output,
    rename_record_id, summarize,
};
pub use safety::{
    AUDIT_EXAMPLE_LIMIT, RetainedAudit, SafetyCheck, audit_retained_rows, check_metadata_rows,
};
