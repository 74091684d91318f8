use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::survey::Survey;

/// Row-level audit entry printed when a row needs human review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowAudit {
    /// Zero-based position in the source export.
    pub row: usize,
    pub record_id: String,
    pub participant_id: String,
    pub channel: String,
    pub status: String,
}

/// Counts reported at the end of a conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertSummary {
    pub survey: Survey,
    pub total_rows: usize,
    pub real_rows: usize,
    pub preview_rows: usize,
    pub dropped_rows: usize,
    /// Retained rows whose participant identifier is not well formed.
    pub invalid_id_rows: usize,
    /// Of those, rows that are not previews.
    pub invalid_id_non_preview: usize,
    pub output_rows: usize,
    pub output_columns: usize,
    pub output_path: Option<PathBuf>,
    /// Hex SHA-256 of the written dataset.
    pub checksum: Option<String>,
}

impl Default for ConvertSummary {
    fn default() -> Self {
        Self {
            survey: Survey::Prescreen,
            total_rows: 0,
            real_rows: 0,
            preview_rows: 0,
            dropped_rows: 0,
            invalid_id_rows: 0,
            invalid_id_non_preview: 0,
            output_rows: 0,
            output_columns: 0,
            output_path: None,
            checksum: None,
        }
    }
}
