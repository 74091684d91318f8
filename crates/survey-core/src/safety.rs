//! Safety checks run before anything is written.
//!
//! Dropping a row is only allowed when it cannot be a real respondent. The
//! metadata check is fatal; the retained-row audit is advisory.

use polars::prelude::DataFrame;
use tracing::{info, warn};

use survey_ingest::column_strings;
use survey_model::fields::{DISTRIBUTION_CHANNEL, PARTICIPANT_ID, RECORD_ID, STATUS};
use survey_model::{Classification, Result, RowAudit, RowClass, SurveyError};

use crate::classify::is_valid_participant_id;

/// Maximum number of rows listed by the retained-row audit.
pub const AUDIT_EXAMPLE_LIMIT: usize = 10;

/// Outcome of checking the rows scheduled for removal.
#[derive(Debug, Clone, Default)]
pub struct SafetyCheck {
    /// Every metadata row, in source order.
    pub dropped: Vec<RowAudit>,
    /// Metadata rows whose identifier looks like a real participant.
    pub violations: Vec<RowAudit>,
}

impl SafetyCheck {
    pub fn is_safe(&self) -> bool {
        self.violations.is_empty()
    }

    /// Fail when any metadata row carries a valid participant identifier.
    pub fn ensure_safe(&self) -> Result<()> {
        if self.is_safe() {
            Ok(())
        } else {
            Err(SurveyError::UnsafeDrop {
                count: self.violations.len(),
            })
        }
    }
}

/// Advisory audit of rows that will be written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetainedAudit {
    /// Retained rows without a valid participant identifier.
    pub invalid_id_rows: usize,
    /// Of those, rows flagged as preview.
    pub invalid_id_preview: usize,
    /// Of those, rows not flagged as preview.
    pub invalid_id_non_preview: usize,
    /// First non-preview rows without a valid identifier.
    pub examples: Vec<RowAudit>,
}

impl RetainedAudit {
    pub fn needs_review(&self) -> bool {
        self.invalid_id_non_preview > 0
    }
}

/// Re-check every metadata row for a well-formed participant identifier.
pub fn check_metadata_rows(df: &DataFrame, classification: &Classification) -> SafetyCheck {
    let columns = AuditColumns::new(df);
    let mut check = SafetyCheck::default();
    for row in classification.rows_of(RowClass::Metadata) {
        let audit = columns.audit(row);
        if is_valid_participant_id(&audit.participant_id) {
            check.violations.push(audit.clone());
        }
        check.dropped.push(audit);
    }
    if check.is_safe() {
        info!(dropped = check.dropped.len(), "safety check passed");
    } else {
        warn!(
            dropped = check.dropped.len(),
            violations = check.violations.len(),
            "valid participant identifiers found in metadata rows"
        );
    }
    check
}

/// Count retained rows that lack a valid participant identifier.
pub fn audit_retained_rows(df: &DataFrame, classification: &Classification) -> RetainedAudit {
    let columns = AuditColumns::new(df);
    let mut audit = RetainedAudit::default();
    for (row, class) in classification.classes().iter().enumerate() {
        if class.is_metadata() {
            continue;
        }
        if is_valid_participant_id(columns.participant_id(row)) {
            continue;
        }
        audit.invalid_id_rows += 1;
        if class.is_preview() {
            audit.invalid_id_preview += 1;
            continue;
        }
        audit.invalid_id_non_preview += 1;
        if audit.examples.len() < AUDIT_EXAMPLE_LIMIT {
            audit.examples.push(columns.audit(row));
        }
    }
    if audit.needs_review() {
        warn!(
            invalid_id_rows = audit.invalid_id_rows,
            non_preview = audit.invalid_id_non_preview,
            "non-preview rows without a valid participant identifier"
        );
    }
    audit
}

/// Audit fields pulled once from the table.
struct AuditColumns {
    record_id: Option<Vec<Option<String>>>,
    participant_id: Option<Vec<Option<String>>>,
    channel: Option<Vec<Option<String>>>,
    status: Option<Vec<Option<String>>>,
}

impl AuditColumns {
    fn new(df: &DataFrame) -> Self {
        Self {
            record_id: column_strings(df, RECORD_ID),
            participant_id: column_strings(df, PARTICIPANT_ID),
            channel: column_strings(df, DISTRIBUTION_CHANNEL),
            status: column_strings(df, STATUS),
        }
    }

    fn participant_id(&self, row: usize) -> &str {
        cell(self.participant_id.as_ref(), row)
    }

    fn audit(&self, row: usize) -> RowAudit {
        RowAudit {
            row,
            record_id: cell(self.record_id.as_ref(), row).to_string(),
            participant_id: self.participant_id(row).to_string(),
            channel: cell(self.channel.as_ref(), row).to_string(),
            status: cell(self.status.as_ref(), row).to_string(),
        }
    }
}

fn cell(values: Option<&Vec<Option<String>>>, row: usize) -> &str {
    values
        .and_then(|values| values.get(row))
        .and_then(|value| value.as_deref())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_safe_reports_violation_count() {
        let audit = RowAudit {
            row: 0,
            record_id: "R_1".to_string(),
            participant_id: "5f1a2b3c4d5e6f7a8b9c0d1e".to_string(),
            channel: "anonymous".to_string(),
            status: "IP Address".to_string(),
        };
        let check = SafetyCheck {
            dropped: vec![audit.clone()],
            violations: vec![audit],
        };
        let err = check.ensure_safe().unwrap_err();
        assert!(matches!(err, SurveyError::UnsafeDrop { count: 1 }));
    }

    #[test]
    fn empty_check_is_safe() {
        assert!(SafetyCheck::default().ensure_safe().is_ok());
    }
}
