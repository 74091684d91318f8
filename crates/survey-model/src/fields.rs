//! Field names and reserved values found in survey platform exports.

/// Internal record identifier assigned by the survey platform.
pub const RECORD_ID: &str = "_recordId";

/// Public name the record identifier is renamed to in the output dataset.
pub const RESPONSE_ID: &str = "response_id";

/// Participant identifier passed through from the recruiting panel.
pub const PARTICIPANT_ID: &str = "PROLIFIC_PID";

pub const DISTRIBUTION_CHANNEL: &str = "distributionChannel";

pub const STATUS: &str = "status";

/// Indicator column added to every retained row (1 = preview response).
pub const IS_PREVIEW: &str = "is_preview";

/// Distribution channel value used for instrument previews.
pub const PREVIEW_CHANNEL: &str = "preview";

/// Status value used for instrument previews.
pub const PREVIEW_STATUS: &str = "Survey Preview";

/// Text columns coerced to numeric before writing.
pub const NUMERIC_FIELDS: &[&str] = &["progress", "duration"];

/// Columns shown when auditing individual rows.
pub const AUDIT_FIELDS: &[&str] = &[RECORD_ID, PARTICIPANT_ID, DISTRIBUTION_CHANNEL, STATUS];
