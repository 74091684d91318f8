use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("unknown survey '{0}' (expected prescreen, main, or followup)")]
    UnknownSurvey(String),

    /// Rows about to be dropped as metadata carry real participant identifiers.
    #[error(
        "found {count} valid participant identifier(s) in rows marked as metadata; \
         refusing to drop real respondent data"
    )]
    UnsafeDrop { count: usize },

    #[error("table error: {0}")]
    Table(String),
}

impl SurveyError {
    pub fn table(message: impl std::fmt::Display) -> Self {
        Self::Table(message.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SurveyError>;
