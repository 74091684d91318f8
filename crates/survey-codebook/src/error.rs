use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodebookError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read CSV {path}: {source}")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: column {column} has non-numeric value '{value}' for {variable}")]
    InvalidNumber {
        path: PathBuf,
        variable: String,
        column: &'static str,
        value: String,
    },

    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, CodebookError>;

impl CodebookError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
