//! Error types for dta file operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::DtaRelease;

/// Errors that can occur when reading or writing dta files.
#[derive(Debug, Error)]
pub enum DtaError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Invalid dta file structure.
    #[error("invalid dta file: {message}")]
    InvalidFormat { message: String },

    /// Release other than 118 or 119.
    #[error("unsupported dta release: {release}")]
    UnsupportedRelease { release: String },

    /// Variable name that Stata would reject.
    #[error("invalid variable name: '{name}'")]
    InvalidVariableName { name: String },

    /// Duplicate variable name.
    #[error("duplicate variable name: {name}")]
    DuplicateVariable { name: String },

    /// More variables than the release can hold.
    #[error("{count} variables exceed release {release} limit of {limit}")]
    TooManyVariables {
        count: usize,
        release: DtaRelease,
        limit: usize,
    },

    /// Fixed string width outside 1..=2045.
    #[error("variable {name} has invalid string width {width}")]
    InvalidStringWidth { name: String, width: u16 },

    /// Label longer than the field allows.
    #[error("label for '{name}' exceeds {limit} bytes")]
    LabelTooLong { name: String, limit: usize },

    /// Row length mismatch.
    #[error("row length mismatch: expected {expected}, got {actual}")]
    RowLengthMismatch { expected: usize, actual: usize },

    /// Value cannot be stored in the column's integer type.
    #[error("value {value} in row {row} does not fit {name} ({data_type})")]
    ValueOutOfRange {
        name: String,
        row: usize,
        value: f64,
        data_type: String,
    },

    /// Polars error while converting a DataFrame.
    #[cfg(feature = "polars")]
    #[error("dataframe error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for dta operations.
pub type Result<T> = std::result::Result<T, DtaError>;

impl DtaError {
    /// Create an InvalidFormat error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create an InvalidVariableName error.
    pub fn invalid_variable_name(name: impl Into<String>) -> Self {
        Self::InvalidVariableName { name: name.into() }
    }

    /// Create a DuplicateVariable error.
    pub fn duplicate_variable(name: impl Into<String>) -> Self {
        Self::DuplicateVariable { name: name.into() }
    }

    /// Create a TooManyVariables error.
    pub fn too_many_variables(count: usize, release: DtaRelease) -> Self {
        Self::TooManyVariables {
            count,
            release,
            limit: release.max_variables(),
        }
    }

    /// Create a LabelTooLong error.
    pub fn label_too_long(name: impl Into<String>, limit: usize) -> Self {
        Self::LabelTooLong {
            name: name.into(),
            limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DtaError::invalid_format("missing <map>");
        assert_eq!(format!("{err}"), "invalid dta file: missing <map>");

        let err = DtaError::too_many_variables(40_000, DtaRelease::V118);
        assert_eq!(
            format!("{err}"),
            "40000 variables exceed release 118 limit of 32767"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let dta_err: DtaError = io_err.into();
        assert!(matches!(dta_err, DtaError::Io(_)));
    }
}
