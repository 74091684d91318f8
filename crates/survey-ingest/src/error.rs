use std::path::{Path, PathBuf};

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while loading an export.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML in {path} near byte {position}: {message}")]
    Xml {
        path: PathBuf,
        position: u64,
        message: String,
    },

    #[error("failed to build response table: {0}")]
    Table(#[from] PolarsError),
}

impl IngestError {
    pub fn xml(path: &Path, position: u64, message: impl std::fmt::Display) -> Self {
        Self::Xml {
            path: path.to_path_buf(),
            position,
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
