//! Core types for dta file handling.
//!
//! This module provides the data structures for representing dta
//! datasets, variables, values, and writer options.

mod column;
mod dataset;
pub mod missing;
mod options;
mod value;

pub use column::{DtaColumn, DtaType, STR_MAX_LEN};
pub use dataset::DtaDataset;
pub use options::{DtaRelease, DtaWriterOptions};
pub use value::DtaValue;
