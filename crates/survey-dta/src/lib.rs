//! Stata `.dta` file writer and reader.
//!
//! This crate writes datasets in the Stata 14+ file format (release 118,
//! or 119 for very wide datasets) and reads them back for verification.
//!
//! # Features
//!
//! - Release 118 and 119, little-endian (`LSF`) byte order
//! - Fixed-width `strN` and long `strL` strings (stored as GSO records)
//! - `byte`, `int`, `long`, `float` and `double` numerics with system missing
//! - Deterministic output: no timestamp unless one is configured
//! - Optional Polars DataFrame integration (with `polars` feature)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use survey_dta::{DtaColumn, DtaDataset, DtaType, DtaValue, read_dta, write_dta};
//!
//! let mut ds = DtaDataset::with_columns(vec![
//!     DtaColumn::new("response_id", DtaType::Str(8)).with_label("Response ID"),
//!     DtaColumn::new("progress", DtaType::Double),
//! ]);
//! ds.add_row(vec![DtaValue::string("R_1"), DtaValue::number(100.0)]);
//! ds.add_row(vec![DtaValue::string("R_2"), DtaValue::missing()]);
//!
//! write_dta(Path::new("prescreen_raw.dta"), &ds).unwrap();
//! let back = read_dta(Path::new("prescreen_raw.dta")).unwrap();
//! assert_eq!(back.num_rows(), 2);
//! ```

mod error;
pub mod header;
pub mod names;
mod reader;
mod types;
mod writer;

#[cfg(feature = "polars")]
mod polars_ext;

pub use error::{DtaError, Result};

pub use types::{
    DtaColumn, DtaDataset, DtaRelease, DtaType, DtaValue, DtaWriterOptions, STR_MAX_LEN, missing,
};

pub use names::{NAME_LIMIT, is_valid_name, sanitize_name, sanitize_names};

pub use reader::{DtaReader, read_dta};

pub use writer::{DtaWriter, encode_dataset, write_dta, write_dta_with_options};

#[cfg(feature = "polars")]
pub use polars_ext::{dataframe_to_dta, write_dataframe_to_dta};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
