pub mod error;
pub mod polars_utils;
pub mod xml;

pub use error::{IngestError, Result};
pub use polars_utils::{
    any_to_string, any_to_string_opt, column_strings, parse_f64,
};
pub use xml::{RESPONSE_ELEMENT, ResponseExport, read_response_export, read_response_export_str};
