//! Codebook merging.
//!
//! Statistics exported from Stata as CSV are merged into a markdown
//! codebook template:
//!
//! - value tables (`| Code | Label |`) gain an `N (%)` column
//! - the binary indicator table (`| Variable | Label |`) gains `N (%) Yes`
//! - continuous variables gain a summary statistics table

mod build;
mod error;
pub mod format;
pub mod markdown;
pub mod stats;

pub use build::{CodebookReport, build_codebook, merge_codebook};
pub use error::{CodebookError, Result};
pub use format::{format_grouped, format_n_pct};
pub use markdown::{
    add_continuous_stats, find_and_update_tables, update_binary_indicator_table,
    update_value_table,
};
pub use stats::{
    CategoricalStats, CategoryCount, CodeKey, ContinuousStats, ContinuousTable, VariableCounts,
    read_categorical_stats, read_continuous_stats,
};
