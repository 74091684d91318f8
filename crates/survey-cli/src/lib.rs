//! CLI library components for survey-prep.

pub mod checksum;
pub mod logging;
pub mod pipeline;
pub mod types;
