pub mod classification;
pub mod error;
pub mod fields;
pub mod summary;
pub mod survey;

pub use classification::{Classification, RowClass};
pub use error::{Result, SurveyError};
pub use summary::{ConvertSummary, RowAudit};
pub use survey::{CodebookPaths, Survey};
