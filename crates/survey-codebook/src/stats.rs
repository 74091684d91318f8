//! Summary statistics exported as CSV.
//!
//! Continuous: `variable,n,mean,sd,min,p50,max`, one row per variable.
//! Categorical: `variable,value,n,pct`, one row per observed value, where
//! `.` is the missing bucket.
//!
//! A `.` code cell in a codebook value table is looked up in the missing
//! bucket and shows its count, rather than being treated as an unknown code
//! rendered as `-`.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{CodebookError, Result};

/// Summary of one continuous variable.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousStats {
    pub n: i64,
    pub mean: f64,
    pub sd: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

/// Continuous statistics in file order.
pub type ContinuousTable = Vec<(String, ContinuousStats)>;

/// A categorical value code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CodeKey {
    /// Numeric code, truncated to an integer.
    Int(i64),
    /// Text code.
    Text(String),
}

impl CodeKey {
    /// Key for a value read from the stats CSV.
    pub fn from_stat_value(value: &str) -> Self {
        match value.trim().parse::<f64>() {
            Ok(number) if number.is_finite() => Self::Int(number.trunc() as i64),
            _ => Self::Text(value.to_string()),
        }
    }

    /// Key for a code cell in a markdown value table.
    ///
    /// Integral numbers match integer codes; other numbers match nothing.
    pub fn from_table_cell(cell: &str) -> Option<Self> {
        if let Ok(int) = cell.parse::<i64>() {
            return Some(Self::Int(int));
        }
        match cell.parse::<f64>() {
            Ok(number) if number.is_finite() && number.fract() == 0.0 => {
                Some(Self::Int(number as i64))
            }
            Ok(_) => None,
            Err(_) => Some(Self::Text(cell.to_string())),
        }
    }
}

/// Count and percentage for one value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryCount {
    pub n: i64,
    pub pct: f64,
}

/// Value distribution of one categorical variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableCounts {
    pub missing: Option<CategoryCount>,
    pub codes: HashMap<CodeKey, CategoryCount>,
}

impl VariableCounts {
    pub fn get(&self, key: &CodeKey) -> Option<&CategoryCount> {
        self.codes.get(key)
    }

    /// Count for a table cell; `.` looks up the missing bucket.
    pub fn lookup_cell(&self, cell: &str) -> Option<&CategoryCount> {
        if cell == "." {
            return self.missing.as_ref();
        }
        CodeKey::from_table_cell(cell).and_then(|key| self.codes.get(&key))
    }

    pub fn len(&self) -> usize {
        self.codes.len() + usize::from(self.missing.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Categorical statistics keyed by variable name.
pub type CategoricalStats = HashMap<String, VariableCounts>;

#[derive(Debug, Deserialize)]
struct ContinuousRow {
    variable: String,
    n: String,
    mean: String,
    sd: String,
    min: String,
    p50: String,
    max: String,
}

#[derive(Debug, Deserialize)]
struct CategoricalRow {
    variable: String,
    value: String,
    n: String,
    pct: String,
}

/// Read continuous statistics from a CSV file.
pub fn read_continuous_stats(path: &Path) -> Result<ContinuousTable> {
    let file = open(path)?;
    parse_continuous_stats(file, path)
}

/// Parse continuous statistics; `source` names the input in errors.
pub fn parse_continuous_stats<R: Read>(reader: R, source: &Path) -> Result<ContinuousTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut table: ContinuousTable = Vec::new();
    for result in reader.deserialize::<ContinuousRow>() {
        let row = result.map_err(|e| CodebookError::CsvRead {
            path: source.to_path_buf(),
            source: e,
        })?;
        let number = |column: &'static str, value: &str| parse_number(source, &row.variable, column, value);
        let stats = ContinuousStats {
            n: number("n", &row.n)?.trunc() as i64,
            mean: number("mean", &row.mean)?,
            sd: number("sd", &row.sd)?,
            min: number("min", &row.min)?,
            median: number("p50", &row.p50)?,
            max: number("max", &row.max)?,
        };
        // A repeated variable keeps its first position and its last values.
        match table.iter_mut().find(|(name, _)| *name == row.variable) {
            Some((_, existing)) => *existing = stats,
            None => table.push((row.variable, stats)),
        }
    }
    debug!(path = %source.display(), variables = table.len(), "read continuous statistics");
    Ok(table)
}

/// Read categorical statistics from a CSV file.
pub fn read_categorical_stats(path: &Path) -> Result<CategoricalStats> {
    let file = open(path)?;
    parse_categorical_stats(file, path)
}

/// Parse categorical statistics; `source` names the input in errors.
pub fn parse_categorical_stats<R: Read>(reader: R, source: &Path) -> Result<CategoricalStats> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut stats = CategoricalStats::new();
    for result in reader.deserialize::<CategoricalRow>() {
        let row = result.map_err(|e| CodebookError::CsvRead {
            path: source.to_path_buf(),
            source: e,
        })?;
        let count = CategoryCount {
            n: parse_number(source, &row.variable, "n", &row.n)?.trunc() as i64,
            pct: parse_number(source, &row.variable, "pct", &row.pct)?,
        };
        let entry = stats.entry(row.variable).or_default();
        if row.value == "." {
            entry.missing = Some(count);
        } else {
            entry.codes.insert(CodeKey::from_stat_value(&row.value), count);
        }
    }
    debug!(path = %source.display(), variables = stats.len(), "read categorical statistics");
    Ok(stats)
}

fn open(path: &Path) -> Result<std::fs::File> {
    if !path.exists() {
        return Err(CodebookError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::File::open(path).map_err(|e| CodebookError::io("open", path, e))
}

fn parse_number(source: &Path, variable: &str, column: &'static str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| CodebookError::InvalidNumber {
            path: source.to_path_buf(),
            variable: variable.to_string(),
            column,
            value: value.to_string(),
        })
}
