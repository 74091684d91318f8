//! In-memory dataset.

use super::{DtaColumn, DtaValue};

/// A dataset: variables plus rows of values in variable order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DtaDataset {
    /// Dataset label (`<label>` in the header).
    pub label: String,
    pub columns: Vec<DtaColumn>,
    pub rows: Vec<Vec<DtaValue>>,
}

impl DtaDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(columns: Vec<DtaColumn>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn add_row(&mut self, row: Vec<DtaValue>) {
        self.rows.push(row);
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// All values of one variable, in row order.
    pub fn column_values(&self, name: &str) -> Option<Vec<&DtaValue>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().filter_map(|row| row.get(idx)).collect())
    }

    /// Bytes per observation in the `<data>` section.
    pub fn observation_width(&self) -> usize {
        self.columns.iter().map(|c| c.data_type.width()).sum()
    }
}
