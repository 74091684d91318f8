//! Per-row classification of an export.

use serde::{Deserialize, Serialize};

/// Exactly one class applies to every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowClass {
    /// Genuine panel response.
    Real,
    /// Response recorded while previewing the instrument. Kept and flagged.
    Preview,
    /// Template row carrying a placeholder identifier. Dropped.
    Metadata,
}

impl RowClass {
    pub fn is_preview(self) -> bool {
        matches!(self, Self::Preview)
    }

    pub fn is_metadata(self) -> bool {
        matches!(self, Self::Metadata)
    }
}

/// Row classes in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    classes: Vec<RowClass>,
}

impl Classification {
    pub fn new(classes: Vec<RowClass>) -> Self {
        Self { classes }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> &[RowClass] {
        &self.classes
    }

    pub fn get(&self, row: usize) -> Option<RowClass> {
        self.classes.get(row).copied()
    }

    pub fn is_preview(&self) -> Vec<bool> {
        self.classes.iter().map(|class| class.is_preview()).collect()
    }

    pub fn is_metadata(&self) -> Vec<bool> {
        self.classes.iter().map(|class| class.is_metadata()).collect()
    }

    /// Mask of rows that survive into the output dataset.
    pub fn retained_mask(&self) -> Vec<bool> {
        self.classes.iter().map(|class| !class.is_metadata()).collect()
    }

    pub fn count(&self, class: RowClass) -> usize {
        self.classes.iter().filter(|c| **c == class).count()
    }

    pub fn real_count(&self) -> usize {
        self.count(RowClass::Real)
    }

    pub fn preview_count(&self) -> usize {
        self.count(RowClass::Preview)
    }

    pub fn metadata_count(&self) -> usize {
        self.count(RowClass::Metadata)
    }

    pub fn retained_count(&self) -> usize {
        self.len() - self.metadata_count()
    }

    /// Row indices of the given class.
    pub fn rows_of(&self, class: RowClass) -> impl Iterator<Item = usize> + '_ {
        self.classes
            .iter()
            .enumerate()
            .filter(move |(_, c)| **c == class)
            .map(|(idx, _)| idx)
    }
}
