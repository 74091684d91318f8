//! Option and result types shared by the CLI commands.

use std::path::PathBuf;

use survey_core::RetainedAudit;
use survey_dta::DtaRelease;
use survey_model::{ConvertSummary, RowAudit, Survey};

/// Directory layout of a survey project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub project_dir: PathBuf,
    /// Exports and datasets.
    pub data_dir: PathBuf,
    /// Tables and documentation.
    pub output_dir: PathBuf,
}

impl ProjectPaths {
    /// Default layout: `<project>/data` and `<project>/output`.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        Self {
            data_dir: project_dir.join("data"),
            output_dir: project_dir.join("output"),
            project_dir,
        }
    }

    #[must_use]
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Export path inside the data directory, defaulting to the survey's export.
    pub fn export_path(&self, survey: Survey, file_name: Option<&str>) -> PathBuf {
        self.data_dir
            .join(file_name.unwrap_or(survey.default_export_file()))
    }

    /// Dataset path inside the data directory.
    pub fn output_path(&self, survey: Survey) -> PathBuf {
        self.data_dir.join(survey.output_file())
    }
}

/// Options for one conversion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub release: DtaRelease,
    /// Run every check without writing the dataset.
    pub dry_run: bool,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_release(mut self, release: DtaRelease) -> Self {
        self.release = release;
        self
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// A dataset written and read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutput {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
    /// Hex SHA-256 of the file on disk.
    pub checksum: String,
}

/// Everything a conversion run reports.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    pub summary: ConvertSummary,
    /// Metadata rows removed from the output.
    pub dropped: Vec<RowAudit>,
    /// Metadata rows that carry a valid participant identifier.
    pub violations: Vec<RowAudit>,
    pub audit: RetainedAudit,
    pub output: Option<WrittenOutput>,
    pub dry_run: bool,
}

impl ConvertResult {
    /// True when the safety gate refused to write.
    pub fn has_errors(&self) -> bool {
        !self.violations.is_empty()
    }

    pub fn is_written(&self) -> bool {
        self.output.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_follows_project_dir() {
        let paths = ProjectPaths::new("/study");
        assert_eq!(paths.data_dir, PathBuf::from("/study/data"));
        assert_eq!(paths.output_dir, PathBuf::from("/study/output"));
        assert_eq!(
            paths.output_path(Survey::Followup),
            PathBuf::from("/study/data/followup_raw.dta")
        );
    }

    #[test]
    fn export_path_defaults_to_survey_export() {
        let paths = ProjectPaths::new("/study").with_data_dir("/exports");
        assert_eq!(
            paths.export_path(Survey::Main, None),
            PathBuf::from("/exports/flu_survey_main_January+8,+2026_16.30.xml")
        );
        assert_eq!(
            paths.export_path(Survey::Main, Some("other.xml")),
            PathBuf::from("/exports/other.xml")
        );
    }

    #[test]
    fn convert_options_default_to_release_118() {
        let options = ConvertOptions::new();
        assert_eq!(options.release, DtaRelease::V118);
        assert!(!options.dry_run);
        assert!(ConvertOptions::new().with_dry_run(true).dry_run);
    }
}
