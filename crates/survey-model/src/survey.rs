//! The fixed set of surveys handled by this project and their file naming.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SurveyError;

/// One of the three survey waves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Survey {
    Prescreen,
    Main,
    Followup,
}

impl Survey {
    pub const ALL: [Survey; 3] = [Survey::Prescreen, Survey::Main, Survey::Followup];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prescreen => "prescreen",
            Self::Main => "main",
            Self::Followup => "followup",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Prescreen => "Vaccination side-effects prescreen",
            Self::Main => "Flu survey main wave",
            Self::Followup => "Flu vaccination side-effects follow-up",
        }
    }

    /// Export filename used when none is given on the command line.
    pub fn default_export_file(self) -> &'static str {
        match self {
            Self::Prescreen => "vacc_se_prescreen_full_January+8,+2026_16.33.xml",
            Self::Main => "flu_survey_main_January+8,+2026_16.30.xml",
            Self::Followup => "flu_vacc_se_followup_January+8,+2026_18.39.xml",
        }
    }

    /// Dataset filename written next to the export.
    pub fn output_file(self) -> String {
        format!("{}_raw.dta", self.as_str())
    }

    /// Binary indicator variables listed in the codebook's `| Variable | Label |` table.
    ///
    /// Only the prescreen codebook carries that table.
    pub fn binary_indicators(self) -> &'static [&'static str] {
        match self {
            Self::Prescreen => &[
                "source_doctor",
                "source_sm",
                "source_podcasts",
                "source_cdc",
                "source_news",
                "source_none",
            ],
            Self::Main | Self::Followup => &[],
        }
    }

    /// Codebook inputs and output under the project's output directory.
    pub fn codebook_paths(self, output_dir: &Path) -> CodebookPaths {
        let tables = output_dir.join("tables");
        let docs = output_dir.join("docs");
        let stem = match self {
            Self::Prescreen => "stats".to_string(),
            Self::Main | Self::Followup => format!("stats_{}", self.as_str()),
        };
        CodebookPaths {
            continuous_stats: tables.join(format!("{stem}_continuous.csv")),
            categorical_stats: tables.join(format!("{stem}_categorical.csv")),
            template: docs.join(format!("{}_codebook_template.md", self.as_str())),
            codebook: docs.join(format!("{}_codebook.md", self.as_str())),
        }
    }
}

impl fmt::Display for Survey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Survey {
    type Err = SurveyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|survey| survey.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| SurveyError::UnknownSurvey(value.to_string()))
    }
}

/// File locations used when building a codebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodebookPaths {
    pub continuous_stats: PathBuf,
    pub categorical_stats: PathBuf,
    pub template: PathBuf,
    pub codebook: PathBuf,
}
