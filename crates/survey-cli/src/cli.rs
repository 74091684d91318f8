//! CLI argument definitions for survey-prep.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use survey_dta::DtaRelease;
use survey_model::Survey;

#[derive(Parser)]
#[command(
    name = "survey-prep",
    version,
    about = "Convert survey platform XML exports to Stata datasets",
    long_about = "Convert survey platform XML exports to Stata .dta datasets.\n\n\
                  Template rows carrying unresolved placeholders are removed, preview\n\
                  responses are flagged, and nothing is written if a removed row\n\
                  looks like a real participant."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include participant identifiers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert a survey export to a Stata dataset.
    Convert(ConvertArgs),

    /// Merge summary statistics into a survey codebook.
    Codebook(CodebookArgs),

    /// List the known surveys and their default files.
    Surveys,
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Survey to convert.
    #[arg(value_enum, value_name = "SURVEY")]
    pub survey: SurveyArg,

    /// Export file name inside the data directory (default: the survey's export).
    #[arg(value_name = "EXPORT_FILENAME")]
    pub export_file: Option<String>,

    /// Project root directory.
    #[arg(long = "project-dir", value_name = "DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Directory holding exports and datasets (default: <PROJECT_DIR>/data).
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output dataset path (default: <DATA_DIR>/<SURVEY>_raw.dta).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Stata file format release.
    #[arg(long = "release", value_enum, default_value = "118")]
    pub release: ReleaseArg,

    /// Run every check and report without writing the dataset.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct CodebookArgs {
    /// Survey whose codebook to build.
    #[arg(value_enum, value_name = "SURVEY", default_value = "prescreen")]
    pub survey: SurveyArg,

    /// Project root directory.
    #[arg(long = "project-dir", value_name = "DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Directory holding tables/ and docs/ (default: <PROJECT_DIR>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// CLI survey choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum SurveyArg {
    Prescreen,
    Main,
    Followup,
}

impl From<SurveyArg> for Survey {
    fn from(value: SurveyArg) -> Self {
        match value {
            SurveyArg::Prescreen => Survey::Prescreen,
            SurveyArg::Main => Survey::Main,
            SurveyArg::Followup => Survey::Followup,
        }
    }
}

/// CLI dta release choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum ReleaseArg {
    #[value(name = "118")]
    V118,
    #[value(name = "119")]
    V119,
}

impl From<ReleaseArg> for DtaRelease {
    fn from(value: ReleaseArg) -> Self {
        match value {
            ReleaseArg::V118 => DtaRelease::V118,
            ReleaseArg::V119 => DtaRelease::V119,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
