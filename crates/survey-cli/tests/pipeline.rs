//! End-to-end tests for the conversion pipeline.

use std::fs;
use std::path::Path;

use survey_cli::pipeline::{convert_classified, convert_survey, ingest_export, write_output};
use survey_cli::types::{ConvertOptions, ProjectPaths};
use survey_dta::{DtaRelease, DtaValue, DtaWriterOptions, read_dta};
use survey_ingest::read_response_export_str;
use survey_model::{Classification, RowClass, Survey};

const VALID_A: &str = "5f1a2b3c4d5e6f7a8b9c0d1e";
const VALID_B: &str = "0123456789abcdef01234567";

const THREE_RECORDS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Responses>
  <Response>
    <_recordId>R_1</_recordId>
    <PROLIFIC_PID>{{%PROLIFIC_PID%}}</PROLIFIC_PID>
    <distributionChannel>preview</distributionChannel>
    <status>Survey Preview</status>
    <progress>100</progress>
  </Response>
  <Response>
    <_recordId>R_2</_recordId>
    <PROLIFIC_PID>5f1a2b3c4d5e6f7a8b9c0d1e</PROLIFIC_PID>
    <distributionChannel>preview</distributionChannel>
    <status>Survey Preview</status>
    <progress>55</progress>
  </Response>
  <Response>
    <_recordId>R_3</_recordId>
    <PROLIFIC_PID>0123456789abcdef01234567</PROLIFIC_PID>
    <distributionChannel>anonymous</distributionChannel>
    <status>IP Address</status>
    <progress>abc</progress>
    <duration>340.5</duration>
  </Response>
</Responses>
"#;

fn write_export(dir: &Path, name: &str, xml: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, xml).expect("write export");
    path
}

#[test]
fn converts_three_record_export() {
    let dir = tempfile::tempdir().unwrap();
    let export = write_export(dir.path(), "export.xml", THREE_RECORDS);
    let output = dir.path().join("data").join("prescreen_raw.dta");

    let result = convert_survey(Survey::Prescreen, &export, &output, &ConvertOptions::new())
        .expect("convert");

    assert!(!result.has_errors());
    assert_eq!(result.summary.total_rows, 3);
    assert_eq!(result.summary.dropped_rows, 1);
    assert_eq!(result.summary.output_rows, 2);
    assert_eq!(result.dropped.len(), 1);
    assert_eq!(result.dropped[0].record_id, "R_1");

    let written = result.output.as_ref().expect("dataset written");
    assert_eq!(written.rows, 2);
    assert_eq!(written.checksum.len(), 64);
    assert_eq!(result.summary.checksum.as_deref(), Some(written.checksum.as_str()));

    let dataset = read_dta(&output).expect("read dataset");
    assert_eq!(dataset.num_rows(), 2);
    assert_eq!(dataset.columns[0].name, "response_id");
    assert_eq!(dataset.label, "Vaccination side-effects prescreen (raw)");
    let preview: Vec<Option<f64>> = dataset
        .column_values("is_preview")
        .expect("is_preview")
        .into_iter()
        .map(DtaValue::as_f64)
        .collect();
    assert_eq!(preview, vec![Some(1.0), Some(0.0)]);
    let progress: Vec<Option<f64>> = dataset
        .column_values("progress")
        .expect("progress")
        .into_iter()
        .map(DtaValue::as_f64)
        .collect();
    assert_eq!(progress, vec![Some(55.0), None]);
}

#[test]
fn repeated_runs_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let export = write_export(dir.path(), "export.xml", THREE_RECORDS);
    let first = dir.path().join("first.dta");
    let second = dir.path().join("second.dta");
    let options = ConvertOptions::new();

    let a = convert_survey(Survey::Main, &export, &first, &options).unwrap();
    let b = convert_survey(Survey::Main, &export, &second, &options).unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    assert_eq!(a.summary.checksum, b.summary.checksum);
}

#[test]
fn release_119_is_written_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    let export = write_export(dir.path(), "export.xml", THREE_RECORDS);
    let output = dir.path().join("out.dta");
    let options = ConvertOptions::new().with_release(DtaRelease::V119);

    convert_survey(Survey::Followup, &export, &output, &options).unwrap();

    let bytes = fs::read(&output).unwrap();
    let header = String::from_utf8_lossy(&bytes[..64]).to_string();
    assert!(header.contains("<release>119</release>"));
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let export = write_export(dir.path(), "export.xml", THREE_RECORDS);
    let output = dir.path().join("out.dta");
    let options = ConvertOptions::new().with_dry_run(true);

    let result = convert_survey(Survey::Prescreen, &export, &output, &options).unwrap();

    assert!(result.dry_run);
    assert!(result.output.is_none());
    assert!(!output.exists());
    insta::assert_json_snapshot!(result.summary, @r#"
    {
      "survey": "prescreen",
      "total_rows": 3,
      "real_rows": 1,
      "preview_rows": 1,
      "dropped_rows": 1,
      "invalid_id_rows": 0,
      "invalid_id_non_preview": 0,
      "output_rows": 2,
      "output_columns": 7,
      "output_path": null,
      "checksum": null
    }
    "#);
}

#[test]
fn safety_violation_blocks_the_write() {
    let export = read_response_export_str(THREE_RECORDS).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.dta");
    // Row 1 carries a valid identifier but is forced into the metadata class.
    let classification =
        Classification::new(vec![RowClass::Metadata, RowClass::Metadata, RowClass::Real]);

    let result = convert_classified(
        Survey::Prescreen,
        &export.frame,
        &classification,
        &output,
        &ConvertOptions::new(),
    )
    .unwrap();

    assert!(result.has_errors());
    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].participant_id, VALID_A);
    assert_eq!(result.dropped.len(), 2);
    assert!(result.output.is_none());
    assert!(!output.exists());
}

#[test]
fn retained_rows_without_identifier_are_reported() {
    let xml = format!(
        "<Responses>\
         <Response><_recordId>R_1</_recordId><PROLIFIC_PID>{VALID_B}</PROLIFIC_PID>\
         <distributionChannel>anonymous</distributionChannel><status>IP Address</status></Response>\
         <Response><_recordId>R_2</_recordId><PROLIFIC_PID></PROLIFIC_PID>\
         <distributionChannel>anonymous</distributionChannel><status>IP Address</status></Response>\
         </Responses>"
    );
    let dir = tempfile::tempdir().unwrap();
    let export = write_export(dir.path(), "export.xml", &xml);
    let output = dir.path().join("out.dta");

    let result =
        convert_survey(Survey::Main, &export, &output, &ConvertOptions::new()).unwrap();

    assert!(!result.has_errors());
    assert!(result.audit.needs_review());
    assert_eq!(result.summary.invalid_id_non_preview, 1);
    assert_eq!(result.audit.examples[0].record_id, "R_2");
    assert!(output.exists());
}

#[test]
fn missing_export_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ProjectPaths::new(dir.path());
    let export = paths.export_path(Survey::Prescreen, Some("absent.xml"));
    let output = paths.output_path(Survey::Prescreen);

    let err = ingest_export(&export).unwrap_err();
    assert!(format!("{err:#}").contains("absent.xml"));
    assert!(convert_survey(Survey::Prescreen, &export, &output, &ConvertOptions::new()).is_err());
    assert!(!output.exists());
}

#[test]
fn write_output_creates_parent_directories() {
    let export = read_response_export_str(THREE_RECORDS).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("nested").join("deeper").join("raw.dta");

    let written = write_output(&export.frame, &output, &DtaWriterOptions::new(), false)
        .unwrap()
        .expect("written");

    assert_eq!(written.rows, 3);
    assert_eq!(written.columns, 6);
    assert!(output.exists());
}
