mod common;

use survey_core::{AUDIT_EXAMPLE_LIMIT, audit_retained_rows, check_metadata_rows, classify_rows};
use survey_model::{Classification, RowClass, SurveyError};

use common::{PLACEHOLDER, VALID_A, VALID_B, test_df, three_record_export};

#[test]
fn placeholder_rows_pass_the_safety_check() {
    let df = three_record_export();
    let classification = classify_rows(&df);
    let check = check_metadata_rows(&df, &classification);
    assert!(check.is_safe());
    assert_eq!(check.dropped.len(), 1);
    assert_eq!(check.dropped[0].record_id, "R_1");
    assert_eq!(check.dropped[0].participant_id, PLACEHOLDER);
    assert!(check.ensure_safe().is_ok());
}

#[test]
fn valid_identifier_in_metadata_row_is_fatal() {
    let df = test_df(vec![
        ("_recordId", vec![Some("R_1"), Some("R_2")]),
        ("PROLIFIC_PID", vec![Some(VALID_A), Some(PLACEHOLDER)]),
        ("distributionChannel", vec![Some("anonymous"), Some("preview")]),
        ("status", vec![Some("IP Address"), Some("Survey Preview")]),
    ]);
    // Simulates a classification bug that marks a real respondent as metadata.
    let classification = Classification::new(vec![RowClass::Metadata, RowClass::Metadata]);
    let check = check_metadata_rows(&df, &classification);
    assert!(!check.is_safe());
    assert_eq!(check.violations.len(), 1);
    let violation = &check.violations[0];
    assert_eq!(violation.row, 0);
    assert_eq!(violation.record_id, "R_1");
    assert_eq!(violation.participant_id, VALID_A);
    assert_eq!(violation.channel, "anonymous");
    assert_eq!(violation.status, "IP Address");
    assert!(matches!(
        check.ensure_safe(),
        Err(SurveyError::UnsafeDrop { count: 1 })
    ));
}

#[test]
fn retained_audit_separates_preview_rows() {
    let df = test_df(vec![
        ("_recordId", vec![Some("R_1"), Some("R_2"), Some("R_3"), Some("R_4")]),
        (
            "PROLIFIC_PID",
            vec![Some(VALID_B), None, Some("not-an-id"), Some(PLACEHOLDER)],
        ),
        (
            "distributionChannel",
            vec![Some("anonymous"), Some("preview"), Some("anonymous"), Some("preview")],
        ),
    ]);
    let classification = classify_rows(&df);
    let audit = audit_retained_rows(&df, &classification);
    assert_eq!(audit.invalid_id_rows, 2);
    assert_eq!(audit.invalid_id_preview, 1);
    assert_eq!(audit.invalid_id_non_preview, 1);
    assert!(audit.needs_review());
    assert_eq!(audit.examples.len(), 1);
    assert_eq!(audit.examples[0].record_id, "R_3");
    assert_eq!(audit.examples[0].participant_id, "not-an-id");
}

#[test]
fn retained_audit_lists_at_most_ten_rows() {
    let ids: Vec<String> = (0..25).map(|idx| format!("R_{idx}")).collect();
    let df = test_df(vec![
        ("_recordId", ids.iter().map(|id| Some(id.as_str())).collect()),
        ("PROLIFIC_PID", vec![Some("short"); 25]),
    ]);
    let classification = classify_rows(&df);
    let audit = audit_retained_rows(&df, &classification);
    assert_eq!(audit.invalid_id_non_preview, 25);
    assert_eq!(audit.examples.len(), AUDIT_EXAMPLE_LIMIT);
    assert_eq!(audit.examples[0].record_id, "R_0");
    assert_eq!(audit.examples[9].record_id, "R_9");
}

#[test]
fn clean_export_needs_no_review() {
    let df = test_df(vec![
        ("PROLIFIC_PID", vec![Some(VALID_A), Some(VALID_B)]),
        ("status", vec![Some("IP Address"), Some("IP Address")]),
    ]);
    let classification = classify_rows(&df);
    let audit = audit_retained_rows(&df, &classification);
    assert!(!audit.needs_review());
    assert_eq!(audit.invalid_id_rows, 0);
}

#[test]
fn missing_audit_columns_read_as_empty() {
    let df = test_df(vec![("_recordId", vec![Some("R_1"), Some("R_2")])]);
    let classification = Classification::new(vec![RowClass::Metadata, RowClass::Real]);
    let check = check_metadata_rows(&df, &classification);
    assert!(check.is_safe());
    assert_eq!(check.dropped.len(), 1);
    assert_eq!(check.dropped[0].record_id, "R_1");
    assert_eq!(check.dropped[0].participant_id, "");
    assert_eq!(check.dropped[0].status, "");
    assert_eq!(classify_rows(&df).classes(), &[RowClass::Real, RowClass::Real]);
}
