#![allow(dead_code)]

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};

pub const VALID_A: &str = "5f1a2b3c4d5e6f7a8b9c0d1e";
pub const VALID_B: &str = "0123456789abcdef01234567";
pub const PLACEHOLDER: &str = "{{%PROLIFIC_PID%}}";

pub fn test_df(columns: Vec<(&str, Vec<Option<&str>>)>) -> DataFrame {
    let cols: Vec<Column> = columns
        .into_iter()
        .map(|(name, values)| {
            Series::new(
                name.into(),
                values
                    .iter()
                    .map(|value| value.map(String::from))
                    .collect::<Vec<_>>(),
            )
            .into_column()
        })
        .collect();
    DataFrame::new(cols).unwrap()
}

/// The three-record export: one template row, one preview, one real response.
pub fn three_record_export() -> DataFrame {
    test_df(vec![
        ("_recordId", vec![Some("R_1"), Some("R_2"), Some("R_3")]),
        (
            "PROLIFIC_PID",
            vec![Some(PLACEHOLDER), Some(VALID_A), Some(VALID_B)],
        ),
        (
            "distributionChannel",
            vec![Some("preview"), Some("preview"), Some("anonymous")],
        ),
        (
            "status",
            vec![Some("Survey Preview"), Some("Survey Preview"), Some("IP Address")],
        ),
        ("progress", vec![Some("100"), Some("55"), Some("abc")]),
        ("duration", vec![Some("12"), None, Some("340.5")]),
    ])
}
