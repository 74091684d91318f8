//! Polars DataFrame integration.
//!
//! Storage types are inferred per column:
//!
//! - text → `strN` sized to the longest value, or `strL` past 2045 bytes
//! - floats → `double`
//! - integers and booleans → the smallest of `byte`/`int`/`long` that holds
//!   every value, else `double`
//! - anything else is rendered as text
//!
//! Column names are made valid Stata names on the way.

use std::path::Path;

use polars::prelude::{AnyValue, Column, DataFrame, DataType};
use tracing::debug;

use crate::error::Result;
use crate::names::sanitize_names;
use crate::types::{DtaColumn, DtaDataset, DtaType, DtaValue, DtaWriterOptions, STR_MAX_LEN};
use crate::writer::write_dta_with_options;

/// Convert a DataFrame into a dataset ready for writing.
pub fn dataframe_to_dta(df: &DataFrame, options: &DtaWriterOptions) -> Result<DtaDataset> {
    let raw_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let names = sanitize_names(&raw_names);

    let mut columns = Vec::with_capacity(df.width());
    let mut values: Vec<Vec<DtaValue>> = Vec::with_capacity(df.width());
    for (column, name) in df.get_columns().iter().zip(names) {
        let (data_type, cells) = convert_column(column)?;
        debug!(variable = %name, storage = %data_type, "inferred storage type");
        columns.push(DtaColumn::new(name, data_type));
        values.push(cells);
    }

    let mut dataset = DtaDataset::with_columns(columns);
    if let Some(label) = &options.data_label {
        dataset.label = label.clone();
    }
    let mut iters: Vec<_> = values.into_iter().map(Vec::into_iter).collect();
    for _ in 0..df.height() {
        let row: Vec<DtaValue> = iters.iter_mut().filter_map(Iterator::next).collect();
        dataset.add_row(row);
    }
    Ok(dataset)
}

/// Convert and write a DataFrame in one step.
pub fn write_dataframe_to_dta(
    path: &Path,
    df: &DataFrame,
    options: &DtaWriterOptions,
) -> Result<DtaDataset> {
    let dataset = dataframe_to_dta(df, options)?;
    write_dta_with_options(path, &dataset, options)?;
    Ok(dataset)
}

fn convert_column(column: &Column) -> Result<(DtaType, Vec<DtaValue>)> {
    let series = column.as_materialized_series();
    let dtype = series.dtype();
    if dtype.is_float() {
        let cast = series.cast(&DataType::Float64)?;
        let cells = cast.f64()?.into_iter().map(DtaValue::Num).collect();
        return Ok((DtaType::Double, cells));
    }
    if dtype.is_integer() || dtype.is_bool() {
        let cast = series.cast(&DataType::Int64)?;
        let ints: Vec<Option<i64>> = cast.i64()?.into_iter().collect();
        let present = ints.iter().flatten();
        let min = present.clone().copied().min().unwrap_or(0);
        let max = present.copied().max().unwrap_or(0);
        let data_type = DtaType::smallest_integer(min, max).unwrap_or(DtaType::Double);
        let cells = ints
            .into_iter()
            .map(|v| DtaValue::Num(v.map(|v| v as f64)))
            .collect();
        return Ok((data_type, cells));
    }

    let text: Vec<String> = if dtype == &DataType::String {
        series
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect()
    } else {
        (0..series.len())
            .map(|idx| series.get(idx).map(any_to_text))
            .collect::<std::result::Result<Vec<String>, _>>()?
    };
    let longest = text.iter().map(String::len).max().unwrap_or(0);
    let data_type = if longest > usize::from(STR_MAX_LEN) {
        DtaType::StrL
    } else {
        DtaType::Str(longest.max(1) as u16)
    };
    Ok((data_type, text.into_iter().map(DtaValue::Str).collect()))
}

fn any_to_text(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    fn test_df(columns: Vec<Series>) -> DataFrame {
        DataFrame::new(columns.into_iter().map(IntoColumn::into_column).collect()).unwrap()
    }

    #[test]
    fn test_string_width_is_longest_value() {
        let df = test_df(vec![Series::new(
            "id".into(),
            vec![Some("R_1"), None, Some("R_100")],
        )]);
        let ds = dataframe_to_dta(&df, &DtaWriterOptions::default()).unwrap();
        assert_eq!(ds.columns[0].data_type, DtaType::Str(5));
        assert_eq!(ds.rows[1][0], DtaValue::string(""));
    }

    #[test]
    fn test_all_empty_strings_get_width_one() {
        let df = test_df(vec![Series::new("note".into(), vec![Some(""), None])]);
        let ds = dataframe_to_dta(&df, &DtaWriterOptions::default()).unwrap();
        assert_eq!(ds.columns[0].data_type, DtaType::Str(1));
    }

    #[test]
    fn test_long_text_becomes_strl() {
        let long = "x".repeat(3000);
        let df = test_df(vec![Series::new("comment".into(), vec![long.as_str(), "short"])]);
        let ds = dataframe_to_dta(&df, &DtaWriterOptions::default()).unwrap();
        assert_eq!(ds.columns[0].data_type, DtaType::StrL);
    }

    #[test]
    fn test_integer_storage_types() {
        let df = test_df(vec![
            Series::new("flag".into(), vec![0i32, 1, 1]),
            Series::new("count".into(), vec![Some(5i64), None, Some(30_000)]),
            Series::new("big".into(), vec![0i64, 1, 3_000_000_000]),
        ]);
        let ds = dataframe_to_dta(&df, &DtaWriterOptions::default()).unwrap();
        assert_eq!(ds.columns[0].data_type, DtaType::Byte);
        assert_eq!(ds.columns[1].data_type, DtaType::Int);
        assert_eq!(ds.columns[2].data_type, DtaType::Double);
        assert_eq!(ds.rows[1][1], DtaValue::missing());
        assert_eq!(ds.rows[2][2], DtaValue::number(3_000_000_000.0));
    }

    #[test]
    fn test_floats_become_double_with_missing() {
        let df = test_df(vec![Series::new("progress".into(), vec![Some(55.0), None])]);
        let ds = dataframe_to_dta(&df, &DtaWriterOptions::default()).unwrap();
        assert_eq!(ds.columns[0].data_type, DtaType::Double);
        assert_eq!(ds.rows[0][0], DtaValue::number(55.0));
        assert_eq!(ds.rows[1][0], DtaValue::missing());
    }

    #[test]
    fn test_names_are_sanitized() {
        let df = test_df(vec![
            Series::new("Q1.2".into(), vec!["a"]),
            Series::new("Q1_2".into(), vec!["b"]),
        ]);
        let ds = dataframe_to_dta(&df, &DtaWriterOptions::new().with_data_label("Main")).unwrap();
        let names: Vec<&str> = ds.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Q1_2", "Q1_2_2"]);
        assert_eq!(ds.label, "Main");
    }
}
