//! Polars AnyValue utility functions.
//!
//! Response tables hold raw text, so most helpers here turn cells back into
//! strings or parse them as numbers.

use polars::prelude::{AnyValue, DataFrame};

/// Converts a Polars AnyValue to a String representation.
/// Returns empty string for Null.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::Boolean(b) => if b { "1" } else { "0" }.to_string(),
        other => other.to_string(),
    }
}

/// Like [`any_to_string`] but keeps nulls distinct from empty text.
pub fn any_to_string_opt(value: AnyValue<'_>) -> Option<String> {
    match value {
        AnyValue::Null => None,
        other => Some(any_to_string(other)),
    }
}

fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Parses a string as f64, returning None for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Reads a whole column as optional strings.
///
/// Returns `None` when the column does not exist.
pub fn column_strings(df: &DataFrame, name: &str) -> Option<Vec<Option<String>>> {
    let column = df.column(name).ok()?;
    let values = (0..df.height())
        .map(|idx| any_to_string_opt(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect();
    Some(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    #[test]
    fn parse_f64_rejects_blank_and_text() {
        assert_eq!(parse_f64(" 42 "), Some(42.0));
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("   "), None);
        assert_eq!(parse_f64("n/a"), None);
    }

    #[test]
    fn any_to_string_handles_null_and_numbers() {
        assert_eq!(any_to_string(AnyValue::Null), "");
        assert_eq!(any_to_string(AnyValue::Float64(12.50)), "12.5");
        assert_eq!(any_to_string(AnyValue::Float64(3.0)), "3");
        assert_eq!(any_to_string(AnyValue::Int32(7)), "7");
        assert_eq!(any_to_string_opt(AnyValue::Null), None);
        assert_eq!(
            any_to_string_opt(AnyValue::String("")),
            Some(String::new())
        );
    }

    #[test]
    fn column_strings_reports_missing_column() {
        let df = DataFrame::new(vec![
            Series::new("a".into(), vec![Some("x".to_string()), None]).into_column(),
        ])
        .unwrap();
        assert_eq!(
            column_strings(&df, "a"),
            Some(vec![Some("x".to_string()), None])
        );
        assert_eq!(column_strings(&df, "b"), None);
    }
}
