//! Cell values.

use std::fmt;

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum DtaValue {
    /// Text for `strN`/`strL` variables.
    Str(String),
    /// Numeric value; `None` is system missing (`.`).
    Num(Option<f64>),
}

impl DtaValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    pub fn number(value: f64) -> Self {
        Self::Num(Some(value))
    }

    pub fn missing() -> Self {
        Self::Num(None)
    }

    /// Missing numerics and empty strings.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Str(s) => s.is_empty(),
            Self::Num(n) => n.is_none(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Num(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Num(n) => *n,
            Self::Str(_) => None,
        }
    }

    /// Value as text, for storing in a string variable.
    pub fn to_text(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Num(None) => String::new(),
            Self::Num(Some(v)) => format_number(*v),
        }
    }

    /// Value as a number, for storing in a numeric variable.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Self::Num(n) => *n,
            Self::Str(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

impl fmt::Display for DtaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(None) => write!(f, "."),
            other => write!(f, "{}", other.to_text()),
        }
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        v.to_string()
    }
}
