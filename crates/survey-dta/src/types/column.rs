//! Variable definitions.

use std::fmt;

/// Widest fixed-length string type (`str2045`).
pub const STR_MAX_LEN: u16 = 2045;

/// Storage type of a dta variable.
///
/// | Type     | Code          | Width |
/// |----------|---------------|-------|
/// | `strN`   | N (1..=2045)  | N     |
/// | `strL`   | 32768         | 8     |
/// | `double` | 65526         | 8     |
/// | `float`  | 65527         | 4     |
/// | `long`   | 65528         | 4     |
/// | `int`    | 65529         | 2     |
/// | `byte`   | 65530         | 1     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DtaType {
    /// Fixed-width string of N bytes.
    Str(u16),
    /// Long string stored in the strls section.
    StrL,
    Double,
    Float,
    Long,
    Int,
    Byte,
}

impl DtaType {
    const STRL_CODE: u16 = 32768;
    const DOUBLE_CODE: u16 = 65526;
    const FLOAT_CODE: u16 = 65527;
    const LONG_CODE: u16 = 65528;
    const INT_CODE: u16 = 65529;
    const BYTE_CODE: u16 = 65530;

    /// Type code written to the `<variable_types>` section.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Str(len) => len,
            Self::StrL => Self::STRL_CODE,
            Self::Double => Self::DOUBLE_CODE,
            Self::Float => Self::FLOAT_CODE,
            Self::Long => Self::LONG_CODE,
            Self::Int => Self::INT_CODE,
            Self::Byte => Self::BYTE_CODE,
        }
    }

    /// Parse a type code.
    #[must_use]
    pub const fn from_code(code: u16) -> Option<Self> {
        match code {
            1..=STR_MAX_LEN => Some(Self::Str(code)),
            Self::STRL_CODE => Some(Self::StrL),
            Self::DOUBLE_CODE => Some(Self::Double),
            Self::FLOAT_CODE => Some(Self::Float),
            Self::LONG_CODE => Some(Self::Long),
            Self::INT_CODE => Some(Self::Int),
            Self::BYTE_CODE => Some(Self::Byte),
            _ => None,
        }
    }

    /// Bytes occupied by one value in the `<data>` section.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Str(len) => len as usize,
            Self::StrL | Self::Double => 8,
            Self::Float | Self::Long => 4,
            Self::Int => 2,
            Self::Byte => 1,
        }
    }

    #[must_use]
    pub const fn is_string(self) -> bool {
        matches!(self, Self::Str(_) | Self::StrL)
    }

    /// Inclusive range of non-missing values for integer types.
    #[must_use]
    pub const fn integer_range(self) -> Option<(i64, i64)> {
        match self {
            Self::Byte => Some((-127, 100)),
            Self::Int => Some((-32_767, 32_740)),
            Self::Long => Some((-2_147_483_647, 2_147_483_620)),
            _ => None,
        }
    }

    /// Smallest integer type holding every value in `min..=max`.
    #[must_use]
    pub fn smallest_integer(min: i64, max: i64) -> Option<Self> {
        [Self::Byte, Self::Int, Self::Long]
            .into_iter()
            .find(|ty| {
                ty.integer_range()
                    .is_some_and(|(lo, hi)| min >= lo && max <= hi)
            })
    }

    /// Stata's default display format for the type.
    #[must_use]
    pub fn default_format(self) -> String {
        match self {
            Self::Str(len) => format!("%{len}s"),
            Self::StrL => "%9s".to_string(),
            Self::Double => "%10.0g".to_string(),
            Self::Float => "%9.0g".to_string(),
            Self::Long => "%12.0g".to_string(),
            Self::Int | Self::Byte => "%8.0g".to_string(),
        }
    }
}

impl fmt::Display for DtaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(len) => write!(f, "str{len}"),
            Self::StrL => write!(f, "strL"),
            Self::Double => write!(f, "double"),
            Self::Float => write!(f, "float"),
            Self::Long => write!(f, "long"),
            Self::Int => write!(f, "int"),
            Self::Byte => write!(f, "byte"),
        }
    }
}

/// A variable: name, storage type, display format and label.
#[derive(Debug, Clone, PartialEq)]
pub struct DtaColumn {
    pub name: String,
    pub data_type: DtaType,
    pub format: String,
    pub label: String,
}

impl DtaColumn {
    /// Create a variable with the type's default display format.
    pub fn new(name: impl Into<String>, data_type: DtaType) -> Self {
        Self {
            name: name.into(),
            data_type,
            format: data_type.default_format(),
            label: String::new(),
        }
    }

    /// Set the variable label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the display format.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }
}
