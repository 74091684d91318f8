//! System missing value (`.`) encodings.
//!
//! Integer types reserve the values just above their valid range; float
//! types use the first value past the largest finite number Stata allows.

pub const BYTE_MISSING: i8 = 101;
pub const INT_MISSING: i16 = 32_741;
pub const LONG_MISSING: i32 = 2_147_483_621;
pub const FLOAT_MISSING_BITS: u32 = 0x7f00_0000;
pub const DOUBLE_MISSING_BITS: u64 = 0x7fe0_0000_0000_0000;

pub fn is_byte_missing(value: i8) -> bool {
    value > 100
}

pub fn is_int_missing(value: i16) -> bool {
    value > 32_740
}

pub fn is_long_missing(value: i32) -> bool {
    value > 2_147_483_620
}

pub fn is_float_missing(value: f32) -> bool {
    value.is_nan() || value >= f32::from_bits(FLOAT_MISSING_BITS)
}

pub fn is_double_missing(value: f64) -> bool {
    value.is_nan() || value >= f64::from_bits(DOUBLE_MISSING_BITS)
}
