//! Number formatting with thousands separators.

/// Format `value` with `decimals` places and `,` between thousands.
///
/// ```
/// use survey_codebook::format_grouped;
///
/// assert_eq!(format_grouped(1234567.891, 1), "1,234,567.9");
/// assert_eq!(format_grouped(-4413.0, 0), "-4,413");
/// ```
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let text = format!("{value:.decimals$}");
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (unsigned, None),
    };
    if !int_part.bytes().all(|b| b.is_ascii_digit()) {
        // inf / NaN
        return text;
    }

    let mut out = String::with_capacity(text.len() + int_part.len() / 3);
    out.push_str(sign);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Count and percentage as shown in value tables: `4,413 (56.05%)`.
pub fn format_n_pct(n: i64, pct: f64) -> String {
    format!("{} ({pct:.2}%)", format_grouped(n as f64, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_grouped(0.0, 0), "0");
        assert_eq!(format_grouped(999.0, 0), "999");
        assert_eq!(format_grouped(1000.0, 0), "1,000");
        assert_eq!(format_grouped(12345.678, 1), "12,345.7");
        assert_eq!(format_grouped(-1234.5, 1), "-1,234.5");
        assert_eq!(format_grouped(1_000_000.0, 0), "1,000,000");
    }

    #[test]
    fn formats_n_pct() {
        assert_eq!(format_n_pct(4413, 56.05), "4,413 (56.05%)");
        assert_eq!(format_n_pct(12, 0.1234), "12 (0.12%)");
        assert_eq!(format_n_pct(0, 0.0), "0 (0.00%)");
    }

    #[test]
    fn leaves_non_finite_alone() {
        assert_eq!(format_grouped(f64::INFINITY, 1), "inf");
        assert_eq!(format_grouped(f64::NAN, 0), "NaN");
    }
}
