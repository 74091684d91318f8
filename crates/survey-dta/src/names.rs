//! Stata variable name rules.
//!
//! A valid name has at most 32 characters drawn from ASCII letters, digits
//! and `_`, does not start with a digit, and is not a reserved word.

use std::collections::HashSet;

use tracing::warn;

/// Maximum variable name length in characters.
pub const NAME_LIMIT: usize = 32;

const RESERVED_WORDS: &[&str] = &[
    "_all", "_b", "byte", "_coef", "_cons", "double", "float", "if", "in", "int", "long", "_n",
    "_N", "_pi", "_pred", "_rc", "_se", "_skip", "strL", "using", "with",
];

fn is_reserved(name: &str) -> bool {
    if RESERVED_WORDS.contains(&name) {
        return true;
    }
    // str1 .. str2045 are type names.
    name.strip_prefix("str")
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Whether Stata accepts `name` as a variable name.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= NAME_LIMIT
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
        && !name.as_bytes()[0].is_ascii_digit()
        && !is_reserved(name)
}

/// Turn an arbitrary field name into a valid variable name.
///
/// Invalid characters become `_`; a leading digit or a reserved word gets
/// a `_` prefix; the result is cut to 32 characters.
pub fn sanitize_name(raw: &str) -> String {
    let mut name: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() {
        name.push_str("var");
    }
    if name.as_bytes()[0].is_ascii_digit() || is_reserved(&name) {
        name.insert(0, '_');
    }
    name.truncate(NAME_LIMIT);
    name
}

/// Sanitize a list of names, keeping them unique.
///
/// Collisions get a `_2`, `_3`, ... suffix. Every rename is logged.
pub fn sanitize_names<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut out = Vec::with_capacity(raw.len());
    for original in raw {
        let original = original.as_ref();
        let base = sanitize_name(original);
        let mut name = base.clone();
        let mut n = 2usize;
        while taken.contains(&name) {
            let suffix = format!("_{n}");
            let keep = NAME_LIMIT - suffix.len();
            name = format!("{}{suffix}", &base[..base.len().min(keep)]);
            n += 1;
        }
        if name != original {
            warn!(from = original, to = %name, "renamed variable to a valid Stata name");
        }
        taken.insert(name.clone());
        out.push(name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("response_id"));
        assert!(is_valid_name("_recordId"));
        assert!(is_valid_name("Q1_2"));
        assert!(!is_valid_name("1abc"));
        assert!(!is_valid_name("Q1.2"));
        assert!(!is_valid_name("int"));
        assert!(!is_valid_name("str20"));
        assert!(!is_valid_name(&"a".repeat(33)));
        assert!(!is_valid_name(""));
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Q1.2"), "Q1_2");
        assert_eq!(sanitize_name("1st choice"), "_1st_choice");
        assert_eq!(sanitize_name("long"), "_long");
        assert_eq!(sanitize_name("  "), "var");
        assert_eq!(sanitize_name("ålder"), "_lder");
        assert_eq!(sanitize_name(&"x".repeat(40)).len(), NAME_LIMIT);
        assert_eq!(sanitize_name("storage"), "storage");
    }

    #[test]
    fn test_sanitize_names_dedupes() {
        let names = sanitize_names(&["Q1.2", "Q1_2", "Q1-2", "ok"]);
        assert_eq!(names, vec!["Q1_2", "Q1_2_2", "Q1_2_3", "ok"]);
    }

    #[test]
    fn test_sanitize_names_dedupes_long_names() {
        let long = "v".repeat(40);
        let names = sanitize_names(&[long.clone(), long]);
        assert_eq!(names[0].len(), NAME_LIMIT);
        assert_eq!(names[1].len(), NAME_LIMIT);
        assert!(names[1].ends_with("_2"));
        assert!(names.iter().all(|n| is_valid_name(n)));
    }
}
