//! Section tags, fixed field widths and the section map.
//!
//! A release 118/119 file is a sequence of tagged sections:
//!
//! | Section               | Contents                                   |
//! |-----------------------|--------------------------------------------|
//! | `<header>`            | release, byte order, K, N, label, timestamp|
//! | `<map>`               | 14 absolute offsets (u64)                  |
//! | `<variable_types>`    | K type codes (u16)                         |
//! | `<varnames>`          | K names, 129 bytes each                    |
//! | `<sortlist>`          | K+1 entries, zero terminated               |
//! | `<formats>`           | K display formats, 57 bytes each           |
//! | `<value_label_names>` | K names, 129 bytes each                    |
//! | `<variable_labels>`   | K labels, 321 bytes each                   |
//! | `<characteristics>`   | `<ch>` records                             |
//! | `<data>`              | N observations                             |
//! | `<strls>`             | GSO records for strL values                |
//! | `<value_labels>`      | `<lbl>` records                            |

use chrono::NaiveDateTime;

pub const FILE_OPEN: &[u8] = b"<stata_dta>";
pub const FILE_CLOSE: &[u8] = b"</stata_dta>";
pub const BYTE_ORDER: &[u8] = b"LSF";

pub const VARNAME_LEN: usize = 129;
pub const FORMAT_LEN: usize = 57;
pub const VALUE_LABEL_NAME_LEN: usize = 129;
pub const VARIABLE_LABEL_LEN: usize = 321;
/// Data label limit in bytes (80 characters of up to 4 bytes).
pub const DATA_LABEL_MAX: usize = 320;
pub const TIMESTAMP_LEN: usize = 17;

/// GSO type for strings stored with a trailing NUL.
pub const GSO_ASCII: u8 = 130;
pub const GSO_BINARY: u8 = 129;
pub const GSO_TAG: &[u8] = b"GSO";

pub const MAP_ENTRIES: usize = 14;

/// Positions of the map entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    StataDta = 0,
    Map,
    VariableTypes,
    Varnames,
    Sortlist,
    Formats,
    ValueLabelNames,
    VariableLabels,
    Characteristics,
    Data,
    Strls,
    ValueLabels,
    StataDtaClose,
    EndOfFile,
}

/// The `<map>` section: byte offset of every section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    offsets: [u64; MAP_ENTRIES],
}

impl SectionMap {
    pub fn set(&mut self, section: Section, offset: usize) {
        self.offsets[section as usize] = offset as u64;
    }

    pub fn get(&self, section: Section) -> u64 {
        self.offsets[section as usize]
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.offsets
            .iter()
            .flat_map(|offset| offset.to_le_bytes())
            .collect()
    }
}

/// Opening tag for a section name.
pub fn open_tag(name: &str) -> Vec<u8> {
    format!("<{name}>").into_bytes()
}

/// Closing tag for a section name.
pub fn close_tag(name: &str) -> Vec<u8> {
    format!("</{name}>").into_bytes()
}

/// Timestamp text as Stata writes it: `dd Mon yyyy hh:mm`.
pub fn format_timestamp(dt: NaiveDateTime) -> String {
    dt.format("%d %b %Y %H:%M").to_string()
}

/// Append `value` as a NUL-padded field of `width` bytes.
///
/// Text is cut at a character boundary so at least one NUL terminates it.
pub fn put_fixed(buf: &mut Vec<u8>, value: &str, width: usize) {
    let text = truncate_bytes(value, width.saturating_sub(1));
    buf.extend_from_slice(text.as_bytes());
    buf.resize(buf.len() + width - text.len(), 0);
}

/// Longest prefix of `value` with at most `max` bytes, on a char boundary.
pub fn truncate_bytes(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

/// Read a NUL-terminated field.
pub fn read_fixed(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_put_fixed_pads_and_terminates() {
        let mut buf = Vec::new();
        put_fixed(&mut buf, "age", 8);
        assert_eq!(buf, b"age\0\0\0\0\0");

        let mut buf = Vec::new();
        put_fixed(&mut buf, "abcdefgh", 4);
        assert_eq!(buf, b"abc\0");
        assert_eq!(read_fixed(&buf), "abc");
    }

    #[test]
    fn test_truncate_keeps_char_boundary() {
        assert_eq!(truncate_bytes("héllo", 2), "h");
        assert_eq!(truncate_bytes("héllo", 3), "hé");
        assert_eq!(truncate_bytes("ok", 10), "ok");
    }

    #[test]
    fn test_section_map_layout() {
        let mut map = SectionMap::default();
        map.set(Section::Map, 100);
        map.set(Section::EndOfFile, 4096);
        let bytes = map.to_bytes();
        assert_eq!(bytes.len(), MAP_ENTRIES * 8);
        assert_eq!(&bytes[8..16], &100u64.to_le_bytes());
        assert_eq!(&bytes[104..112], &4096u64.to_le_bytes());
        assert_eq!(map.get(Section::EndOfFile), 4096);
    }

    #[test]
    fn test_timestamp_width() {
        let dt = NaiveDate::from_ymd_opt(2026, 1, 8)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        let text = format_timestamp(dt);
        assert_eq!(text, "08 Jan 2026 09:05");
        assert_eq!(text.len(), TIMESTAMP_LEN);
    }
}
