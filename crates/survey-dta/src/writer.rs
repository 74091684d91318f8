//! dta file writer.
//!
//! The file is assembled in memory so the `<map>` offsets can be filled in
//! once every section position is known.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{DtaError, Result};
use crate::header::{
    BYTE_ORDER, DATA_LABEL_MAX, FILE_CLOSE, FILE_OPEN, FORMAT_LEN, GSO_ASCII, GSO_TAG,
    MAP_ENTRIES, Section, SectionMap, VALUE_LABEL_NAME_LEN, VARIABLE_LABEL_LEN, VARNAME_LEN,
    close_tag, open_tag, put_fixed, truncate_bytes,
};
use crate::names::is_valid_name;
use crate::types::missing::{
    BYTE_MISSING, DOUBLE_MISSING_BITS, FLOAT_MISSING_BITS, INT_MISSING, LONG_MISSING,
};
use crate::types::{DtaColumn, DtaDataset, DtaRelease, DtaType, DtaValue, DtaWriterOptions, STR_MAX_LEN};

/// dta file writer.
pub struct DtaWriter<W: Write> {
    writer: BufWriter<W>,
    options: DtaWriterOptions,
}

impl<W: Write> DtaWriter<W> {
    /// Create a new writer with default options (release 118, no timestamp).
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options: DtaWriterOptions::default(),
        }
    }

    /// Create a new writer with options.
    pub fn with_options(writer: W, options: DtaWriterOptions) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options,
        }
    }

    /// Write a dataset.
    pub fn write_dataset(mut self, dataset: &DtaDataset) -> Result<()> {
        let bytes = encode_dataset(dataset, &self.options)?;
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl DtaWriter<File> {
    /// Create a dta file for writing.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }

    /// Create a dta file with options.
    pub fn create_with_options(path: &Path, options: DtaWriterOptions) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::with_options(file, options))
    }
}

/// Write a dataset to a dta file.
pub fn write_dta(path: &Path, dataset: &DtaDataset) -> Result<()> {
    DtaWriter::create(path)?.write_dataset(dataset)
}

/// Write a dataset to a dta file with options.
pub fn write_dta_with_options(
    path: &Path,
    dataset: &DtaDataset,
    options: &DtaWriterOptions,
) -> Result<()> {
    DtaWriter::create_with_options(path, options.clone())?.write_dataset(dataset)
}

/// Encode a dataset into the bytes of a complete dta file.
pub fn encode_dataset(dataset: &DtaDataset, options: &DtaWriterOptions) -> Result<Vec<u8>> {
    let release = options.release;
    let label = options.data_label.as_deref().unwrap_or(&dataset.label);
    validate_dataset(dataset, release, label)?;

    let k = dataset.num_columns();
    let mut buf = Vec::with_capacity(1024 + dataset.observation_width() * dataset.num_rows());
    let mut map = SectionMap::default();

    // Header
    buf.extend_from_slice(FILE_OPEN);
    buf.extend_from_slice(b"<header><release>");
    buf.extend_from_slice(release.number().to_string().as_bytes());
    buf.extend_from_slice(b"</release><byteorder>");
    buf.extend_from_slice(BYTE_ORDER);
    buf.extend_from_slice(b"</byteorder><K>");
    put_count(&mut buf, k as u64, release);
    buf.extend_from_slice(b"</K><N>");
    buf.extend_from_slice(&(dataset.num_rows() as u64).to_le_bytes());
    buf.extend_from_slice(b"</N><label>");
    buf.extend_from_slice(&(label.len() as u16).to_le_bytes());
    buf.extend_from_slice(label.as_bytes());
    buf.extend_from_slice(b"</label><timestamp>");
    match options.format_timestamp() {
        Some(stamp) => {
            buf.push(stamp.len() as u8);
            buf.extend_from_slice(stamp.as_bytes());
        }
        None => buf.push(0),
    }
    buf.extend_from_slice(b"</timestamp></header>");

    // Map, patched at the end
    map.set(Section::Map, buf.len());
    buf.extend_from_slice(&open_tag("map"));
    let map_start = buf.len();
    buf.resize(map_start + MAP_ENTRIES * 8, 0);
    buf.extend_from_slice(&close_tag("map"));

    section(&mut buf, &mut map, Section::VariableTypes, "variable_types", |buf| {
        for column in &dataset.columns {
            buf.extend_from_slice(&column.data_type.code().to_le_bytes());
        }
    });
    section(&mut buf, &mut map, Section::Varnames, "varnames", |buf| {
        for column in &dataset.columns {
            put_fixed(buf, &column.name, VARNAME_LEN);
        }
    });
    section(&mut buf, &mut map, Section::Sortlist, "sortlist", |buf| {
        for _ in 0..=k {
            put_count(buf, 0, release);
        }
    });
    section(&mut buf, &mut map, Section::Formats, "formats", |buf| {
        for column in &dataset.columns {
            put_fixed(buf, &column.format, FORMAT_LEN);
        }
    });
    section(&mut buf, &mut map, Section::ValueLabelNames, "value_label_names", |buf| {
        buf.resize(buf.len() + k * VALUE_LABEL_NAME_LEN, 0);
    });
    section(&mut buf, &mut map, Section::VariableLabels, "variable_labels", |buf| {
        for column in &dataset.columns {
            put_fixed(buf, &column.label, VARIABLE_LABEL_LEN);
        }
    });
    section(&mut buf, &mut map, Section::Characteristics, "characteristics", |_| {});

    map.set(Section::Data, buf.len());
    buf.extend_from_slice(&open_tag("data"));
    let strls = encode_observations(&mut buf, dataset, release)?;
    buf.extend_from_slice(&close_tag("data"));

    section(&mut buf, &mut map, Section::Strls, "strls", |buf| {
        for gso in &strls {
            gso.encode(buf);
        }
    });
    section(&mut buf, &mut map, Section::ValueLabels, "value_labels", |_| {});

    map.set(Section::StataDtaClose, buf.len());
    buf.extend_from_slice(FILE_CLOSE);
    map.set(Section::EndOfFile, buf.len());

    buf[map_start..map_start + MAP_ENTRIES * 8].copy_from_slice(&map.to_bytes());
    Ok(buf)
}

fn section(
    buf: &mut Vec<u8>,
    map: &mut SectionMap,
    which: Section,
    name: &str,
    body: impl FnOnce(&mut Vec<u8>),
) {
    map.set(which, buf.len());
    buf.extend_from_slice(&open_tag(name));
    body(buf);
    buf.extend_from_slice(&close_tag(name));
}

/// `K` and sort list entries: 2 bytes in 118, 4 in 119.
fn put_count(buf: &mut Vec<u8>, value: u64, release: DtaRelease) {
    let width = release.count_width();
    buf.extend_from_slice(&value.to_le_bytes()[..width]);
}

/// A strL value stored in the `<strls>` section.
struct Gso {
    variable: u32,
    observation: u64,
    text: String,
}

impl Gso {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(GSO_TAG);
        buf.extend_from_slice(&self.variable.to_le_bytes());
        buf.extend_from_slice(&self.observation.to_le_bytes());
        buf.push(GSO_ASCII);
        buf.extend_from_slice(&(self.text.len() as u32 + 1).to_le_bytes());
        buf.extend_from_slice(self.text.as_bytes());
        buf.push(0);
    }
}

/// Reference to a GSO: variable and observation number packed into 8 bytes.
pub(crate) fn strl_reference(variable: u32, observation: u64, release: DtaRelease) -> [u8; 8] {
    let v_width = release.strl_variable_width();
    let mut out = [0u8; 8];
    out[..v_width].copy_from_slice(&variable.to_le_bytes()[..v_width]);
    out[v_width..].copy_from_slice(&observation.to_le_bytes()[..8 - v_width]);
    out
}

fn encode_observations(
    buf: &mut Vec<u8>,
    dataset: &DtaDataset,
    release: DtaRelease,
) -> Result<Vec<Gso>> {
    let mut strls = Vec::new();
    for (row_idx, row) in dataset.rows.iter().enumerate() {
        for (col_idx, (value, column)) in row.iter().zip(&dataset.columns).enumerate() {
            if column.data_type == DtaType::StrL {
                let text = value.to_text();
                if text.is_empty() {
                    buf.extend_from_slice(&[0u8; 8]);
                } else {
                    let variable = col_idx as u32 + 1;
                    let observation = row_idx as u64 + 1;
                    buf.extend_from_slice(&strl_reference(variable, observation, release));
                    strls.push(Gso {
                        variable,
                        observation,
                        text,
                    });
                }
            } else {
                encode_value(buf, column, value, row_idx)?;
            }
        }
    }
    Ok(strls)
}

/// Encode a fixed-width string, NUL padded.
fn encode_str(buf: &mut Vec<u8>, value: &str, len: usize) {
    let text = truncate_bytes(value, len);
    buf.extend_from_slice(text.as_bytes());
    buf.resize(buf.len() + len - text.len(), 0);
}

/// Encode a `strN` or numeric cell.
fn encode_value(
    buf: &mut Vec<u8>,
    column: &DtaColumn,
    value: &DtaValue,
    row: usize,
) -> Result<()> {
    // Non-finite values become missing
    let number = || value.to_number().filter(|v| v.is_finite());
    match column.data_type {
        DtaType::Str(len) => encode_str(buf, &value.to_text(), usize::from(len)),
        DtaType::StrL => {
            return Err(DtaError::invalid_format(format!(
                "strL variable {} has no inline encoding",
                column.name
            )));
        }
        DtaType::Double => {
            let bits = number().map_or(DOUBLE_MISSING_BITS, f64::to_bits);
            buf.extend_from_slice(&bits.to_le_bytes());
        }
        DtaType::Float => {
            let bits = number().map_or(FLOAT_MISSING_BITS, |v| (v as f32).to_bits());
            buf.extend_from_slice(&bits.to_le_bytes());
        }
        DtaType::Long => {
            let v = match number() {
                Some(v) => checked_integer(column, v, row)? as i32,
                None => LONG_MISSING,
            };
            buf.extend_from_slice(&v.to_le_bytes());
        }
        DtaType::Int => {
            let v = match number() {
                Some(v) => checked_integer(column, v, row)? as i16,
                None => INT_MISSING,
            };
            buf.extend_from_slice(&v.to_le_bytes());
        }
        DtaType::Byte => {
            let v = match number() {
                Some(v) => checked_integer(column, v, row)? as i8,
                None => BYTE_MISSING,
            };
            buf.extend_from_slice(&v.to_le_bytes());
        }
    }
    Ok(())
}

fn checked_integer(column: &DtaColumn, value: f64, row: usize) -> Result<i64> {
    let fits = column
        .data_type
        .integer_range()
        .is_some_and(|(lo, hi)| value.fract() == 0.0 && value >= lo as f64 && value <= hi as f64);
    if fits {
        Ok(value as i64)
    } else {
        Err(DtaError::ValueOutOfRange {
            name: column.name.clone(),
            row,
            value,
            data_type: column.data_type.to_string(),
        })
    }
}

/// Validate a dataset before writing.
fn validate_dataset(dataset: &DtaDataset, release: DtaRelease, label: &str) -> Result<()> {
    if dataset.num_columns() > release.max_variables() {
        return Err(DtaError::too_many_variables(dataset.num_columns(), release));
    }
    if label.len() > DATA_LABEL_MAX {
        return Err(DtaError::label_too_long("dataset", DATA_LABEL_MAX));
    }

    let mut seen = HashSet::new();
    for column in &dataset.columns {
        if !is_valid_name(&column.name) {
            return Err(DtaError::invalid_variable_name(&column.name));
        }
        if !seen.insert(column.name.as_str()) {
            return Err(DtaError::duplicate_variable(&column.name));
        }
        if let DtaType::Str(width) = column.data_type
            && !(1..=STR_MAX_LEN).contains(&width)
        {
            return Err(DtaError::InvalidStringWidth {
                name: column.name.clone(),
                width,
            });
        }
        if column.label.len() >= VARIABLE_LABEL_LEN {
            return Err(DtaError::label_too_long(&column.name, VARIABLE_LABEL_LEN - 1));
        }
        if column.format.len() >= FORMAT_LEN {
            return Err(DtaError::label_too_long(
                format!("{} format", column.name),
                FORMAT_LEN - 1,
            ));
        }
    }

    for row in &dataset.rows {
        if row.len() != dataset.columns.len() {
            return Err(DtaError::RowLengthMismatch {
                expected: dataset.columns.len(),
                actual: row.len(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DtaDataset {
        let mut ds = DtaDataset::with_columns(vec![
            DtaColumn::new("id", DtaType::Str(4)),
            DtaColumn::new("flag", DtaType::Byte),
        ]);
        ds.add_row(vec![DtaValue::string("R_1"), DtaValue::number(1.0)]);
        ds
    }

    #[test]
    fn test_encode_str_pads_with_nul() {
        let mut buf = Vec::new();
        encode_str(&mut buf, "ab", 4);
        assert_eq!(buf, b"ab\0\0");

        let mut buf = Vec::new();
        encode_str(&mut buf, "abcdef", 3);
        assert_eq!(buf, b"abc");
    }

    #[test]
    fn test_encode_value_missing_codes() {
        let mut buf = Vec::new();
        let column = DtaColumn::new("x", DtaType::Byte);
        encode_value(&mut buf, &column, &DtaValue::missing(), 0).unwrap();
        assert_eq!(buf, vec![101]);

        let mut buf = Vec::new();
        let column = DtaColumn::new("x", DtaType::Double);
        encode_value(&mut buf, &column, &DtaValue::number(f64::NAN), 0).unwrap();
        assert_eq!(buf, DOUBLE_MISSING_BITS.to_le_bytes());
    }

    #[test]
    fn test_encode_value_out_of_range() {
        let mut buf = Vec::new();
        let column = DtaColumn::new("x", DtaType::Byte);
        let err = encode_value(&mut buf, &column, &DtaValue::number(101.0), 3).unwrap_err();
        assert!(matches!(err, DtaError::ValueOutOfRange { row: 3, .. }));

        let err = encode_value(&mut buf, &column, &DtaValue::number(1.5), 0).unwrap_err();
        assert!(matches!(err, DtaError::ValueOutOfRange { .. }));
    }

    #[test]
    fn test_strl_reference_split() {
        let r118 = strl_reference(2, 3, DtaRelease::V118);
        assert_eq!(r118, [2, 0, 3, 0, 0, 0, 0, 0]);
        let r119 = strl_reference(2, 3, DtaRelease::V119);
        assert_eq!(r119, [2, 0, 0, 3, 0, 0, 0, 0]);
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode_dataset(&sample(), &DtaWriterOptions::default()).unwrap();
        let expected_start = b"<stata_dta><header><release>118</release><byteorder>LSF</byteorder><K>";
        assert!(bytes.starts_with(expected_start));
        let k_pos = expected_start.len();
        assert_eq!(&bytes[k_pos..k_pos + 2], &2u16.to_le_bytes());
        assert!(bytes.ends_with(b"<value_labels></value_labels></stata_dta>"));
    }

    #[test]
    fn test_map_points_at_sections() {
        let bytes = encode_dataset(&sample(), &DtaWriterOptions::default()).unwrap();
        let map_pos = bytes
            .windows(5)
            .position(|w| w == b"<map>")
            .unwrap();
        let offset = |idx: usize| {
            let start = map_pos + 5 + idx * 8;
            u64::from_le_bytes(bytes[start..start + 8].try_into().unwrap()) as usize
        };
        assert_eq!(offset(0), 0);
        assert_eq!(offset(1), map_pos);
        assert!(bytes[offset(2)..].starts_with(b"<variable_types>"));
        assert!(bytes[offset(9)..].starts_with(b"<data>"));
        assert!(bytes[offset(10)..].starts_with(b"<strls>"));
        assert!(bytes[offset(12)..].starts_with(b"</stata_dta>"));
        assert_eq!(offset(13), bytes.len());
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        let ds = DtaDataset::with_columns(vec![DtaColumn::new("Q1.2", DtaType::Double)]);
        let err = encode_dataset(&ds, &DtaWriterOptions::default()).unwrap_err();
        assert!(matches!(err, DtaError::InvalidVariableName { .. }));

        let ds = DtaDataset::with_columns(vec![
            DtaColumn::new("a", DtaType::Double),
            DtaColumn::new("a", DtaType::Byte),
        ]);
        let err = encode_dataset(&ds, &DtaWriterOptions::default()).unwrap_err();
        assert!(matches!(err, DtaError::DuplicateVariable { .. }));
    }

    #[test]
    fn test_validate_row_length() {
        let mut ds = sample();
        ds.add_row(vec![DtaValue::string("R_2")]);
        let err = encode_dataset(&ds, &DtaWriterOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            DtaError::RowLengthMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_validate_string_width() {
        let ds = DtaDataset::with_columns(vec![DtaColumn::new("s", DtaType::Str(0))]);
        let err = encode_dataset(&ds, &DtaWriterOptions::default()).unwrap_err();
        assert!(matches!(err, DtaError::InvalidStringWidth { width: 0, .. }));
    }
}
