//! dta file reader.
//!
//! Reads release 118/119 little-endian files, as produced by the writer,
//! back into a [`DtaDataset`]. Used to verify written output.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{DtaError, Result};
use crate::header::{
    BYTE_ORDER, FILE_CLOSE, FILE_OPEN, FORMAT_LEN, GSO_ASCII, GSO_TAG, MAP_ENTRIES,
    VALUE_LABEL_NAME_LEN, VARIABLE_LABEL_LEN, VARNAME_LEN, read_fixed,
};
use crate::types::missing::{
    is_byte_missing, is_double_missing, is_float_missing, is_int_missing, is_long_missing,
};
use crate::types::{DtaColumn, DtaDataset, DtaRelease, DtaType, DtaValue};

/// dta file reader.
pub struct DtaReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> DtaReader<R> {
    /// Create a new dta reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Read the whole file into memory and parse it.
    pub fn read_dataset(mut self) -> Result<DtaDataset> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        parse_dta(&data)
    }
}

impl DtaReader<File> {
    /// Open a dta file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DtaError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                DtaError::Io(e)
            }
        })?;
        Ok(Self::new(file))
    }
}

/// Read a dta file from a path.
pub fn read_dta(path: &Path) -> Result<DtaDataset> {
    DtaReader::open(path)?.read_dataset()
}

/// Byte cursor over the file contents.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                DtaError::invalid_format(format!("unexpected end of file at offset {}", self.pos))
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn peek(&self, tag: &[u8]) -> bool {
        self.data[self.pos..].starts_with(tag)
    }

    fn expect(&mut self, tag: &[u8]) -> Result<()> {
        if self.peek(tag) {
            self.pos += tag.len();
            Ok(())
        } else {
            Err(DtaError::invalid_format(format!(
                "expected {} at offset {}",
                String::from_utf8_lossy(tag),
                self.pos
            )))
        }
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    /// `K` or a sort list entry, sized by release.
    fn count(&mut self, release: DtaRelease) -> Result<u64> {
        match release {
            DtaRelease::V118 => self.u16().map(u64::from),
            DtaRelease::V119 => self.u32().map(u64::from),
        }
    }
}

/// Parse a complete dta file.
fn parse_dta(data: &[u8]) -> Result<DtaDataset> {
    let mut c = Cursor::new(data);

    c.expect(FILE_OPEN)?;
    c.expect(b"<header><release>")?;
    let digits = c.take(3)?;
    let release = std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .and_then(DtaRelease::from_number)
        .ok_or_else(|| DtaError::UnsupportedRelease {
            release: String::from_utf8_lossy(digits).into_owned(),
        })?;
    c.expect(b"</release><byteorder>")?;
    if c.take(3)? != BYTE_ORDER {
        return Err(DtaError::invalid_format("only LSF byte order is supported"));
    }
    c.expect(b"</byteorder><K>")?;
    let k = to_usize(c.count(release)?)?;
    c.expect(b"</K><N>")?;
    let n = to_usize(c.u64()?)?;
    c.expect(b"</N><label>")?;
    let label_len = usize::from(c.u16()?);
    let label = String::from_utf8_lossy(c.take(label_len)?).into_owned();
    c.expect(b"</label><timestamp>")?;
    let stamp_len = usize::from(c.u8()?);
    c.take(stamp_len)?;
    c.expect(b"</timestamp></header>")?;

    c.expect(b"<map>")?;
    c.take(MAP_ENTRIES * 8)?;
    c.expect(b"</map>")?;

    c.expect(b"<variable_types>")?;
    let mut types = Vec::with_capacity(k);
    for idx in 0..k {
        let code = c.u16()?;
        let ty = DtaType::from_code(code).ok_or_else(|| {
            DtaError::invalid_format(format!("variable {idx} has unknown type code {code}"))
        })?;
        types.push(ty);
    }
    c.expect(b"</variable_types>")?;

    let names = fixed_fields(&mut c, "varnames", k, VARNAME_LEN)?;

    c.expect(b"<sortlist>")?;
    for _ in 0..=k {
        c.count(release)?;
    }
    c.expect(b"</sortlist>")?;

    let formats = fixed_fields(&mut c, "formats", k, FORMAT_LEN)?;
    fixed_fields(&mut c, "value_label_names", k, VALUE_LABEL_NAME_LEN)?;
    let labels = fixed_fields(&mut c, "variable_labels", k, VARIABLE_LABEL_LEN)?;

    c.expect(b"<characteristics>")?;
    while c.peek(b"<ch>") {
        c.expect(b"<ch>")?;
        let len = c.u32()? as usize;
        c.take(len)?;
        c.expect(b"</ch>")?;
    }
    c.expect(b"</characteristics>")?;

    let columns: Vec<DtaColumn> = names
        .into_iter()
        .zip(types)
        .zip(formats.into_iter().zip(labels))
        .map(|((name, data_type), (format, label))| DtaColumn {
            name,
            data_type,
            format,
            label,
        })
        .collect();

    c.expect(b"<data>")?;
    let width: usize = columns.iter().map(|col| col.data_type.width()).sum();
    let total = width
        .checked_mul(n)
        .ok_or_else(|| DtaError::invalid_format("observation data too large"))?;
    let observations = c.take(total)?;
    c.expect(b"</data>")?;

    c.expect(b"<strls>")?;
    let mut strls: HashMap<(u32, u64), String> = HashMap::new();
    while c.peek(GSO_TAG) {
        c.expect(GSO_TAG)?;
        let variable = c.u32()?;
        let observation = c.u64()?;
        let kind = c.u8()?;
        let len = c.u32()? as usize;
        let mut bytes = c.take(len)?;
        if kind == GSO_ASCII && bytes.last() == Some(&0) {
            bytes = &bytes[..bytes.len() - 1];
        }
        strls.insert(
            (variable, observation),
            String::from_utf8_lossy(bytes).into_owned(),
        );
    }
    c.expect(b"</strls>")?;
    c.expect(b"<value_labels>")?;
    if !data.ends_with(FILE_CLOSE) {
        return Err(DtaError::invalid_format("missing </stata_dta>"));
    }

    let mut rows = Vec::with_capacity(n);
    for obs in observations.chunks_exact(width.max(1)).take(n) {
        let mut row = Vec::with_capacity(columns.len());
        let mut pos = 0usize;
        for column in &columns {
            let w = column.data_type.width();
            row.push(decode_value(&obs[pos..pos + w], column.data_type, release, &strls)?);
            pos += w;
        }
        rows.push(row);
    }
    // Zero-width observations still count as rows.
    while rows.len() < n {
        rows.push(Vec::new());
    }

    Ok(DtaDataset {
        label,
        columns,
        rows,
    })
}

fn fixed_fields(c: &mut Cursor<'_>, section: &str, k: usize, width: usize) -> Result<Vec<String>> {
    c.expect(format!("<{section}>").as_bytes())?;
    let mut out = Vec::with_capacity(k);
    for _ in 0..k {
        out.push(read_fixed(c.take(width)?));
    }
    c.expect(format!("</{section}>").as_bytes())?;
    Ok(out)
}

fn decode_value(
    bytes: &[u8],
    data_type: DtaType,
    release: DtaRelease,
    strls: &HashMap<(u32, u64), String>,
) -> Result<DtaValue> {
    let value = match data_type {
        DtaType::Str(_) => DtaValue::Str(read_fixed(bytes)),
        DtaType::StrL => {
            let v_width = release.strl_variable_width();
            let mut v = [0u8; 4];
            v[..v_width].copy_from_slice(&bytes[..v_width]);
            let mut o = [0u8; 8];
            o[..8 - v_width].copy_from_slice(&bytes[v_width..8]);
            let key = (u32::from_le_bytes(v), u64::from_le_bytes(o));
            if key == (0, 0) {
                DtaValue::Str(String::new())
            } else {
                let text = strls.get(&key).ok_or_else(|| {
                    DtaError::invalid_format(format!("missing strL ({}, {})", key.0, key.1))
                })?;
                DtaValue::Str(text.clone())
            }
        }
        DtaType::Double => {
            let v = f64::from_le_bytes(fixed(bytes));
            DtaValue::Num((!is_double_missing(v)).then_some(v))
        }
        DtaType::Float => {
            let v = f32::from_le_bytes(fixed(bytes));
            DtaValue::Num((!is_float_missing(v)).then_some(f64::from(v)))
        }
        DtaType::Long => {
            let v = i32::from_le_bytes(fixed(bytes));
            DtaValue::Num((!is_long_missing(v)).then_some(f64::from(v)))
        }
        DtaType::Int => {
            let v = i16::from_le_bytes(fixed(bytes));
            DtaValue::Num((!is_int_missing(v)).then_some(f64::from(v)))
        }
        DtaType::Byte => {
            let v = i8::from_le_bytes(fixed(bytes));
            DtaValue::Num((!is_byte_missing(v)).then_some(f64::from(v)))
        }
    };
    Ok(value)
}

fn fixed<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

fn to_usize(value: u64) -> Result<usize> {
    usize::try_from(value).map_err(|_| DtaError::invalid_format(format!("count {value} too large")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_dta() {
        let err = parse_dta(b"<xml>not a dta</xml>").unwrap_err();
        assert!(matches!(err, DtaError::InvalidFormat { .. }));
    }

    #[test]
    fn test_rejects_other_release() {
        let err = parse_dta(b"<stata_dta><header><release>117</release>").unwrap_err();
        assert!(matches!(err, DtaError::UnsupportedRelease { release } if release == "117"));
    }

    #[test]
    fn test_truncated_file() {
        let err = parse_dta(b"<stata_dta><header><release>118</release><byteorder>LSF").unwrap_err();
        assert!(matches!(err, DtaError::InvalidFormat { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = read_dta(Path::new("/nonexistent/never/here.dta")).unwrap_err();
        assert!(matches!(err, DtaError::FileNotFound { .. }));
    }
}
