//! Survey platform XML export loading.
//!
//! An export is a root element holding one `<Response>` element per
//! response. Each direct child of a response is a field whose text becomes
//! the cell value:
//!
//! ```xml
//! <Responses>
//!   <Response>
//!     <_recordId>R_1</_recordId>
//!     <PROLIFIC_PID>5f1a2b3c4d5e6f7a8b9c0d1e</PROLIFIC_PID>
//!     <distributionChannel>anonymous</distributionChannel>
//!   </Response>
//! </Responses>
//! ```
//!
//! The resulting table has one string column per field name in first-seen
//! order. Fields missing from a response are null; empty elements are `""`.
//! A field's value is the text before its first child element; text inside
//! or after nested elements is ignored.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, Event};
use tracing::{debug, info};

use crate::error::{IngestError, Result};

/// Element name of a single response.
pub const RESPONSE_ELEMENT: &str = "Response";

const RESPONSE_DEPTH: usize = 2;
const FIELD_DEPTH: usize = 3;

/// A parsed export.
#[derive(Debug, Clone)]
pub struct ResponseExport {
    /// One row per response, one string column per field.
    pub frame: DataFrame,
    /// File the export was read from, if any.
    pub source: Option<PathBuf>,
}

impl ResponseExport {
    pub fn response_count(&self) -> usize {
        self.frame.height()
    }

    pub fn field_count(&self) -> usize {
        self.frame.width()
    }
}

/// Read an export file into a response table.
pub fn read_response_export(path: &Path) -> Result<ResponseExport> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = Reader::from_reader(BufReader::new(file));
    let frame = parse_responses(reader, path)?;
    info!(
        path = %path.display(),
        responses = frame.height(),
        columns = frame.width(),
        "parsed response export"
    );
    Ok(ResponseExport {
        frame,
        source: Some(path.to_path_buf()),
    })
}

/// Parse an export held in memory.
pub fn read_response_export_str(xml: &str) -> Result<ResponseExport> {
    let frame = parse_responses(Reader::from_str(xml), Path::new("<memory>"))?;
    Ok(ResponseExport {
        frame,
        source: None,
    })
}

fn parse_responses<R: BufRead>(mut reader: Reader<R>, source: &Path) -> Result<DataFrame> {
    let mut builder = TableBuilder::default();
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut in_response = false;
    let mut field: Option<(String, String)> = None;
    // Set once the current field has a child element; later text is not its own.
    let mut field_closed = false;
    let mut record: Vec<(String, String)> = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| IngestError::xml(source, reader.error_position() as u64, e))?;
        match event {
            Event::Start(start) => {
                depth += 1;
                let name = decode(&reader, start.name().as_ref(), source)?;
                if depth == RESPONSE_DEPTH && name == RESPONSE_ELEMENT {
                    in_response = true;
                    record.clear();
                } else if depth == FIELD_DEPTH && in_response {
                    field = Some((name, String::new()));
                    field_closed = false;
                } else if depth > FIELD_DEPTH {
                    field_closed = true;
                }
            }
            Event::Empty(empty) => {
                let name = decode(&reader, empty.name().as_ref(), source)?;
                let level = depth + 1;
                if level == RESPONSE_DEPTH && name == RESPONSE_ELEMENT {
                    builder.push_record(Vec::new());
                } else if level == FIELD_DEPTH && in_response {
                    record.push((name, String::new()));
                } else if level > FIELD_DEPTH {
                    field_closed = true;
                }
            }
            Event::Text(text) if depth == FIELD_DEPTH && !field_closed => {
                if let Some((_, value)) = field.as_mut() {
                    value.push_str(&decode(&reader, &text, source)?);
                }
            }
            Event::CData(data) if depth == FIELD_DEPTH && !field_closed => {
                if let Some((_, value)) = field.as_mut() {
                    value.push_str(&decode(&reader, &data, source)?);
                }
            }
            Event::GeneralRef(reference) if depth == FIELD_DEPTH && !field_closed => {
                if let Some((_, value)) = field.as_mut() {
                    value.push_str(&resolve_reference(&reader, &reference, source)?);
                }
            }
            Event::End(_) => {
                if depth == FIELD_DEPTH && in_response {
                    if let Some(done) = field.take() {
                        record.push(done);
                    }
                } else if depth == RESPONSE_DEPTH && in_response {
                    in_response = false;
                    builder.push_record(std::mem::take(&mut record));
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    debug!(
        source = %source.display(),
        responses = builder.rows,
        fields = builder.columns.len(),
        "collected responses"
    );
    builder.finish()
}

fn resolve_reference<R>(
    reader: &Reader<R>,
    reference: &BytesRef<'_>,
    source: &Path,
) -> Result<String> {
    let resolved = reference
        .resolve_char_ref()
        .map_err(|e| IngestError::xml(source, reader.buffer_position() as u64, e))?;
    if let Some(ch) = resolved {
        return Ok(ch.to_string());
    }
    let name = decode(reader, reference, source)?;
    resolve_predefined_entity(&name)
        .map(str::to_string)
        .ok_or_else(|| {
            IngestError::xml(
                source,
                reader.buffer_position() as u64,
                format!("unknown entity &{name};"),
            )
        })
}

fn decode<R>(reader: &Reader<R>, bytes: &[u8], source: &Path) -> Result<String> {
    reader
        .decoder()
        .decode(bytes)
        .map(|value| value.into_owned())
        .map_err(|e| IngestError::xml(source, reader.buffer_position() as u64, e))
}

/// Accumulates records into column vectors, keeping first-seen column order.
#[derive(Default)]
struct TableBuilder {
    columns: Vec<(String, Vec<Option<String>>)>,
    index: HashMap<String, usize>,
    rows: usize,
}

impl TableBuilder {
    fn push_record(&mut self, fields: Vec<(String, String)>) {
        let row = self.rows;
        self.rows += 1;
        for (name, value) in fields {
            let idx = match self.index.get(&name) {
                Some(idx) => *idx,
                None => {
                    let idx = self.columns.len();
                    self.columns.push((name.clone(), vec![None; row + 1]));
                    self.index.insert(name, idx);
                    idx
                }
            };
            let values = &mut self.columns[idx].1;
            values.resize(row + 1, None);
            // A repeated field in one response keeps its last value.
            values[row] = Some(value);
        }
        for (_, values) in &mut self.columns {
            values.resize(self.rows, None);
        }
    }

    fn finish(self) -> Result<DataFrame> {
        let columns: Vec<Column> = self
            .columns
            .into_iter()
            .map(|(name, values)| Series::new(name.as_str().into(), values).into_column())
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}
