//! Flat-record codec for the CSV file boundary
//!
//! Nested structures are flattened with two delimiter levels: repeated
//! sub-items within a cell are joined with `|`, and the fields of a single
//! sub-item are joined with `;`. Nothing outside this module builds or
//! splits those strings.
//!
//! Decoding is deliberately permissive about sub-items: one with the wrong
//! number of fields, or with a field that does not parse, is skipped with a
//! warning and the rest of the row still decodes. Required scalar columns are
//! strict and fail the row with [`Error::MalformedRow`].

use csv::{ReaderBuilder, StringRecord};
use std::io::{Read, Write};

use crate::{Error, Result};

mod environment;
mod scoped;

pub use environment::{
    ENVIRONMENT_EXPORT_HEADER, ENVIRONMENT_IMPORT_HEADER, decode_environment_row,
    encode_environment_record,
};
pub use scoped::{
    SCOPED_IMPORT_HEADER, SECRET_EXPORT_HEADER, VARIABLE_EXPORT_HEADER, decode_scoped_row,
    encode_secret_record, encode_variable_record,
};

/// Separates repeated sub-items within one cell
pub const ITEM_SEPARATOR: char = '|';
/// Separates the fields of one sub-item
pub const FIELD_SEPARATOR: char = ';';

/// A sub-item stored as `;`-joined fields inside a `|`-joined cell
pub(crate) trait SubItem: Sized {
    /// Used in warnings for skipped sub-items
    const KIND: &'static str;
    const ARITY: usize;

    fn fields(&self) -> Vec<String>;

    /// Build from exactly `ARITY` fields; the error is a short reason
    fn from_fields(fields: &[&str]) -> std::result::Result<Self, String>;
}

pub(crate) fn encode_items<T: SubItem>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.fields().join(&FIELD_SEPARATOR.to_string()))
        .collect::<Vec<_>>()
        .join(&ITEM_SEPARATOR.to_string())
}

/// Decode a cell into sub-items, skipping the ones that do not conform.
/// `context` names the record for the warning.
pub(crate) fn decode_items<T: SubItem>(cell: &str, context: &str) -> Vec<T> {
    if cell.trim().is_empty() {
        return Vec::new();
    }

    cell.split(ITEM_SEPARATOR)
        .filter_map(|part| {
            let fields: Vec<&str> = part.split(FIELD_SEPARATOR).collect();
            if fields.len() != T::ARITY {
                tracing::warn!(
                    "Skipping {} {:?} for {}: expected {} fields, found {}",
                    T::KIND,
                    part,
                    context,
                    T::ARITY,
                    fields.len()
                );
                return None;
            }
            match T::from_fields(&fields) {
                Ok(item) => Some(item),
                Err(reason) => {
                    tracing::warn!("Skipping {} {:?} for {}: {}", T::KIND, part, context, reason);
                    None
                }
            }
        })
        .collect()
}

/// Typed, line-aware access to the cells of one CSV record
pub(crate) struct Row<'a> {
    record: &'a StringRecord,
    line: u64,
}

impl<'a> Row<'a> {
    pub(crate) fn new(record: &'a StringRecord) -> Self {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        Self { record, line }
    }

    pub(crate) fn line(&self) -> u64 {
        self.line
    }

    fn malformed(&self, column: &'static str, value: &str) -> Error {
        Error::MalformedRow {
            line: self.line,
            column,
            value: value.to_string(),
        }
    }

    /// A cell that must be present; it may be empty
    pub(crate) fn cell(&self, index: usize, column: &'static str) -> Result<&'a str> {
        self.record
            .get(index)
            .ok_or_else(|| self.malformed(column, "<missing column>"))
    }

    /// A cell that may be absent entirely (older file layouts)
    pub(crate) fn optional_cell(&self, index: usize) -> &'a str {
        self.record.get(index).unwrap_or("")
    }

    pub(crate) fn non_empty(&self, index: usize, column: &'static str) -> Result<&'a str> {
        let value = self.cell(index, column)?;
        if value.trim().is_empty() {
            return Err(self.malformed(column, value));
        }
        Ok(value)
    }

    pub(crate) fn required_u64(&self, index: usize, column: &'static str) -> Result<u64> {
        let value = self.cell(index, column)?;
        value
            .trim()
            .parse()
            .map_err(|_| self.malformed(column, value))
    }

    /// Integer cell where an empty value means zero
    pub(crate) fn u32_or_zero(&self, index: usize, column: &'static str) -> Result<u32> {
        let value = self.cell(index, column)?;
        if value.trim().is_empty() {
            return Ok(0);
        }
        value
            .trim()
            .parse()
            .map_err(|_| self.malformed(column, value))
    }

    /// Strict `true`/`false`, where an empty value means false
    pub(crate) fn flag(&self, index: usize, column: &'static str) -> Result<bool> {
        let value = self.cell(index, column)?;
        if value.trim().is_empty() {
            return Ok(false);
        }
        value
            .trim()
            .parse()
            .map_err(|_| self.malformed(column, value))
    }

    pub(crate) fn reject(&self, column: &'static str, value: &str) -> Error {
        self.malformed(column, value)
    }
}

/// One data row of an input file, or the reason it could not be read
#[derive(Debug)]
pub struct InputRow {
    pub line: u64,
    pub record: Result<StringRecord>,
}

/// Read every data row of a CSV file, skipping the header row.
///
/// Rows may have differing lengths; column checks happen per row during
/// decoding so one short row does not abort the file. A row that is not
/// valid UTF-8 is kept as an error for that row only. Only an I/O failure
/// fails the whole file.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<InputRow>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in csv_reader.byte_records() {
        let bytes = match result {
            Ok(bytes) => bytes,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                rows.push(InputRow {
                    line,
                    record: Err(e.into()),
                });
                continue;
            }
        };

        let line = bytes.position().map(|p| p.line()).unwrap_or(0);
        let record = StringRecord::from_byte_record(bytes).map_err(|e| Error::InvalidEncoding {
            line,
            field: e.utf8_error().field() + 1,
        });
        rows.push(InputRow { line, record });
    }
    Ok(rows)
}

/// Create a CSV writer with the header row already written
pub fn writer_with_header<W: Write>(inner: W, header: &[&str]) -> Result<csv::Writer<W>> {
    let mut writer = csv::Writer::from_writer(inner);
    writer.write_record(header)?;
    Ok(writer)
}

#[cfg(test)]
mod tests;
