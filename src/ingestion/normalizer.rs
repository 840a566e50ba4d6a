use super::types::RawRecord;

use calamine::{DataType, Reader, Xls, Xlsx};
use std::collections::HashMap;
use std::io::Cursor;
use thiserror::Error;

pub const MIME_CSV: &str = "text/csv";
pub const MIME_XLSX: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const MIME_XLS: &str = "application/vnd.ms-excel";

#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The declared content type matches neither the delimited-text nor the
    /// spreadsheet family.
    #[error("Invalid file format: {mime}")]
    UnsupportedFormat { mime: String },

    /// The workbook container itself could not be read. Individual cells
    /// never fail; this is stream-level only.
    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    /// The CSV stream could not be opened. Row-level oddities (short rows,
    /// bad encoding) are absorbed, not raised.
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Normalizes raw file bytes into a uniform record sequence.
///
/// Dispatches on the declared MIME type: `text/csv` takes the delimited-text
/// path, the two Excel types take the spreadsheet path (first sheet, header
/// row required, dates kept in their ISO form). Anything else is an
/// `UnsupportedFormat`.
///
/// Zero records is a valid output here; rejecting an empty upload is the
/// caller's decision.
pub fn normalize(bytes: &[u8], mime: &str) -> Result<Vec<RawRecord>, NormalizeError> {
    // Declared types may carry parameters ("text/csv; charset=utf-8").
    let family = mime.split(';').next().unwrap_or("").trim();
    match family {
        MIME_CSV => normalize_csv(bytes),
        MIME_XLSX => {
            let mut workbook = Xlsx::new(Cursor::new(bytes.to_vec()))
                .map_err(|err| NormalizeError::Spreadsheet(err.to_string()))?;
            // First sheet only; later sheets are ignored.
            let range = match workbook.sheet_names().first().cloned() {
                Some(name) => match workbook.worksheet_range(&name) {
                    Some(Ok(range)) => range,
                    Some(Err(err)) => {
                        return Err(NormalizeError::Spreadsheet(err.to_string()))
                    }
                    None => return Ok(Vec::new()),
                },
                None => return Ok(Vec::new()),
            };
            Ok(records_from_range(&range))
        }
        MIME_XLS => {
            let mut workbook = Xls::new(Cursor::new(bytes.to_vec()))
                .map_err(|err| NormalizeError::Spreadsheet(err.to_string()))?;
            let range = match workbook.sheet_names().first().cloned() {
                Some(name) => match workbook.worksheet_range(&name) {
                    Some(Ok(range)) => range,
                    Some(Err(err)) => {
                        return Err(NormalizeError::Spreadsheet(err.to_string()))
                    }
                    None => return Ok(Vec::new()),
                },
                None => return Ok(Vec::new()),
            };
            Ok(records_from_range(&range))
        }
        other => Err(NormalizeError::UnsupportedFormat {
            mime: other.to_string(),
        }),
    }
}

fn normalize_csv(bytes: &[u8]) -> Result<Vec<RawRecord>, NormalizeError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for row in reader.byte_records() {
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                tracing::warn!("Skipping unreadable CSV row: {}", err);
                continue;
            }
        };
        let cells: Vec<String> = row
            .iter()
            .map(|cell| String::from_utf8_lossy(cell).trim().to_string())
            .collect();
        records.push(assemble_record(&headers, |i| {
            cells.get(i).map(|cell| {
                (cell.clone(), serde_json::Value::String(cell.clone()))
            })
        }));
    }

    Ok(records)
}

fn records_from_range(range: &calamine::Range<DataType>) -> Vec<RawRecord> {
    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(cell_to_string).collect(),
        None => return Vec::new(),
    };

    let mut records = Vec::new();
    for row in rows {
        records.push(assemble_record(&headers, |i| {
            row.get(i).map(|cell| (cell_to_string(cell), cell_to_value(cell)))
        }));
    }

    records
}

/// Builds one record from a header list and a cell accessor returning the
/// cell at column `i` as (display string, retained value).
///
/// Missing cells default to empty string for the recognized columns and are
/// omitted from `extra`; rows longer than the header are truncated to it.
fn assemble_record<F>(headers: &[String], cell_at: F) -> RawRecord
where
    F: Fn(usize) -> Option<(String, serde_json::Value)>,
{
    let mut record = RawRecord {
        first_name: String::new(),
        phone: String::new(),
        notes: String::new(),
        extra: HashMap::new(),
    };

    for (i, header) in headers.iter().enumerate() {
        let Some((text, value)) = cell_at(i) else {
            continue;
        };
        match field_key(header).as_str() {
            "firstname" => record.first_name = text,
            "phone" => record.phone = text,
            "notes" => record.notes = text,
            _ => {
                let key = header.trim();
                if !key.is_empty() {
                    record.extra.insert(key.to_string(), value);
                }
            }
        }
    }

    record
}

/// Canonical form of a column header: `firstName`, `first_name`, and
/// `First Name` all address the same field.
fn field_key(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .replace(['_', ' ', '-'], "")
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.trim().to_string(),
        DataType::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        DataType::Int(i) => i.to_string(),
        DataType::Bool(b) => b.to_string(),
        // Date cells stay dates, rendered in ISO form.
        DataType::DateTime(serial) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
            .unwrap_or_else(|| serial.to_string()),
        DataType::DateTimeIso(s) => s.clone(),
        DataType::Duration(d) => d.to_string(),
        DataType::DurationIso(s) => s.clone(),
        DataType::Error(e) => format!("#{e:?}"),
        DataType::Empty => String::new(),
    }
}

fn cell_to_value(cell: &DataType) -> serde_json::Value {
    match cell {
        DataType::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        DataType::Int(i) => serde_json::Value::Number((*i).into()),
        DataType::Bool(b) => serde_json::Value::Bool(*b),
        DataType::Empty => serde_json::Value::String(String::new()),
        other => serde_json::Value::String(cell_to_string(other)),
    }
}
