//! Upload importer implementation - .csv / .xlsx → split-layout JSON

use crate::error::{BridgeError, BridgeResult};
use crate::types::TablePayload;
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::io::Cursor;
use tracing::debug;

/// Cell texts read as missing values
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Upload format, chosen from the filename suffix only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Xlsx,
}

impl SourceFormat {
    pub fn from_filename(filename: &str) -> BridgeResult<Self> {
        if filename.ends_with(".csv") {
            Ok(SourceFormat::Csv)
        } else if filename.ends_with(".xlsx") {
            Ok(SourceFormat::Xlsx)
        } else {
            Err(BridgeError::UnsupportedFormat)
        }
    }
}

/// Converts an uploaded file into a [`TablePayload`]
pub struct TableImporter<'a> {
    format: SourceFormat,
    bytes: &'a [u8],
}

impl<'a> TableImporter<'a> {
    /// Validate the filename and wrap the upload; nothing is parsed yet
    pub fn from_upload(filename: &str, bytes: &'a [u8]) -> BridgeResult<Self> {
        let format = SourceFormat::from_filename(filename)?;
        Ok(Self { format, bytes })
    }

    /// Parse the upload
    pub fn import(&self) -> BridgeResult<TablePayload> {
        if self.bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(BridgeError::EmptyData);
        }

        let table = match self.format {
            SourceFormat::Csv => import_csv(self.bytes)?,
            SourceFormat::Xlsx => import_xlsx(self.bytes)?,
        };

        debug!(
            format = ?self.format,
            rows = table.row_count(),
            columns = table.column_count(),
            "Imported upload"
        );
        Ok(table)
    }
}

//==============================================================================
// CSV
//==============================================================================

fn import_csv(bytes: &[u8]) -> BridgeResult<TablePayload> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record.map_err(csv_error)?,
        None => return Err(BridgeError::EmptyData),
    };
    let columns = normalize_headers(header.iter().map(str::to_string).collect());
    let width = columns.len();

    let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
    for record in records {
        let record = record.map_err(csv_error)?;
        if record.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(BridgeError::InvalidFormat(format!(
                "Expected {} fields in line {}, saw {}",
                width,
                line,
                record.len()
            )));
        }
        let mut row: Vec<Option<String>> = record.iter().map(parse_na).collect();
        row.resize(width, None);
        raw_rows.push(row);
    }

    let mut data: Vec<Vec<Value>> = vec![Vec::with_capacity(width); raw_rows.len()];
    for col in 0..width {
        let cells: Vec<Option<&str>> = raw_rows.iter().map(|row| row[col].as_deref()).collect();
        for (row_idx, value) in infer_text_column(&cells).into_iter().enumerate() {
            data[row_idx].push(value);
        }
    }

    Ok(TablePayload::with_range_index(
        columns.into_iter().map(Value::String).collect(),
        data,
    ))
}

fn csv_error(err: csv::Error) -> BridgeError {
    match err.kind() {
        csv::ErrorKind::Io(_) => BridgeError::Io(std::io::Error::other(err.to_string())),
        _ => BridgeError::InvalidFormat(err.to_string()),
    }
}

fn parse_na(cell: &str) -> Option<String> {
    if NA_VALUES.contains(&cell) {
        None
    } else {
        Some(cell.to_string())
    }
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextColumnKind {
    Int,
    Float,
    Bool,
    Text,
}

/// Infer one type for a whole column of raw texts and convert every cell to it.
/// Surrounding whitespace is ignored when recognising numbers and booleans.
fn infer_text_column(cells: &[Option<&str>]) -> Vec<Value> {
    let present: Vec<&str> = cells.iter().flatten().map(|c| c.trim()).collect();
    let has_nulls = present.len() < cells.len();

    let kind = if present.is_empty() {
        TextColumnKind::Float
    } else if present.iter().all(|c| c.parse::<i64>().is_ok()) {
        if has_nulls {
            TextColumnKind::Float
        } else {
            TextColumnKind::Int
        }
    } else if present.iter().all(|c| c.parse::<f64>().is_ok()) {
        TextColumnKind::Float
    } else if present.iter().all(|c| parse_bool(c).is_some()) {
        TextColumnKind::Bool
    } else {
        TextColumnKind::Text
    };

    cells
        .iter()
        .map(|cell| match (cell, kind) {
            (None, _) => Value::Null,
            (Some(c), TextColumnKind::Int) => {
                c.trim().parse::<i64>().map(Value::from).unwrap_or(Value::Null)
            }
            (Some(c), TextColumnKind::Float) => {
                c.trim().parse::<f64>().map(float_value).unwrap_or(Value::Null)
            }
            (Some(c), TextColumnKind::Bool) => {
                parse_bool(c.trim()).map(Value::Bool).unwrap_or(Value::Null)
            }
            (Some(c), TextColumnKind::Text) => Value::String((*c).to_string()),
        })
        .collect()
}

//==============================================================================
// XLSX
//==============================================================================

fn import_xlsx(bytes: &[u8]) -> BridgeResult<TablePayload> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| BridgeError::InvalidFormat(format!("Failed to open Excel file: {}", e)))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range
            .map_err(|e| BridgeError::InvalidFormat(format!("Failed to read worksheet: {}", e)))?,
        None => return Err(BridgeError::EmptyData),
    };

    table_from_range(&range)
}

fn table_from_range(range: &Range<Data>) -> BridgeResult<TablePayload> {
    if range.is_empty() {
        return Err(BridgeError::EmptyData);
    }

    let mut rows = range.rows();
    let header = match rows.next() {
        Some(row) => row,
        None => return Err(BridgeError::EmptyData),
    };
    let columns = normalize_headers(header.iter().map(header_cell_text).collect());
    let width = columns.len();

    let mut data: Vec<Vec<Value>> = rows
        .map(|row| {
            let mut values: Vec<Value> = row.iter().map(cell_value).collect();
            values.resize(width, Value::Null);
            values
        })
        .collect();

    for col in 0..width {
        harmonize_numeric_column(&mut data, col);
    }

    Ok(TablePayload::with_range_index(
        columns.into_iter().map(Value::String).collect(),
        data,
    ))
}

fn header_cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => cell_value(other)
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| other.to_string()),
    }
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => text_or_null(s),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => float_value(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                float_value(dt.as_f64())
            } else {
                excel_serial_to_iso(dt.as_f64())
                    .map(Value::String)
                    .unwrap_or(Value::Null)
            }
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(e) => text_or_null(&e.to_string()),
    }
}

/// Text cells carrying a missing-value marker read as null, as in CSV uploads
fn text_or_null(text: &str) -> Value {
    parse_na(text).map(Value::String).unwrap_or(Value::Null)
}

/// Excel serial day number (1900 system) → ISO-8601 text
fn excel_serial_to_iso(serial: f64) -> Option<String> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    let moment: NaiveDateTime = epoch.checked_add_signed(Duration::milliseconds(millis))?;
    if moment.time() == chrono::NaiveTime::MIN {
        Some(moment.date().format("%Y-%m-%d").to_string())
    } else {
        Some(moment.format("%Y-%m-%dT%H:%M:%S").to_string())
    }
}

/// Purely numeric columns become all-integer when every cell is integral and
/// present, otherwise all-float. Columns with any non-numeric cell are left as-is.
fn harmonize_numeric_column(data: &mut [Vec<Value>], col: usize) {
    let mut has_nulls = false;
    let mut all_integral = true;
    let mut any_number = false;

    for row in data.iter() {
        match &row[col] {
            Value::Null => has_nulls = true,
            Value::Number(n) => {
                any_number = true;
                let integral = n.is_i64()
                    || n.is_u64()
                    || n
                        .as_f64()
                        .map(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                        .unwrap_or(false);
                all_integral &= integral;
            }
            _ => return,
        }
    }
    if !any_number {
        return;
    }

    let as_int = all_integral && !has_nulls;
    for row in data.iter_mut() {
        if let Value::Number(n) = &row[col] {
            let f = n.as_f64().unwrap_or(f64::NAN);
            row[col] = if as_int {
                Value::from(f as i64)
            } else {
                float_value(f)
            };
        }
    }
}

//==============================================================================
// Shared helpers
//==============================================================================

/// JSON number for `f`, keeping a fractional representation (`1.0` stays `1.0`).
/// Non-finite values become null.
fn float_value(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

/// Name empty headers `Unnamed: {i}` and suffix repeats with `.1`, `.2`, ...
fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names: Vec<String> = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            name
        };

        let mut candidate = base.clone();
        while let Some(count) = seen.get(&candidate).copied() {
            let next = count + 1;
            seen.insert(candidate.clone(), next);
            candidate = format!("{}.{}", base, next);
        }
        seen.insert(candidate.clone(), 0);
        names.push(candidate);
    }

    names
}
