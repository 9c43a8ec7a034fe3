//! Excel exporter implementation - split-layout JSON → styled .xlsx

use crate::error::BridgeResult;
use crate::excel::style::{is_empty_cell, style_for};
use crate::types::TablePayload;
use rust_xlsxwriter::{Workbook, Worksheet};
use serde_json::Value;
use tracing::debug;

/// Download name presented to clients regardless of the on-disk name
pub const DOWNLOAD_FILENAME: &str = "output.xlsx";

/// MIME type of the rendered workbook
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Renders a table to a single styled worksheet.
///
/// Row labels (`index`) are not written; the sheet starts with the header row.
pub struct TableExporter {
    table: TablePayload,
}

impl TableExporter {
    pub fn new(table: TablePayload) -> Self {
        Self { table }
    }

    /// Render the workbook into memory
    pub fn to_buffer(&self) -> BridgeResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        self.write_header(worksheet)?;
        self.write_body(worksheet)?;

        let buffer = workbook.save_to_buffer()?;
        debug!(
            rows = self.table.row_count(),
            columns = self.table.column_count(),
            bytes = buffer.len(),
            "Rendered workbook"
        );
        Ok(buffer)
    }

    fn write_header(&self, worksheet: &mut Worksheet) -> BridgeResult<()> {
        for (col_idx, name) in self.table.columns.iter().enumerate() {
            let col = col_idx as u16;
            let format = style_for(0, col, name).to_format();
            worksheet.write_string_with_format(0, col, header_text(name), &format)?;
        }
        Ok(())
    }

    fn write_body(&self, worksheet: &mut Worksheet) -> BridgeResult<()> {
        for (row_idx, row) in self.table.data.iter().enumerate() {
            let excel_row = (row_idx + 1) as u32; // row 0 is the header
            for (col_idx, value) in row.iter().enumerate() {
                write_cell(worksheet, excel_row, col_idx as u16, value)?;
            }
        }
        Ok(())
    }
}

/// Header text for a column name of any JSON type
pub fn header_text(name: &Value) -> String {
    match name {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &Value) -> BridgeResult<()> {
    let format = style_for(row, col, value).to_format();

    if is_empty_cell(value) {
        worksheet.write_blank(row, col, &format)?;
        return Ok(());
    }

    match value {
        Value::Bool(b) => {
            worksheet.write_boolean_with_format(row, col, *b, &format)?;
        }
        Value::Number(n) => match n.as_f64() {
            Some(f) => {
                worksheet.write_number_with_format(row, col, f, &format)?;
            }
            None => {
                worksheet.write_string_with_format(row, col, n.to_string(), &format)?;
            }
        },
        Value::String(s) => {
            worksheet.write_string_with_format(row, col, s, &format)?;
        }
        // Nested lists and objects are kept as their JSON text
        other => {
            worksheet.write_string_with_format(row, col, other.to_string(), &format)?;
        }
    }
    Ok(())
}
