//! Spreadsheet import/export module
//!
//! This module provides both directions of the table exchange:
//! - Import: uploaded .csv / .xlsx → split-layout JSON table
//! - Export: split-layout JSON table → styled .xlsx

mod exporter;
mod importer;
pub mod style;

pub use exporter::{header_text, TableExporter, DOWNLOAD_FILENAME, XLSX_CONTENT_TYPE};
pub use importer::{SourceFormat, TableImporter};
pub use style::{style_for, StyleSpec};
