//! Tablebridge - CSV/XLSX ⇄ JSON table exchange
//!
//! This library converts uploaded spreadsheets into split-layout JSON tables
//! (`index`, `columns`, `data`) and renders such tables back into styled
//! `.xlsx` workbooks. The `api` module exposes both directions over HTTP.
//!
//! # Example
//!
//! ```no_run
//! use tablebridge::excel::{TableExporter, TableImporter};
//! use tablebridge::writer::OutputDir;
//!
//! let bytes = std::fs::read("parts.csv")?;
//! let table = TableImporter::from_upload("parts.csv", &bytes)?.import()?;
//!
//! println!("Columns: {}", table.columns.len());
//!
//! let workbook = TableExporter::new(table).to_buffer()?;
//! let path = OutputDir::new("output").save(&workbook)?;
//! println!("Saved {}", path.display());
//! # Ok::<(), tablebridge::error::BridgeError>(())
//! ```

pub mod api;
pub mod cli;
pub mod error;
pub mod excel;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use error::{BridgeError, BridgeResult};
pub use types::{Item, TablePayload};
