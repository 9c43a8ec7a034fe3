//! CLI command handlers

pub mod commands;

pub use commands::{to_json, to_xlsx};
