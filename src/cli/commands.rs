use crate::error::{BridgeError, BridgeResult};
use crate::excel::{TableExporter, TableImporter};
use crate::types::TablePayload;
use crate::writer::OutputDir;
use colored::Colorize;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Execute the to-json command
///
/// With no `output`, the payload is the only thing written to stdout.
pub fn to_json(input: PathBuf, output: Option<PathBuf>, pretty: bool) -> BridgeResult<()> {
    let table = read_upload(&input)?;
    let body = json!({ "data": table });
    let text = if pretty {
        serde_json::to_string_pretty(&body)?
    } else {
        serde_json::to_string(&body)?
    };

    match output {
        Some(path) => {
            fs::write(&path, text)?;
            println!("{}", "✅ Converted to JSON".bold().green());
            println!("   Input:   {}", input.display());
            println!("   Output:  {}", path.display());
            println!(
                "   Table:   {} columns, {} rows\n",
                table.column_count(),
                table.row_count()
            );
        }
        None => println!("{}", text),
    }

    Ok(())
}

/// Execute the to-xlsx command
pub fn to_xlsx(input: PathBuf, output_dir: PathBuf, verbose: bool) -> BridgeResult<PathBuf> {
    println!("{}", "📊 Tablebridge - Excel Export".bold().green());
    println!("   Input:  {}\n", input.display());

    let table = read_payload(&input)?;
    if verbose {
        println!(
            "   Found {} columns, {} rows",
            table.column_count(),
            table.row_count()
        );
        println!("{}", "   Rendering styled workbook...".cyan());
    }

    let bytes = TableExporter::new(table).to_buffer()?;
    let path = OutputDir::new(&output_dir).save(&bytes)?;

    println!("{}", "✅ Export Complete!".bold().green());
    println!("   Excel file: {}\n", path.display());

    Ok(path)
}

/// Parse a local .csv / .xlsx exactly as an upload would be
pub fn read_upload(path: &Path) -> BridgeResult<TablePayload> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or(BridgeError::UnsupportedFormat)?;
    TableImporter::from_upload(filename, &[])?;

    let bytes = fs::read(path)?;
    TableImporter::from_upload(filename, &bytes)?.import()
}

/// Read a payload file holding either `{"data": {...}}` or a bare split table
pub fn read_payload(path: &Path) -> BridgeResult<TablePayload> {
    let value: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    let body = match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Object(inner)) => inner,
            Some(other) => {
                map.insert("data".to_string(), other);
                map
            }
            None => map,
        },
        _ => return Err(BridgeError::InvalidRequestBody),
    };
    TablePayload::from_request(body)
}
