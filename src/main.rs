use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tablebridge::cli;
use tablebridge::error::BridgeResult;

#[derive(Parser)]
#[command(name = "tablebridge")]
#[command(about = "Convert CSV/XLSX files to split-layout JSON tables and back.")]
#[command(long_about = "Tablebridge - CSV/XLSX ⇄ JSON table exchange

COMMANDS:
  to-json   - Read a .csv or .xlsx file into {\"data\": {index, columns, data}}
  to-xlsx   - Render a split-layout JSON table as a styled .xlsx file

EXAMPLES:
  tablebridge to-json parts.csv --pretty
  tablebridge to-xlsx payload.json --output-dir exports/

The HTTP API is served by the separate `tablebridge-server` binary.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a .csv or .xlsx file to a split-layout JSON table
    ToJson {
        /// Path to the .csv or .xlsx file
        input: PathBuf,

        /// Write the JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    #[command(long_about = "Render a split-layout JSON table as a styled .xlsx file.

Accepts either {\"data\": {index, columns, data}} or the bare table object.
Files are created as output.xlsx, output_1.xlsx, ... in the output directory
and existing files are never overwritten.")]
    /// Convert a split-layout JSON table to a styled .xlsx file
    ToXlsx {
        /// Path to the JSON payload
        input: PathBuf,

        /// Directory receiving the workbook
        #[arg(short = 'd', long, default_value = "output", env = "TABLEBRIDGE_OUTPUT_DIR")]
        output_dir: PathBuf,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> BridgeResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::ToJson {
            input,
            output,
            pretty,
        } => cli::to_json(input, output, pretty),

        Commands::ToXlsx {
            input,
            output_dir,
            verbose,
        } => cli::to_xlsx(input, output_dir, verbose).map(|_| ()),
    }
}
