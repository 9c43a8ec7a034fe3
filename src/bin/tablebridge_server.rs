//! Tablebridge API server binary
//!
//! Serves the upload (file → JSON) and download (JSON → styled .xlsx) endpoints.

use std::path::PathBuf;

use clap::Parser;
use tablebridge::api::server::{ApiConfig, DEFAULT_MAX_BODY_BYTES};
use tablebridge::api::run_api_server;

#[derive(Parser, Debug)]
#[command(name = "tablebridge-server")]
#[command(version)]
#[command(about = "Tablebridge API Server - CSV/XLSX ⇄ JSON table exchange over HTTP")]
#[command(long_about = r#"
Tablebridge API Server

Endpoints:
  - GET  /               - Welcome message
  - GET  /health         - Health check
  - POST /items/         - Validate and echo an item
  - POST /uploadfile/    - Multipart .csv/.xlsx upload → {"data": {index, columns, data}}
  - POST /downloadfile/  - {"data": {index, columns, data}} → styled output.xlsx

Exported workbooks accumulate in the output directory as output.xlsx,
output_1.xlsx, ... and are never deleted.

Example usage:
  tablebridge-server                            # Start on localhost:8000
  tablebridge-server --host 0.0.0.0 --port 3000 --output-dir /srv/exports

  curl -F "file=@parts.csv" http://localhost:8000/uploadfile/
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "TABLEBRIDGE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8000", env = "TABLEBRIDGE_PORT")]
    port: u16,

    /// Directory receiving exported workbooks (created if absent)
    #[arg(short, long, default_value = "output", env = "TABLEBRIDGE_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Allowed CORS origins, comma separated
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "http://localhost:5173,http://127.0.0.1:5173,http://localhost:8080",
        env = "TABLEBRIDGE_ALLOWED_ORIGINS"
    )]
    allowed_origins: Vec<String>,

    /// Maximum request body size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES, env = "TABLEBRIDGE_MAX_BODY_BYTES")]
    max_body_bytes: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        output_dir: args.output_dir,
        allowed_origins: args.allowed_origins,
        max_body_bytes: args.max_body_bytes,
    };

    run_api_server(config).await
}
