//! Tablebridge HTTP API module
//!
//! Upload/download conversion endpoints plus the demo item route.
//! Run with `tablebridge-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server, ApiConfig};
