//! Tablebridge API server implementation
//!
//! HTTP server using Axum. Serves the upload/download conversion endpoints and
//! the demo item endpoint.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::writer::OutputDir;

/// Origins allowed when none are configured
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:8080",
];

/// Upload size cap applied to every route
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// API Server configuration
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Directory receiving exported workbooks
    pub output_dir: PathBuf,
    pub allowed_origins: Vec<String>,
    pub max_body_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            output_dir: PathBuf::from("output"),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|o| o.to_string())
                .collect(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Shared application state
#[derive(Clone, Debug)]
pub struct AppState {
    pub version: String,
    pub output: OutputDir,
}

impl AppState {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            output: OutputDir::new(&config.output_dir),
        }
    }
}

/// CORS layer for a fixed origin list; credentials allowed, methods and
/// headers mirrored from the preflight.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin: {}", o))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

/// Build the application router from configuration
pub fn build_router(config: &ApiConfig) -> anyhow::Result<Router> {
    let state = Arc::new(AppState::new(config));
    let cors = cors_layer(&config.allowed_origins)?;

    Ok(Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/items/", post(handlers::create_item))
        .route("/uploadfile/", post(handlers::upload_file))
        .route("/downloadfile/", post(handlers::download_file))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

/// Install the global tracing subscriber (idempotent)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tablebridge=info,tower_http=info".into()),
        )
        .try_init();
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig) -> anyhow::Result<()> {
    init_tracing();

    let app = build_router(&config)?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Tablebridge API server starting on http://{}", addr);
    info!("   Endpoints: /uploadfile/, /downloadfile/, /items/");
    info!("   Output directory: {}", config.output_dir.display());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Tablebridge API server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== ApiConfig Tests ====================

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.allowed_origins.len(), 3);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn test_config_address_format() {
        let config = ApiConfig {
            host: "192.168.1.100".to_string(),
            port: 9090,
            ..ApiConfig::default()
        };
        let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse().unwrap();
        assert_eq!(addr.port(), 9090);
    }

    // ==================== AppState Tests ====================

    #[test]
    fn test_app_state_uses_configured_output_dir() {
        let config = ApiConfig {
            output_dir: PathBuf::from("/tmp/exports"),
            ..ApiConfig::default()
        };
        let state = AppState::new(&config);
        assert_eq!(state.output.root(), PathBuf::from("/tmp/exports").as_path());
        assert_eq!(state.version, env!("CARGO_PKG_VERSION"));
    }

    // ==================== CORS Tests ====================

    #[test]
    fn test_cors_layer_accepts_default_origins() {
        assert!(cors_layer(&ApiConfig::default().allowed_origins).is_ok());
    }

    #[test]
    fn test_cors_layer_rejects_invalid_origin() {
        let err = cors_layer(&["http://bad\norigin".to_string()]).unwrap_err();
        assert!(err.to_string().contains("invalid CORS origin"));
    }
}
