//! API request handlers
//!
//! Upload errors are reported as `{"error": ...}` and export errors as
//! `{"detail": ...}`; both use 400 for bad input and 500 otherwise.

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
        State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::server::AppState;
use crate::error::BridgeError;
use crate::excel::{TableExporter, TableImporter, DOWNLOAD_FILENAME, XLSX_CONTENT_TYPE};
use crate::types::{Item, TablePayload};

pub const WELCOME_MESSAGE: &str = "Welcome to FastAPI-Vue Project";

/// Multipart field carrying the uploaded file
pub const UPLOAD_FIELD: &str = "file";

//==============================================================================
// Error responses
//==============================================================================

fn status_for(err: &BridgeError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn log_failure(err: &BridgeError) {
    match err {
        BridgeError::InvalidFormat(detail) => warn!(%detail, "Rejected malformed input"),
        e if e.is_client_error() => warn!(error = %e, "Rejected request"),
        e => error!(error = %e, "Request failed"),
    }
}

/// Failure of `POST /uploadfile/`, rendered as `{"error": message}`
#[derive(Debug)]
pub struct UploadError(pub BridgeError);

impl From<BridgeError> for UploadError {
    fn from(err: BridgeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        log_failure(&self.0);
        (
            status_for(&self.0),
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

/// Failure of `POST /downloadfile/`, rendered as `{"detail": message}`
#[derive(Debug)]
pub struct ExportError(pub BridgeError);

impl From<BridgeError> for ExportError {
    fn from(err: BridgeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ExportError {
    fn into_response(self) -> Response {
        log_failure(&self.0);
        (
            status_for(&self.0),
            Json(json!({ "detail": self.0.to_string() })),
        )
            .into_response()
    }
}

/// Body-shape rejections keep the framework's status code
fn rejection_response(rejection: JsonRejection) -> Response {
    warn!(error = %rejection.body_text(), "Rejected request body");
    (
        rejection.status(),
        Json(json!({ "detail": rejection.body_text() })),
    )
        .into_response()
}

//==============================================================================
// Demo endpoints
//==============================================================================

/// GET / - Welcome message
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

/// Health check response
#[derive(Serialize, Deserialize, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health - Health check
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    })
}

/// POST /items/ - Echo a validated item
pub async fn create_item(payload: Result<Json<Item>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(item)) => Json(json!({ "item": item })).into_response(),
        Err(rejection) => rejection_response(rejection),
    }
}

//==============================================================================
// Upload: file → JSON
//==============================================================================

/// POST /uploadfile/ - Convert an uploaded .csv / .xlsx into a split-layout table
pub async fn upload_file(multipart: Result<Multipart, MultipartRejection>) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("upload", %request_id);

    async move {
        match convert_upload(multipart).await {
            Ok(table) => Json(json!({ "data": table })).into_response(),
            Err(err) => err.into_response(),
        }
    }
    .instrument(span)
    .await
}

async fn convert_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<TablePayload, UploadError> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Upload is not multipart");
        BridgeError::UnsupportedFormat
    })?;

    let (filename, bytes) = loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(BridgeError::UnsupportedFormat.into()),
            Err(e) => {
                warn!(error = %e.body_text(), "Malformed multipart body");
                return Err(BridgeError::UnsupportedFormat.into());
            }
        };
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(BridgeError::UnsupportedFormat.into()),
        };
        // Reject by extension before reading the body
        TableImporter::from_upload(&filename, &[])?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| BridgeError::InvalidFormat(e.body_text()))?;
        break (filename, bytes);
    };

    info!(%filename, bytes = bytes.len(), "Received upload");
    let table = TableImporter::from_upload(&filename, &bytes)?.import()?;
    debug!(payload = %serde_json::to_string(&table).unwrap_or_default(), "Parsed upload");

    Ok(table)
}

//==============================================================================
// Download: JSON → styled workbook
//==============================================================================

/// Export request body
#[derive(Deserialize, Debug)]
pub struct ExportRequest {
    pub data: Map<String, Value>,
}

/// POST /downloadfile/ - Render a split-layout table as a styled .xlsx download
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    let request_id = Uuid::new_v4();
    let span = info_span!("download", %request_id);

    match span.in_scope(|| export_workbook(&state, request)) {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", DOWNLOAD_FILENAME),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

fn export_workbook(state: &AppState, request: ExportRequest) -> Result<Vec<u8>, ExportError> {
    let table = TablePayload::from_request(request.data)?;
    let bytes = TableExporter::new(table).to_buffer()?;
    let path = state.output.save(&bytes)?;
    info!(path = %path.display(), "Exported workbook");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_client_error() {
        assert_eq!(status_for(&BridgeError::EmptyData), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&BridgeError::InvalidRequestBody),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_status_for_server_error() {
        let err = BridgeError::Io(std::io::Error::other("disk full"));
        assert_eq!(status_for(&err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_upload_error_status() {
        let response = UploadError(BridgeError::UnsupportedFormat).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_export_error_status() {
        let err = BridgeError::Io(std::io::Error::other("read-only"));
        let response = ExportError(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_export_request_deserialize() {
        let json = r#"{"data": {"index": [0], "columns": ["a"], "data": [[1]]}}"#;
        let req: ExportRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.data.len(), 3);
    }

    #[test]
    fn test_export_request_requires_object() {
        let result: Result<ExportRequest, _> = serde_json::from_str(r#"{"data": [1, 2]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_health_response_serialize() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.3.0".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
    }
}
