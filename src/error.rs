use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("File format not supported. Please upload a .csv or .xlsx file.")]
    UnsupportedFormat,

    #[error("No data in the file.")]
    EmptyData,

    /// Parser detail is kept for logging; the message shown to clients is fixed.
    #[error("Invalid file format.")]
    InvalidFormat(String),

    #[error("Invalid request body")]
    InvalidRequestBody,

    #[error("Missing 'index', 'columns', or 'data' in the request body")]
    MissingKeys,

    #[error("Value error: {0}")]
    Value(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write spreadsheet: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BridgeError {
    /// Errors caused by the caller's input (HTTP 400) as opposed to server faults.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BridgeError::UnsupportedFormat
                | BridgeError::EmptyData
                | BridgeError::InvalidFormat(_)
                | BridgeError::InvalidRequestBody
                | BridgeError::MissingKeys
                | BridgeError::Value(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_classified() {
        assert!(BridgeError::UnsupportedFormat.is_client_error());
        assert!(BridgeError::EmptyData.is_client_error());
        assert!(BridgeError::InvalidFormat("bad zip".into()).is_client_error());
        assert!(BridgeError::MissingKeys.is_client_error());
        assert!(BridgeError::Value("x".into()).is_client_error());
    }

    #[test]
    fn test_io_error_is_server_error() {
        let err: BridgeError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), "IO error: denied");
    }

    #[test]
    fn test_invalid_format_hides_parser_detail() {
        let err = BridgeError::InvalidFormat("Expected 2 fields in line 3, saw 4".into());
        assert_eq!(err.to_string(), "Invalid file format.");
    }

    #[test]
    fn test_value_error_message() {
        let err = BridgeError::Value("1 columns passed, passed data had 2 columns".into());
        assert_eq!(
            err.to_string(),
            "Value error: 1 columns passed, passed data had 2 columns"
        );
    }
}
