use reqwest::StatusCode;

/// Result type for bridge operations
pub type Result<T, E = BridgeError> = std::result::Result<T, E>;

/// Error type for bridge operations
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Request could not be sent or its body not read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The controller answered with a non-success status
    #[error("Controller answered {0}")]
    Status(StatusCode),

    /// Body was not the expected JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Server URL could not be parsed
    #[error("Invalid server URL: {0}")]
    Url(#[from] url::ParseError),

    /// API key or device id cannot be sent as a header
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// The bridge was disposed
    #[error("Bridge disposed")]
    Disposed,
}
