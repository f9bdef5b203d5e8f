//! Error types for PageFetch

use thiserror::Error;

/// JSON-RPC error code for invalid method parameters
pub const INVALID_PARAMS: i32 = -32602;

/// JSON-RPC error code for internal errors
pub const INTERNAL_ERROR: i32 = -32603;

/// Broad category of a [`FetchError`], as reported to tool callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-supplied input violates a precondition. No request was sent.
    InvalidParams,
    /// Retrieval failed (transport error or HTTP status >= 400)
    InternalError,
}

impl ErrorKind {
    /// JSON-RPC error code for this kind
    pub fn code(self) -> i32 {
        match self {
            ErrorKind::InvalidParams => INVALID_PARAMS,
            ErrorKind::InternalError => INTERNAL_ERROR,
        }
    }
}

/// Errors that can occur during fetch operations
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL is missing or blank
    #[error("URL is required")]
    MissingUrl,

    /// URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// URL has invalid scheme
    #[error("Invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// Window size of zero
    #[error("Invalid max_length: must be greater than 0")]
    InvalidMaxLength,

    /// URL is blocked by prefix list
    #[error("Blocked URL: prefix not allowed")]
    BlockedUrl,

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Server answered with status >= 400
    #[error("HTTP {status} error fetching {url}")]
    HttpStatus { status: u16, url: String },

    /// Request did not complete within the configured timeout
    #[error("Failed to fetch {url}: request timed out")]
    Timeout { url: String },

    /// Failed to connect to server, `detail` carries the transport cause
    #[error("Failed to fetch {url}: {detail}")]
    ConnectError {
        url: String,
        detail: String,
        #[source]
        source: reqwest::Error,
    },

    /// Other request or body read error
    #[error("Failed to fetch {url}: {message}")]
    RequestError { url: String, message: String },
}

impl FetchError {
    /// Create an error from a reqwest error raised while fetching `url`
    pub fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            FetchError::Timeout { url }
        } else if err.is_connect() {
            FetchError::ConnectError {
                url,
                detail: error_chain(&err),
                source: err,
            }
        } else if let Some(status) = err.status().filter(|s| s.as_u16() >= 400) {
            FetchError::HttpStatus {
                status: status.as_u16(),
                url,
            }
        } else {
            FetchError::RequestError {
                url,
                message: error_chain(&err),
            }
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::MissingUrl
            | FetchError::InvalidUrl(_)
            | FetchError::InvalidUrlScheme
            | FetchError::InvalidMaxLength
            | FetchError::BlockedUrl => ErrorKind::InvalidParams,
            FetchError::ClientBuildError(_)
            | FetchError::HttpStatus { .. }
            | FetchError::Timeout { .. }
            | FetchError::ConnectError { .. }
            | FetchError::RequestError { .. } => ErrorKind::InternalError,
        }
    }

    /// HTTP status code, when the server answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// URL the failed retrieval was aimed at
    pub fn url(&self) -> Option<&str> {
        match self {
            FetchError::HttpStatus { url, .. }
            | FetchError::Timeout { url }
            | FetchError::ConnectError { url, .. }
            | FetchError::RequestError { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Render an error and its causes as `outer: cause: root`
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        let text = inner.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        cause = inner.source();
    }
    message
}
