//! Error types for the Canvas API client
//!
//! Every public API returns `Result<T, Error>`. Failures reported by the
//! server or the network are normalized into [`ApiError`] before they reach
//! the caller, with the bearer credential removed from every field.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// The main error type for the client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Remote Errors
    // ============================================================================
    #[error(transparent)]
    Api(Box<ApiError>),

    // ============================================================================
    // Usage Errors
    // ============================================================================
    #[error("Usage error: {message}")]
    Usage { message: String },

    #[error(
        "The function \"list_items()\" should be used with endpoints that return arrays. \
         Use \"get()\" or \"list_pages()\" instead with the endpoint [{endpoint}]."
    )]
    NotAList { endpoint: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // I/O and Parsing Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl Error {
    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create the error raised when a page body is not an array
    pub fn not_a_list(endpoint: impl Into<String>) -> Self {
        Self::NotAList {
            endpoint: endpoint.into(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// API misuse detected before any request was sent
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Error::Usage { .. } | Error::NotAList { .. } | Error::FileNotFound { .. }
        )
    }

    /// The normalized remote failure, if this is one
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status of the failed response, if the server answered
    pub fn status(&self) -> Option<u16> {
        self.api_error().and_then(|err| err.status)
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Self::Api(Box::new(err))
    }
}

/// Result type alias for the client
pub type Result<T> = std::result::Result<T, Error>;

/// A failed request, as reported to callers
///
/// Thrown when Canvas responds with a non 2xx/3xx status or when the
/// request never got a response. `status` is `None` in the latter case and
/// `status_text` holds the transport's reason.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// HTTP status code
    pub status: Option<u16>,
    /// Status message (or network failure reason)
    pub status_text: String,
    /// Response body, `null` when there was none
    pub body: Value,
    /// The request that failed, credentials hidden
    pub request: RequestSummary,
}

/// Method, URL and headers of a failed request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestSummary {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "Response code {status} ({})", self.status_text),
            None => write!(
                f,
                "Request to {} failed: {}",
                self.request.url, self.status_text
            ),
        }
    }
}

impl std::error::Error for ApiError {}
