//! Transport abstraction
//!
//! The client never talks to the network directly. It builds an
//! [`HttpRequest`] with an absolute URL and hands it to a [`Transport`],
//! which owns connection handling, TLS, timeouts and retries.

use crate::types::{JsonValue, Method};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// A fully resolved request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL, query string included
    pub url: Url,
    /// Request headers (credentials included)
    pub headers: HeaderMap,
    /// Request body
    pub body: RequestBody,
    /// Per-request timeout override
    pub timeout: Option<Duration>,
}

/// Body of an outgoing request
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// JSON document
    Json(JsonValue),
    /// multipart/form-data, parts in send order
    Multipart(Vec<FormPart>),
}

/// One part of a multipart body
#[derive(Debug, Clone)]
pub struct FormPart {
    /// Field name
    pub name: String,
    /// Field content
    pub value: FormValue,
}

/// Content of a multipart field
#[derive(Clone)]
pub enum FormValue {
    /// Plain text field
    Text(String),
    /// File content
    File {
        file_name: String,
        content_type: String,
        data: Bytes,
    },
}

impl std::fmt::Debug for FormValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::File {
                file_name,
                content_type,
                data,
            } => f
                .debug_struct("File")
                .field("file_name", file_name)
                .field("content_type", content_type)
                .field("len", &data.len())
                .finish(),
        }
    }
}

impl FormPart {
    /// Create a text field
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    /// Create a file field
    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            value: FormValue::File {
                file_name: file_name.into(),
                content_type: content_type.into(),
                data: data.into(),
            },
        }
    }
}

/// A successful (2xx/3xx) response
///
/// During pagination each response is one page: its body holds the page
/// content and its `Link` header points at the next page.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed body: JSON when possible, a JSON string otherwise, `null` when empty
    pub body: JsonValue,
}

impl Response {
    /// First value of a header, if it is valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// All `Link` header values joined with `, `
    pub fn link_header(&self) -> Option<String> {
        let values: Vec<&str> = self
            .headers
            .get_all(reqwest::header::LINK)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();

        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }

    /// Deserialize the body
    pub fn json<T: DeserializeOwned>(&self) -> crate::error::Result<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

/// Raw transport failure
///
/// Never surfaced to callers as-is; the client normalizes it into an
/// [`ApiError`](crate::error::ApiError).
#[derive(Debug, Clone)]
pub enum TransportError {
    /// The server answered with a 4xx/5xx status
    Status {
        status: u16,
        status_text: String,
        body: JsonValue,
    },
    /// No response was received (connect failure, timeout, invalid request)
    Network { message: String },
}

impl TransportError {
    /// Create a network failure
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }
}

/// Sends resolved requests
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the response, or the failure
    async fn send(&self, request: &HttpRequest) -> Result<Response, TransportError>;
}
