//! reqwest-backed transport
//!
//! Handles:
//! - Per-request timeouts
//! - Retries of idempotent requests with configurable backoff
//! - Response body parsing
//! - Classification of failures into [`TransportError`]

use super::options::ClientOptions;
use super::transport::{FormValue, HttpRequest, RequestBody, Response, Transport, TransportError};
use crate::error::{Error, Result};
use crate::types::{BackoffType, JsonValue};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use std::error::Error as _;
use std::time::Duration;
use tracing::warn;

/// Default [`Transport`] built on a shared reqwest connection pool
pub struct HttpClient {
    client: Client,
    timeout: Duration,
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    backoff_type: BackoffType,
}

impl HttpClient {
    /// Create a transport from client options
    pub fn with_options(options: &ClientOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(&options.user_agent)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout: options.timeout,
            max_retries: options.max_retries,
            initial_backoff: options.initial_backoff,
            max_backoff: options.max_backoff,
            backoff_type: options.backoff_type,
        })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.backoff_type {
            BackoffType::Constant => self.initial_backoff,
            BackoffType::Linear => self.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.initial_backoff * factor
            }
        };

        std::cmp::min(delay, self.max_backoff)
    }

    /// Delay before the next attempt
    ///
    /// A server-provided `Retry-After` wins over the backoff schedule but is
    /// capped at `max_backoff`.
    pub fn retry_delay(&self, retry_after: Option<Duration>, attempt: u32) -> Duration {
        match retry_after {
            Some(delay) => std::cmp::min(delay, self.max_backoff),
            None => self.calculate_backoff(attempt),
        }
    }

    fn build(&self, request: &HttpRequest) -> std::result::Result<reqwest::Request, TransportError> {
        let mut req = self
            .client
            .request(request.method.into(), request.url.clone())
            .headers(request.headers.clone())
            .timeout(request.timeout.unwrap_or(self.timeout));

        match &request.body {
            RequestBody::Empty => {}
            RequestBody::Json(body) => req = req.json(body),
            RequestBody::Multipart(parts) => {
                let mut form = Form::new();
                for part in parts {
                    form = match &part.value {
                        FormValue::Text(text) => form.text(part.name.clone(), text.clone()),
                        FormValue::File {
                            file_name,
                            content_type,
                            data,
                        } => {
                            let file = Part::bytes(data.to_vec())
                                .file_name(file_name.clone())
                                .mime_str(content_type)
                                .map_err(|e| TransportError::network(e.to_string()))?;
                            form.part(part.name.clone(), file)
                        }
                    };
                }
                req = req.multipart(form);
            }
        }

        req.build()
            .map_err(|e| TransportError::network(format!("Invalid request: {e}")))
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("backoff_type", &self.backoff_type)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn send(&self, request: &HttpRequest) -> std::result::Result<Response, TransportError> {
        let max_retries = if request.method.is_idempotent() {
            self.max_retries
        } else {
            0
        };
        let timeout = request.timeout.unwrap_or(self.timeout);
        let mut attempt = 0;

        loop {
            // Multipart forms are consumed on send, so rebuild every attempt
            let req = self.build(request)?;

            match self.client.execute(req).await {
                Ok(response) => {
                    let status = response.status();

                    if is_retryable_status(status) && attempt < max_retries {
                        let retry_after = match status {
                            StatusCode::TOO_MANY_REQUESTS => extract_retry_after(&response),
                            _ => None,
                        };
                        let delay = self.retry_delay(retry_after, attempt);
                        warn!(
                            "Request failed with {}, attempt {}/{}, retrying in {:?}",
                            status.as_u16(),
                            attempt + 1,
                            max_retries + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    let headers = response.headers().clone();
                    let bytes = response
                        .bytes()
                        .await
                        .map_err(|e| TransportError::network(format!("Failed to read response body: {e}")))?;
                    let body = parse_body(&bytes);

                    if status.is_client_error() || status.is_server_error() {
                        return Err(TransportError::Status {
                            status: status.as_u16(),
                            status_text: status.canonical_reason().unwrap_or_default().to_string(),
                            body,
                        });
                    }

                    return Ok(Response {
                        status: status.as_u16(),
                        headers,
                        body,
                    });
                }
                Err(e) => {
                    let retryable = e.is_timeout() || e.is_connect();
                    if retryable && attempt < max_retries {
                        let delay = self.calculate_backoff(attempt);
                        warn!(
                            "Request error ({}), attempt {}/{}, retrying in {:?}",
                            if e.is_timeout() { "timeout" } else { "connect" },
                            attempt + 1,
                            max_retries + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    if e.is_timeout() {
                        return Err(TransportError::network(format!(
                            "Request timeout after {}ms",
                            timeout.as_millis()
                        )));
                    }
                    return Err(TransportError::network(error_chain(&e)));
                }
            }
        }
    }
}

/// Check if an HTTP status is retryable
fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status.as_u16(),
        429 | 500 | 502 | 503 | 504 | 520 | 521 | 522 | 523 | 524
    )
}

/// Extract retry-after header value
fn extract_retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
}

/// JSON when possible, a JSON string otherwise, `null` when empty
pub(crate) fn parse_body(bytes: &[u8]) -> JsonValue {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return JsonValue::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| JsonValue::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
