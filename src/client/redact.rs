//! Error normalization
//!
//! Turns a [`TransportError`] into an [`ApiError`] and removes the bearer
//! credential from everything the error carries.

use crate::error::{ApiError, Error, RequestSummary};
use crate::http::{HttpRequest, TransportError};
use crate::types::JsonValue;
use reqwest::header::AUTHORIZATION;
use std::collections::BTreeMap;
use url::form_urlencoded::byte_serialize;

/// Replacement for hidden values
pub const HIDDEN: &str = "[HIDDEN]";

/// Scrubs one secret out of error data
///
/// Besides the raw text, the forms the secret takes once percent-encoded
/// into a URL are removed too (`7~abc` appears as `7%7Eabc` in a query).
#[derive(Clone)]
pub(crate) struct Redactor {
    needles: Vec<String>,
}

impl std::fmt::Debug for Redactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Redactor")
    }
}

impl Redactor {
    pub(crate) fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        if secret.is_empty() {
            return Self {
                needles: Vec::new(),
            };
        }

        let form: String = byte_serialize(secret.as_bytes()).collect();
        let path = form.replace('+', "%20");
        let mut needles = vec![
            lower_hex(&form),
            lower_hex(&path),
            form,
            path,
            secret,
        ];
        // Longest first so a shorter form never splits a longer one
        needles.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        needles.dedup();

        Self { needles }
    }

    /// Replace every occurrence of the secret
    pub(crate) fn scrub(&self, text: &str) -> String {
        self.needles
            .iter()
            .fold(text.to_string(), |text, needle| text.replace(needle.as_str(), HIDDEN))
    }

    /// Scrub every string (keys included) of a JSON document
    pub(crate) fn scrub_json(&self, value: JsonValue) -> JsonValue {
        if self.needles.is_empty() {
            return value;
        }
        match value {
            JsonValue::String(s) => JsonValue::String(self.scrub(&s)),
            JsonValue::Array(items) => {
                JsonValue::Array(items.into_iter().map(|v| self.scrub_json(v)).collect())
            }
            JsonValue::Object(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(k, v)| (self.scrub(&k), self.scrub_json(v)))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Method, URL and headers of a request, with `authorization` hidden
    pub(crate) fn summarize(&self, request: &HttpRequest) -> RequestSummary {
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in &request.headers {
            let value = if *name == AUTHORIZATION {
                HIDDEN.to_string()
            } else {
                value
                    .to_str()
                    .map_or_else(|_| HIDDEN.to_string(), |v| self.scrub(v))
            };
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        RequestSummary {
            method: request.method.to_string(),
            url: self.scrub(request.url.as_str()),
            headers,
        }
    }

    /// Normalize a transport failure for the request that caused it
    pub(crate) fn normalize(&self, err: TransportError, request: &HttpRequest) -> Error {
        let request = self.summarize(request);
        let api_error = match err {
            TransportError::Status {
                status,
                status_text,
                body,
            } => ApiError {
                status: Some(status),
                status_text: self.scrub(&status_text),
                body: self.scrub_json(body),
                request,
            },
            TransportError::Network { message } => ApiError {
                status: None,
                status_text: self.scrub(&message),
                body: JsonValue::Null,
                request,
            },
        };
        Error::from(api_error)
    }
}

/// Lower-case the hex digits of every `%XX` escape
fn lower_hex(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len());
    let mut chars = encoded.chars();
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '%' {
            out.extend(chars.by_ref().take(2).map(|h| h.to_ascii_lowercase()));
        }
    }
    out
}
