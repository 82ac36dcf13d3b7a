//! Canvas API client
//!
//! [`Client`] owns the base URL, the credential and the transport. It offers
//! single requests (`get`, `request`, `upload`, `sis_import`) and two views
//! of a paginated endpoint (`list_pages`, `list_items`), all sharing one
//! error normalization path.

mod redact;
mod upload;

pub use redact::HIDDEN;
pub use upload::{ATTACHMENT_FIELD, SIS_IMPORT_ENDPOINT};

use crate::error::{Error, Result};
use crate::http::{
    ClientOptions, HttpClient, HttpRequest, QueryParams, RequestBody, RequestOptions, Response,
    Transport,
};
use crate::pagination::{flatten_items, walk_pages, ExtendedStream, PageRequest, PageSource};
use crate::types::{JsonValue, Method};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use redact::Redactor;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Every page of a paginated endpoint
pub type Pages = ExtendedStream<BoxStream<'static, Result<Response>>>;

/// Every element of every page of a paginated endpoint
pub type Items = ExtendedStream<BoxStream<'static, Result<JsonValue>>>;

/// Client for one Canvas instance and one credential
///
/// Cloning is cheap and clones share the same immutable configuration.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    base_url: String,
    headers: HeaderMap,
    transport: Arc<dyn Transport>,
    redactor: Redactor,
}

/// Where a request goes
#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    /// Relative to the base URL
    Endpoint(&'a str),
    /// Used verbatim
    Absolute(&'a str),
}

impl Client {
    /// Create a client with default options
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Self::with_options(base_url, token, ClientOptions::default())
    }

    /// Create a client with custom options
    pub fn with_options(
        base_url: impl Into<String>,
        token: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self> {
        let transport = HttpClient::with_options(&options)?;
        Self::with_transport(base_url, token, options, Arc::new(transport))
    }

    /// Create a client on top of a custom transport
    ///
    /// Only the default headers of `options` are used here; the remaining
    /// settings belong to the transport.
    pub fn with_transport(
        base_url: impl Into<String>,
        token: impl Into<String>,
        options: ClientOptions,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let token = token.into();

        let mut headers = HeaderMap::new();
        for (key, value) in &options.default_headers {
            let (name, value) = header_pair(key, value)?;
            headers.insert(name, value);
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            Error::config("API token contains characters that are not allowed in a header")
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        Ok(Self {
            inner: Arc::new(Inner {
                base_url: base_url.into(),
                headers,
                transport,
                redactor: Redactor::new(token),
            }),
        })
    }

    /// Base URL every endpoint is resolved against
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The transport used for every request
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.inner.transport
    }

    // ========================================================================
    // Single requests
    // ========================================================================

    /// Perform a non-paginated GET request
    pub async fn get(&self, endpoint: &str, query: &QueryParams) -> Result<Response> {
        self.get_with_options(endpoint, query, RequestOptions::default())
            .await
    }

    /// Perform a non-paginated GET request with extra options
    pub async fn get_with_options(
        &self,
        endpoint: &str,
        query: &QueryParams,
        options: RequestOptions,
    ) -> Result<Response> {
        self.send(
            Method::GET,
            Target::Endpoint(endpoint),
            query,
            RequestBody::Empty,
            &options,
        )
        .await
    }

    /// Perform a request to a non-GET endpoint
    ///
    /// `body` is sent as JSON unless it is `null`. GET requests are
    /// rejected; use [`get`](Self::get), [`list_items`](Self::list_items) or
    /// [`list_pages`](Self::list_pages) instead.
    pub async fn request(&self, endpoint: &str, method: Method, body: JsonValue) -> Result<Response> {
        self.request_with_options(endpoint, method, body, RequestOptions::default())
            .await
    }

    /// Perform a request to a non-GET endpoint with extra options
    pub async fn request_with_options(
        &self,
        endpoint: &str,
        method: Method,
        body: JsonValue,
        options: RequestOptions,
    ) -> Result<Response> {
        if method == Method::GET {
            return Err(Error::usage(
                "You cannot make a GET request with `request`. Use `get`, `list_items` or `list_pages` instead",
            ));
        }

        let body = match body {
            JsonValue::Null => RequestBody::Empty,
            body => RequestBody::Json(body),
        };
        self.send(
            method,
            Target::Endpoint(endpoint),
            &QueryParams::new(),
            body,
            &options,
        )
        .await
    }

    /// Upload a file as multipart/form-data
    ///
    /// `fields` are sent first, in order, followed by the file under
    /// [`ATTACHMENT_FIELD`].
    pub async fn upload<I, K, V>(
        &self,
        endpoint: &str,
        path: impl AsRef<Path>,
        fields: I,
    ) -> Result<Response>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.upload_with_options(endpoint, path, fields, RequestOptions::default())
            .await
    }

    /// Upload a file with extra options
    pub async fn upload_with_options<I, K, V>(
        &self,
        endpoint: &str,
        path: impl AsRef<Path>,
        fields: I,
        options: RequestOptions,
    ) -> Result<Response>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let parts = upload::build_form(path.as_ref(), fields).await?;
        self.send(
            Method::POST,
            Target::Endpoint(endpoint),
            &QueryParams::new(),
            RequestBody::Multipart(parts),
            &options,
        )
        .await
    }

    /// Import SIS data from a CSV or ZIP file
    ///
    /// Posts to `accounts/1/sis_import` without extra parameters such as
    /// `import_type`; use [`upload`](Self::upload) when those are needed.
    pub async fn sis_import(&self, path: impl AsRef<Path>) -> Result<Response> {
        self.sis_import_with_options(path, RequestOptions::default())
            .await
    }

    /// Import SIS data with extra options
    pub async fn sis_import_with_options(
        &self,
        path: impl AsRef<Path>,
        options: RequestOptions,
    ) -> Result<Response> {
        self.upload_with_options(
            SIS_IMPORT_ENDPOINT,
            path,
            Vec::<(String, String)>::new(),
            options,
        )
        .await
    }

    // ========================================================================
    // Paginated requests
    // ========================================================================

    /// Iterate through every page of a paginated endpoint
    pub fn list_pages(&self, endpoint: &str, query: &QueryParams) -> Pages {
        self.list_pages_with_options(endpoint, query, RequestOptions::default())
    }

    /// Iterate through every page with extra options, re-sent on every page
    pub fn list_pages_with_options(
        &self,
        endpoint: &str,
        query: &QueryParams,
        options: RequestOptions,
    ) -> Pages {
        ExtendedStream::new(walk_pages(self.clone(), endpoint.to_string(), query.clone(), options).boxed())
    }

    /// Iterate through every element of every page
    ///
    /// Every page must be a JSON array; otherwise the stream fails with
    /// [`Error::NotAList`]. Use [`list_pages`](Self::list_pages) for other
    /// shapes.
    pub fn list_items(&self, endpoint: &str, query: &QueryParams) -> Items {
        self.list_items_with_options(endpoint, query, RequestOptions::default())
    }

    /// Iterate through every element with extra options
    pub fn list_items_with_options(
        &self,
        endpoint: &str,
        query: &QueryParams,
        options: RequestOptions,
    ) -> Items {
        let pages = walk_pages(self.clone(), endpoint.to_string(), query.clone(), options);
        ExtendedStream::new(flatten_items(pages, endpoint.to_string()).boxed())
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    fn build_url(&self, target: Target<'_>, query: &QueryParams) -> Result<Url> {
        let raw = match target {
            Target::Endpoint(endpoint) => resolve_url(&self.inner.base_url, endpoint),
            Target::Absolute(url) => url.to_string(),
        };

        let mut url = Url::parse(&raw)?;
        if let Some(extra) = query.to_query_string() {
            let combined = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{existing}&{extra}"),
                _ => extra,
            };
            url.set_query(Some(&combined));
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        target: Target<'_>,
        query: &QueryParams,
        body: RequestBody,
        options: &RequestOptions,
    ) -> Result<Response> {
        let url = self.build_url(target, query)?;

        let mut headers = self.inner.headers.clone();
        for (key, value) in &options.headers {
            let (name, value) = header_pair(key, value)?;
            headers.insert(name, value);
        }

        let request = HttpRequest {
            method,
            url,
            headers,
            body,
            timeout: options.timeout,
        };
        let redactor = &self.inner.redactor;

        debug!("Request {method} {}", redactor.scrub(request.url.as_str()));
        match self.inner.transport.send(&request).await {
            Ok(response) => {
                debug!(
                    "Response from {method} {}",
                    redactor.scrub(request.url.as_str())
                );
                Ok(response)
            }
            Err(err) => Err(redactor.normalize(err, &request)),
        }
    }
}

#[async_trait]
impl PageSource for Client {
    async fn fetch_page(&self, request: PageRequest, options: &RequestOptions) -> Result<Response> {
        match request {
            PageRequest::First { endpoint, query } => {
                self.send(
                    Method::GET,
                    Target::Endpoint(&endpoint),
                    &query,
                    RequestBody::Empty,
                    options,
                )
                .await
            }
            PageRequest::Next { url } => {
                self.send(
                    Method::GET,
                    Target::Absolute(&url),
                    &QueryParams::new(),
                    RequestBody::Empty,
                    options,
                )
                .await
            }
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

/// Join an endpoint to a base URL with exactly one `/`
///
/// Any query string on the endpoint is kept.
pub fn resolve_url(base_url: &str, endpoint: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let endpoint = endpoint.trim_start_matches('/');
    format!("{base}/{endpoint}")
}

fn header_pair(key: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let name = HeaderName::from_bytes(key.as_bytes())
        .map_err(|_| Error::config(format!("Invalid header name: {key}")))?;
    let value = HeaderValue::from_str(value)
        .map_err(|_| Error::config(format!("Invalid value for header '{key}'")))?;
    Ok((name, value))
}
