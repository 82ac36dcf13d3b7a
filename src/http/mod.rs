//! HTTP layer
//!
//! Everything below the client facade: the [`Transport`] seam, the request
//! and response shapes that cross it, query string serialization and the
//! default reqwest transport.
//!
//! # Features
//!
//! - **Bracket-array queries**: `ids[]=1&ids[]=2`
//! - **Automatic Retries**: idempotent requests only, with backoff
//! - **Per-request Timeouts**: configured once, overridable per call

mod client;
mod options;
mod query;
mod transport;

pub use client::HttpClient;
pub use options::{ClientOptions, ClientOptionsBuilder, RequestOptions};
pub use query::{QueryParams, QueryValue};
pub use transport::{
    FormPart, FormValue, HttpRequest, RequestBody, Response, Transport, TransportError,
};
