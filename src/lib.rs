// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Canvas API client
//!
//! An async client for the Canvas LMS REST API with bearer authentication,
//! normalized errors and lazy `Link` header pagination.
//!
//! ## Features
//!
//! - **Single requests**: `get`, `request`, `upload`, `sis_import`
//! - **Pagination**: walk an endpoint page by page or element by element
//! - **Redacted errors**: the access token never appears in an [`ApiError`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use canvas_api::{Client, QueryParams, Result};
//! use futures::TryStreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::new("https://canvas.example.edu/api/v1", "token")?;
//!
//!     let me = client.get("users/self", &QueryParams::new()).await?;
//!     println!("{}", me.body["name"]);
//!
//!     // Every course, one page at a time under the hood
//!     let query = QueryParams::new().list("include", ["term"]);
//!     let mut courses = client.list_items("courses", &query);
//!     while let Some(course) = courses.try_next().await? {
//!         println!("{}", course["id"]);
//!     }
//!
//!     // Or collect everything at once
//!     let all = client.list_items("accounts", &QueryParams::new()).to_array().await?;
//!     println!("{} accounts", all.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                           Client                          │
//! │  get  request  upload  sis_import  list_pages  list_items │
//! └───────────────────────────────────────────────────────────┘
//!                 │                          │
//! ┌───────────────┴──────────┐  ┌────────────┴────────────────┐
//! │           HTTP           │  │         Pagination          │
//! ├──────────────────────────┤  ├─────────────────────────────┤
//! │ Transport trait          │  │ Link header parsing         │
//! │ reqwest, retry, backoff  │  │ Page walker, ExtendedStream │
//! └──────────────────────────┘  └─────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP transport with retry and backoff
pub mod http;

/// Link header pagination
pub mod pagination;

/// The API client
pub mod client;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{ApiError, Error, RequestSummary, Result};
pub use types::*;

// Re-export commonly used types
pub use client::{Client, Items, Pages};
pub use http::{ClientOptions, QueryParams, RequestOptions, Response};
pub use pagination::ExtendedStream;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
