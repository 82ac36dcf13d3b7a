//! Pagination module
//!
//! Canvas paginates list endpoints with `Link` headers. This module walks
//! them lazily and exposes the result as [`ExtendedStream`]s.
//!
//! # Overview
//!
//! - [`next_url`] finds the `rel="next"` entry of a `Link` header
//! - [`walk_pages`] yields one response per page, following next links
//! - [`flatten_items`] yields the elements of array-shaped pages
//! - [`ExtendedStream`] adds `to_array` to any stream

mod extended;
mod link_header;
mod walker;

pub use extended::ExtendedStream;
pub use link_header::{find_link, next_url};
pub use walker::{flatten_items, walk_pages, PageRequest, PageSource};
