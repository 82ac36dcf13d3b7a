//! Page walking and item flattening
//!
//! One primitive ([`walk_pages`]) follows `rel="next"` links and yields one
//! [`Response`] per page. [`flatten_items`] is a thin view over it that yields
//! the elements of array-shaped pages.

use super::link_header::next_url;
use crate::error::{Error, Result};
use crate::http::{QueryParams, RequestOptions, Response};
use crate::types::JsonValue;
use async_trait::async_trait;
use futures::future;
use futures::stream::{self, Stream, TryStreamExt};
use tracing::debug;

/// A single page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// First page: an endpoint relative to the base URL plus query parameters
    First {
        endpoint: String,
        query: QueryParams,
    },
    /// Later pages: the absolute URL from the previous `Link` header, as-is
    Next { url: String },
}

/// Something that can fetch pages
///
/// Implemented by [`Client`](crate::Client); failures must already be
/// normalized.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Issue a GET for one page
    async fn fetch_page(&self, request: PageRequest, options: &RequestOptions) -> Result<Response>;
}

enum Step {
    Fetch(PageRequest),
    Done,
}

/// Lazily walk a paginated endpoint
///
/// Page N+1 is requested only when the consumer polls after page N. The
/// walk ends after a page without a `next` link and stops at the first
/// error. A new call starts a new walk from `endpoint`.
pub fn walk_pages<P>(
    source: P,
    endpoint: String,
    query: QueryParams,
    options: RequestOptions,
) -> impl Stream<Item = Result<Response>> + Send
where
    P: PageSource,
{
    let first = PageRequest::First { endpoint, query };

    stream::try_unfold(
        (source, options, Step::Fetch(first), 0usize),
        |(source, options, step, page)| async move {
            let request = match step {
                Step::Fetch(request) => request,
                Step::Done => return Ok(None),
            };

            let response = source.fetch_page(request, &options).await?;
            let page = page + 1;

            let next = match next_url(response.link_header().as_deref()) {
                Some(url) => {
                    debug!("Page {page} fetched, next page at {url}");
                    Step::Fetch(PageRequest::Next {
                        url: url.to_string(),
                    })
                }
                None => {
                    debug!("Page {page} fetched, no next link");
                    Step::Done
                }
            };

            Ok(Some((response, (source, options, next, page))))
        },
    )
}

/// Turn a stream of pages into a stream of their elements
///
/// Each page is checked when it arrives, before any of its elements are
/// yielded. A page whose body is not an array fails with
/// [`Error::NotAList`] naming `endpoint`.
pub fn flatten_items<St>(
    pages: St,
    endpoint: String,
) -> impl Stream<Item = Result<JsonValue>>
where
    St: Stream<Item = Result<Response>>,
{
    pages
        .and_then(move |page| future::ready(page_items(page, &endpoint)))
        .try_flatten()
}

fn page_items(
    page: Response,
    endpoint: &str,
) -> Result<impl Stream<Item = Result<JsonValue>>> {
    match page.body {
        JsonValue::Array(items) => Ok(stream::iter(items.into_iter().map(Ok))),
        _ => Err(Error::not_a_list(endpoint)),
    }
}
