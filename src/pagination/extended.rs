//! Streams with eager terminal operations

use futures::stream::{Stream, TryStreamExt};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

pin_project! {
    /// A lazy, single-pass stream with `to_array`
    ///
    /// Wraps any stream without altering it: items are pulled from the inner
    /// stream only when the caller asks for them, and [`to_array`] collects
    /// whatever has not been pulled yet.
    ///
    /// [`to_array`]: ExtendedStream::to_array
    #[must_use = "streams do nothing unless polled"]
    pub struct ExtendedStream<S> {
        #[pin]
        inner: S,
        yielded: usize,
    }
}

impl<S> ExtendedStream<S> {
    /// Wrap a stream
    pub fn new(inner: S) -> Self {
        Self { inner, yielded: 0 }
    }

    /// Number of items produced so far
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    /// Unwrap the inner stream
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, T, E> ExtendedStream<S>
where
    S: Stream<Item = Result<T, E>>,
{
    /// Drain the remaining items into a `Vec`
    ///
    /// Items already pulled are not included. The first error aborts the
    /// drain and is returned.
    pub async fn to_array(self) -> Result<Vec<T>, E> {
        self.try_collect().await
    }

    /// Collect up to `count` more items
    pub async fn take_array(&mut self, count: usize) -> Result<Vec<T>, E>
    where
        S: Unpin,
    {
        let mut result = Vec::new();
        while result.len() < count {
            match self.try_next().await? {
                Some(item) => result.push(item),
                None => break,
            }
        }
        Ok(result)
    }
}

impl<S: Stream> Stream for ExtendedStream<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let item = ready!(this.inner.poll_next(cx));
        if item.is_some() {
            *this.yielded += 1;
        }
        Poll::Ready(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for ExtendedStream<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedStream")
            .field("inner", &self.inner)
            .field("yielded", &self.yielded)
            .finish()
    }
}
