//! Single-shot result delivery.
//!
//! # Design
//! `Single` wraps a boxed future that resolves exactly once. It can be awaited
//! directly, turned into a one-item `Stream`, or driven into an `Observer`
//! that receives either `next` followed by `complete`, or a lone `error`.
//! Like any future it does nothing until polled; dropping it before then
//! means the underlying call never runs.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::future::BoxFuture;
use futures_util::stream::{self, Stream};
use futures_util::FutureExt;

/// Receives the outcome of a `Single`.
pub trait Observer<T, E> {
    fn next(&mut self, value: T);

    fn error(&mut self, error: E);

    fn complete(&mut self) {}
}

/// A future producing exactly one `Result`.
pub struct Single<T, E> {
    inner: BoxFuture<'static, Result<T, E>>,
}

impl<T, E> Single<T, E> {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self { inner: future.boxed() }
    }

    /// Run to completion and notify `observer`.
    pub async fn subscribe<O: Observer<T, E>>(self, observer: &mut O) {
        match self.await {
            Ok(value) => {
                observer.next(value);
                observer.complete();
            }
            Err(error) => observer.error(error),
        }
    }

    /// A stream yielding the single outcome, then ending.
    pub fn into_stream(self) -> impl Stream<Item = Result<T, E>> {
        stream::once(self)
    }
}

impl<T, E> Future for Single<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl<T, E> fmt::Debug for Single<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Single").finish_non_exhaustive()
    }
}
