//! The fetch adapter.
//!
//! # Design
//! `FetchHttpService` owns a `Fetch` backend, a base `RequestInit` and an
//! optional interceptor. `request` applies the interceptor eagerly, then
//! returns a lazy `Single` that performs one round-trip when polled. Every
//! failure, including ones raised while assembling the request, is delivered
//! through that `Single`; `request` itself cannot fail.
//!
//! Outcome mapping:
//! - 2xx: decoded body.
//! - any other status: `HttpErrorResponse::Http` with the decoded body and a
//!   flattened header snapshot.
//! - fault before or while reading the response: `HttpErrorResponse::Transport`
//!   carrying the requested URL.

use std::fmt;
use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::body::{decode_body, Body};
use crate::error::{HttpErrorResponse, RedirectRefused, TransportFault};
use crate::http::{flatten_headers, BoxError, Fetch, FetchRequest, FetchResponse, Redirect, RequestInit};
use crate::options::HttpRequestOptions;
use crate::stream::Single;

/// Rewrites request options before they are sent.
pub type Interceptor = Box<dyn Fn(HttpRequestOptions) -> HttpRequestOptions + Send + Sync>;

/// Issues REST requests through a fetch-style backend.
pub struct FetchHttpService<F> {
    fetch: Arc<F>,
    init: RequestInit,
    interceptor: Option<Interceptor>,
}

impl<F: Fetch> FetchHttpService<F> {
    pub fn new(fetch: F) -> Self {
        Self::with_init(fetch, RequestInit::default())
    }

    pub fn with_init(fetch: F, init: RequestInit) -> Self {
        Self {
            fetch: Arc::new(fetch),
            init,
            interceptor: None,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetch
    }

    pub fn request_init(&self) -> &RequestInit {
        &self.init
    }

    /// Replace the interceptor, or clear it with `None`. Requests already
    /// created keep whatever interceptor was active when they were created.
    pub fn set_request_interceptor(&mut self, interceptor: Option<Interceptor>) {
        self.interceptor = interceptor;
    }

    pub fn with_request_interceptor<I>(mut self, interceptor: I) -> Self
    where
        I: Fn(HttpRequestOptions) -> HttpRequestOptions + Send + Sync + 'static,
    {
        self.interceptor = Some(Box::new(interceptor));
        self
    }

    /// Issue one request. Yields the decoded body or exactly one error.
    pub fn request(&self, options: HttpRequestOptions) -> Single<Body, HttpErrorResponse> {
        let options = match &self.interceptor {
            Some(intercept) => intercept(options),
            None => options,
        };

        let fetch = Arc::clone(&self.fetch);
        let init = self.init.clone();
        let span = tracing::debug_span!(
            "fetch",
            request_id = %Uuid::new_v4(),
            method = %options.method(),
            url = %options.base_url(),
        );

        Single::new(async move { execute(&*fetch, options, &init).await }.instrument(span))
    }
}

async fn execute<F: Fetch>(
    fetch: &F,
    options: HttpRequestOptions,
    init: &RequestInit,
) -> Result<Body, HttpErrorResponse> {
    let request_url = options.url();
    tracing::debug!("dispatching request");

    match exchange(fetch, &options, init).await {
        Ok(Ok(body)) => {
            tracing::debug!("request succeeded");
            Ok(body)
        }
        Ok(Err(err)) => {
            tracing::warn!(status = err.status(), "request failed with HTTP error");
            Err(err)
        }
        Err(fault) => {
            let error = TransportFault::classify(fault);
            tracing::warn!(%error, "request failed before a response was received");
            Err(HttpErrorResponse::Transport {
                error,
                url: request_url,
            })
        }
    }
}

/// Outer `Err` is a transport fault; inner `Err` an HTTP error response.
async fn exchange<F: Fetch>(
    fetch: &F,
    options: &HttpRequestOptions,
    init: &RequestInit,
) -> Result<Result<Body, HttpErrorResponse>, BoxError> {
    let request = FetchRequest::from_options(options, init)?;
    let redirect = request.redirect;
    let response = fetch.fetch(request).await?;

    if redirect == Redirect::Error && response.status().is_redirection() {
        return Err(RedirectRefused {
            url: response.url().to_owned(),
        }
        .into());
    }

    if !response.ok() {
        let status = response.status();
        let status_text = response.status_text().to_owned();
        let url = response.url().to_owned();
        let headers = flatten_headers(response.headers());
        let error = decode_body(response).await?;
        return Ok(Err(HttpErrorResponse::Http {
            error,
            headers,
            status,
            status_text,
            url,
        }));
    }

    Ok(Ok(decode_body(response).await?))
}

impl<F> fmt::Debug for FetchHttpService<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchHttpService")
            .field("init", &self.init)
            .field("interceptor", &self.interceptor.is_some())
            .finish_non_exhaustive()
    }
}
