//! In-memory `Fetch` backend with scripted outcomes.
//!
//! Every call is recorded so tests can inspect exactly what would have gone
//! over the wire. Outcomes are consumed in FIFO order; once the queue is
//! empty each call gets an empty `200 OK`.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use http::{HeaderMap, HeaderValue, StatusCode};

use crate::http::{BoxError, Fetch, FetchRequest, FetchResponse};

#[derive(Debug)]
enum Scripted {
    Respond(MockResponse),
    Reject(BoxError),
}

#[derive(Debug, Default)]
pub struct MockFetch {
    queue: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<FetchRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockFetch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next unscripted call with `response`.
    pub fn respond_once(&self, response: MockResponse) -> &Self {
        lock(&self.queue).push_back(Scripted::Respond(response));
        self
    }

    /// Fail the next unscripted call with `fault`.
    pub fn reject_once(&self, fault: impl Into<BoxError>) -> &Self {
        lock(&self.queue).push_back(Scripted::Reject(fault.into()));
        self
    }

    /// Requests received so far, oldest first.
    pub fn calls(&self) -> Vec<FetchRequest> {
        lock(&self.calls).clone()
    }

    /// Forget recorded calls and pending outcomes.
    pub fn reset(&self) {
        lock(&self.calls).clear();
        lock(&self.queue).clear();
    }
}

impl Fetch for MockFetch {
    type Response = MockResponse;

    async fn fetch(&self, request: FetchRequest) -> Result<MockResponse, BoxError> {
        let url = request.url.clone();
        lock(&self.calls).push(request);
        let next = lock(&self.queue).pop_front();

        match next {
            Some(Scripted::Respond(response)) if response.url.is_some() => Ok(response),
            Some(Scripted::Respond(response)) => Ok(response.with_url(url)),
            Some(Scripted::Reject(fault)) => Err(fault),
            None => Ok(MockResponse::new("").with_url(url)),
        }
    }
}

/// A canned response. Defaults to `200 OK` with no headers.
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: StatusCode,
    status_text: Option<String>,
    url: Option<String>,
    headers: HeaderMap,
    body: String,
}

impl MockResponse {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            status_text: None,
            url: None,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Override the reason phrase; defaults to the canonical one.
    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = Some(text.into());
        self
    }

    /// Final URL to report; defaults to the requested URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// # Panics
    ///
    /// Panics if `name` or `value` is not valid HTTP.
    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.append(name, HeaderValue::from_static(value));
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Set `content-length` from the body.
    pub fn with_content_length(mut self) -> Self {
        self.headers
            .insert(http::header::CONTENT_LENGTH, HeaderValue::from(self.body.len()));
        self
    }
}

impl FetchResponse for MockResponse {
    fn status(&self) -> StatusCode {
        self.status
    }

    fn status_text(&self) -> &str {
        match &self.status_text {
            Some(text) => text,
            None => self.status.canonical_reason().unwrap_or(""),
        }
    }

    fn url(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    async fn text(self) -> Result<String, BoxError> {
        Ok(self.body)
    }
}
