//! The fetch primitive the adapter drives.
//!
//! # Design
//! A backend implements `Fetch` and hands back something implementing
//! `FetchResponse`: status line, final URL and headers are available right
//! away while the body is read lazily through `text()`/`json()`. Any failure
//! before a response exists is returned as a boxed error so the adapter can
//! downcast event-shaped faults and wrap everything else.
//!
//! `FetchRequest` is the merged view of one call: method, body and headers
//! always come from the request options, the remaining fields from the
//! adapter's base `RequestInit`.

use std::collections::BTreeMap;
use std::future::Future;

use http::header::REFERER;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::options::HttpRequestOptions;

/// Fault raised by a backend or while assembling a request.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// How a backend treats 3xx responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Redirect {
    /// Follow redirects and report the final URL.
    #[default]
    Follow,
    /// Treat any redirect as a transport failure.
    Error,
    /// Hand the 3xx response back untouched.
    Manual,
}

/// Base configuration shared by every call of one adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestInit {
    pub redirect: Redirect,
    /// Sent as `Referer` unless the request options already carry one.
    pub referrer: Option<String>,
}

/// One outgoing call after options and base configuration are merged.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
    pub redirect: Redirect,
}

impl FetchRequest {
    /// Fails when a header name or value from the options is not valid HTTP.
    pub fn from_options(options: &HttpRequestOptions, init: &RequestInit) -> Result<Self, BoxError> {
        let mut headers = HeaderMap::new();
        for (name, value) in options.headers().iter() {
            headers.append(HeaderName::from_bytes(name.as_bytes())?, HeaderValue::from_str(value)?);
        }
        if let Some(referrer) = &init.referrer {
            if !headers.contains_key(REFERER) {
                headers.insert(REFERER, HeaderValue::from_str(referrer)?);
            }
        }

        Ok(Self {
            url: options.url(),
            method: options.method().clone(),
            headers,
            body: options.serialized_body(),
            redirect: init.redirect,
        })
    }
}

/// A response as returned by the fetch primitive, body still unread.
pub trait FetchResponse: Send + Sized + 'static {
    fn status(&self) -> StatusCode;

    fn status_text(&self) -> &str;

    /// URL the response was served from, after any redirects.
    fn url(&self) -> &str;

    fn headers(&self) -> &HeaderMap;

    /// Consume the response and read the body as text.
    fn text(self) -> impl Future<Output = Result<String, BoxError>> + Send;

    /// `true` for any 2xx status.
    fn ok(&self) -> bool {
        self.status().is_success()
    }

    /// Consume the response and parse the body as JSON.
    fn json(self) -> impl Future<Output = Result<serde_json::Value, BoxError>> + Send {
        async move {
            let text = self.text().await?;
            let value: serde_json::Value = serde_json::from_str(&text)?;
            Ok::<_, BoxError>(value)
        }
    }
}

/// Performs a single network round-trip.
pub trait Fetch: Send + Sync + 'static {
    type Response: FetchResponse;

    fn fetch(&self, request: FetchRequest) -> impl Future<Output = Result<Self::Response, BoxError>> + Send;
}

/// Snapshot headers into a map keyed by lowercase name. Repeated headers are
/// joined with `", "` the way a fetch `Headers` object iterates them.
pub fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .keys()
        .map(|name| {
            let joined = headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            (name.as_str().to_owned(), joined)
        })
        .collect()
}
