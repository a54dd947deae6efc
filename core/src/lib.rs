//! Fetch-style HTTP adapter for REST clients.
//!
//! # Overview
//! `FetchHttpService` takes `HttpRequestOptions` from a REST client, performs
//! one round-trip through a `Fetch` backend and delivers the outcome as a
//! `Single`: either the decoded `Body`, or exactly one `HttpErrorResponse`.
//!
//! # Design
//! - The network call sits behind the `Fetch` / `FetchResponse` traits.
//!   `ReqwestFetch` (feature `reqwest`, default) and `UreqFetch` (feature
//!   `ureq`) talk to real servers; `MockFetch` scripts responses in memory.
//! - Bodies are decoded from `Content-Type`: JSON when it mentions
//!   `application/json`, text otherwise. `204` and zero-length JSON decode to
//!   `Body::Null` without reading.
//! - HTTP failures and transport failures share one error type but stay
//!   distinguishable through `HttpErrorResponse::kind`; a transport failure
//!   always reports status `0`.
//! - An optional interceptor rewrites options synchronously before each call.

pub mod body;
pub mod client;
pub mod error;
pub mod http;
pub mod mock;
pub mod options;
#[cfg(feature = "reqwest")]
pub mod reqwest_fetch;
pub mod stream;
#[cfg(feature = "ureq")]
pub mod ureq_fetch;

pub use body::Body;
pub use client::{FetchHttpService, Interceptor};
pub use error::{ErrorEvent, ErrorKind, HttpErrorResponse, NetworkEvent, RedirectRefused, TransportFault};
pub use crate::http::{BoxError, Fetch, FetchRequest, FetchResponse, Redirect, RequestInit};
pub use mock::{MockFetch, MockResponse};
pub use options::{HttpRequestOptions, NamedValues};
#[cfg(feature = "reqwest")]
pub use reqwest_fetch::ReqwestFetch;
pub use stream::{Observer, Single};
#[cfg(feature = "ureq")]
pub use ureq_fetch::{UreqFetch, UreqResponse};
