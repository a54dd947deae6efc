//! Error types delivered through the adapter's error path.
//!
//! # Design
//! `HttpErrorResponse` has one variant per failure kind. `Http` means the
//! server answered with a non-2xx status and carries everything the response
//! said; `Transport` means no usable response exists and carries the fault
//! plus the URL that was requested. Transport faults always arrive in an
//! event shape: a backend may raise a `NetworkEvent` directly, anything else
//! is wrapped in an `ErrorEvent` that keeps the original error as its source.

use std::collections::BTreeMap;

use http::StatusCode;
use thiserror::Error;

use crate::body::Body;
use crate::http::BoxError;

/// Progress-style network event, e.g. an `error` or `abort` raised mid-transfer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{event_type} event after {loaded} of {total} bytes")]
pub struct NetworkEvent {
    pub event_type: String,
    pub loaded: u64,
    pub total: u64,
    pub length_computable: bool,
}

impl NetworkEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            loaded: 0,
            total: 0,
            length_computable: false,
        }
    }
}

/// Generic `error` event wrapping a fault that was not event-shaped.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ErrorEvent {
    message: String,
    #[source]
    error: BoxError,
}

impl ErrorEvent {
    pub fn new(error: impl Into<BoxError>) -> Self {
        let error = error.into();
        Self {
            message: error.to_string(),
            error,
        }
    }

    pub fn event_type(&self) -> &str {
        "error"
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The wrapped fault.
    pub fn error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.error
    }

    pub fn into_inner(self) -> BoxError {
        self.error
    }
}

/// The fault carried by a transport failure.
#[derive(Debug, Error)]
pub enum TransportFault {
    #[error(transparent)]
    Event(NetworkEvent),

    #[error(transparent)]
    Error(ErrorEvent),
}

impl TransportFault {
    /// Pass event-shaped faults through, wrap everything else.
    pub fn classify(fault: BoxError) -> Self {
        let fault = match fault.downcast::<NetworkEvent>() {
            Ok(event) => return TransportFault::Event(*event),
            Err(other) => other,
        };
        match fault.downcast::<ErrorEvent>() {
            Ok(event) => TransportFault::Error(*event),
            Err(other) => TransportFault::Error(ErrorEvent::new(other)),
        }
    }

    pub fn as_network_event(&self) -> Option<&NetworkEvent> {
        match self {
            TransportFault::Event(event) => Some(event),
            TransportFault::Error(_) => None,
        }
    }

    pub fn as_error_event(&self) -> Option<&ErrorEvent> {
        match self {
            TransportFault::Error(event) => Some(event),
            TransportFault::Event(_) => None,
        }
    }
}

/// A redirect was received while the request asked for `Redirect::Error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("redirect response from {url} refused")]
pub struct RedirectRefused {
    pub url: String,
}

/// Which of the two failure paths produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Http,
    Transport,
}

/// The single error a failed request delivers.
#[derive(Debug, Error)]
pub enum HttpErrorResponse {
    /// The server responded with a non-2xx status.
    #[error("Http failure response for {url}: {} {status_text}", .status.as_u16())]
    Http {
        error: Body,
        headers: BTreeMap<String, String>,
        status: StatusCode,
        status_text: String,
        url: String,
    },

    /// No usable response was obtained.
    #[error("Http failure during request to {url}: {error}")]
    Transport {
        #[source]
        error: TransportFault,
        url: String,
    },
}

impl HttpErrorResponse {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HttpErrorResponse::Http { .. } => ErrorKind::Http,
            HttpErrorResponse::Transport { .. } => ErrorKind::Transport,
        }
    }

    /// Response status, `0` when the request never got one.
    pub fn status(&self) -> u16 {
        match self {
            HttpErrorResponse::Http { status, .. } => status.as_u16(),
            HttpErrorResponse::Transport { .. } => 0,
        }
    }

    pub fn status_text(&self) -> Option<&str> {
        match self {
            HttpErrorResponse::Http { status_text, .. } => Some(status_text),
            HttpErrorResponse::Transport { .. } => None,
        }
    }

    pub fn headers(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            HttpErrorResponse::Http { headers, .. } => Some(headers),
            HttpErrorResponse::Transport { .. } => None,
        }
    }

    /// Final response URL for HTTP failures, requested URL otherwise.
    pub fn url(&self) -> &str {
        match self {
            HttpErrorResponse::Http { url, .. } | HttpErrorResponse::Transport { url, .. } => url,
        }
    }

    /// Decoded body of an HTTP failure.
    pub fn body(&self) -> Option<&Body> {
        match self {
            HttpErrorResponse::Http { error, .. } => Some(error),
            HttpErrorResponse::Transport { .. } => None,
        }
    }

    pub fn fault(&self) -> Option<&TransportFault> {
        match self {
            HttpErrorResponse::Transport { error, .. } => Some(error),
            HttpErrorResponse::Http { .. } => None,
        }
    }
}
