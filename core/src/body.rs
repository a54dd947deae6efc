//! Decoded response bodies.
//!
//! # Design
//! The content type alone picks the decoder: anything mentioning
//! `application/json` is parsed, everything else (including a missing header)
//! is read as text. Two cases skip reading altogether: a `204 No Content`
//! status, and a JSON response that announces `Content-Length: 0`.

use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http::{BoxError, FetchResponse};

/// A response body after decoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    /// No body was read.
    #[default]
    Null,
    Json(Value),
    Text(String),
}

impl Body {
    pub fn is_null(&self) -> bool {
        matches!(self, Body::Null)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Deserialize into `T`. Text bodies deserialize as a JSON string and
    /// `Null` as JSON `null`, so `Option<T>` targets accept empty responses.
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.into())
    }
}

impl From<Body> for Value {
    fn from(body: Body) -> Self {
        match body {
            Body::Null => Value::Null,
            Body::Json(value) => value,
            Body::Text(text) => Value::String(text),
        }
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| content_type.contains("application/json"))
}

fn declares_empty(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|length| length.trim().parse::<u64>().ok())
        == Some(0)
}

/// Read and decode a response body.
pub(crate) async fn decode_body<R: FetchResponse>(response: R) -> Result<Body, BoxError> {
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(Body::Null);
    }

    let json = is_json(response.headers());
    let empty = declares_empty(response.headers());
    match (json, empty) {
        (false, _) => Ok(Body::Text(response.text().await?)),
        (true, true) => Ok(Body::Null),
        (true, false) => Ok(Body::Json(response.json().await?)),
    }
}
