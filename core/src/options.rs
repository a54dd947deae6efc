//! Request-side values handed to the adapter by a REST client.
//!
//! # Design
//! `HttpRequestOptions` is plain data: a base URL, a method, an optional JSON
//! body and two ordered `NamedValues` collections for headers and query
//! parameters. Nothing is validated here; header names that are not valid
//! HTTP tokens surface later as transport failures when the outgoing request
//! is assembled, which keeps `request` itself infallible.

use http::Method;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

/// Characters left untouched by `encodeURI`; everything else is escaped.
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

/// Ordered `(name, value)` pairs. Duplicate names are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedValues {
    values: Vec<(String, String)>,
}

impl NamedValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair, keeping any earlier value with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.push((name.into(), value.into()));
        self
    }

    /// Replace every value stored under `name` with a single new one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.values.retain(|(existing, _)| *existing != name);
        self.values.push((name, value.into()));
        self
    }

    /// First value stored under `name` (exact match).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NamedValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for NamedValues {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Everything a REST client knows about one outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequestOptions {
    url: String,
    method: Method,
    body: Option<Value>,
    headers: NamedValues,
    query: NamedValues,
}

impl HttpRequestOptions {
    pub fn new(url: impl Into<String>, method: Method) -> Self {
        Self {
            url: url.into(),
            method,
            body: None,
            headers: NamedValues::new(),
            query: NamedValues::new(),
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_headers(mut self, headers: NamedValues) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_query(mut self, query: NamedValues) -> Self {
        self.query = query;
        self
    }

    /// Append one header; handy inside interceptors.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// The URL as given, without query parameters from `query()`.
    pub fn base_url(&self) -> &str {
        &self.url
    }

    pub fn set_base_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &NamedValues {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut NamedValues {
        &mut self.headers
    }

    pub fn query(&self) -> &NamedValues {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut NamedValues {
        &mut self.query
    }

    /// Final URL: the base URL followed by the encoded query parameters.
    ///
    /// Names and values are escaped with the `encodeURI` character set, so
    /// `+` and `=` inside a value pass through while spaces become `%20`.
    pub fn url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(name, URI_ENCODE_SET),
                    utf8_percent_encode(value, URI_ENCODE_SET)
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        let separator = if !self.url.contains('?') {
            "?"
        } else if self.url.ends_with(['?', '&']) {
            ""
        } else {
            "&"
        };
        format!("{}{separator}{query}", self.url)
    }

    /// Body as sent on the wire. JSON strings go out verbatim, every other
    /// value is serialized as JSON text.
    pub fn serialized_body(&self) -> Option<String> {
        match self.body.as_ref()? {
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}
