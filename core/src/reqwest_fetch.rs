//! `Fetch` backend over `reqwest`.

use http::{HeaderMap, StatusCode};

use crate::http::{BoxError, Fetch, FetchRequest, FetchResponse, Redirect};

/// Async backend. Keeps one client that follows redirects and one that
/// returns 3xx responses as they are.
///
/// There is no `Default`: building a client loads the TLS backend, which can
/// fail, so construction goes through `new()`.
#[derive(Debug, Clone)]
pub struct ReqwestFetch {
    follow: reqwest::Client,
    manual: reqwest::Client,
}

impl ReqwestFetch {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            follow: reqwest::Client::builder().build()?,
            manual: reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()?,
        })
    }
}

impl Fetch for ReqwestFetch {
    type Response = reqwest::Response;

    async fn fetch(&self, request: FetchRequest) -> Result<reqwest::Response, BoxError> {
        let client = match request.redirect {
            Redirect::Follow => &self.follow,
            Redirect::Error | Redirect::Manual => &self.manual,
        };

        let mut builder = client.request(request.method, &request.url).headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        Ok(builder.send().await?)
    }
}

impl FetchResponse for reqwest::Response {
    fn status(&self) -> StatusCode {
        reqwest::Response::status(self)
    }

    /// hyper only records the reason phrase when it differs from the
    /// canonical one for the status.
    fn status_text(&self) -> &str {
        self.extensions()
            .get::<hyper::ext::ReasonPhrase>()
            .and_then(|phrase| std::str::from_utf8(phrase.as_bytes()).ok())
            .or_else(|| reqwest::Response::status(self).canonical_reason())
            .unwrap_or("")
    }

    fn url(&self) -> &str {
        reqwest::Response::url(self).as_str()
    }

    fn headers(&self) -> &HeaderMap {
        reqwest::Response::headers(self)
    }

    async fn text(self) -> Result<String, BoxError> {
        Ok(reqwest::Response::text(self).await?)
    }

    async fn json(self) -> Result<serde_json::Value, BoxError> {
        let bytes = reqwest::Response::bytes(self).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
