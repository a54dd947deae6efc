//! `Fetch` backend over the blocking `ureq` agent.
//!
//! Each call runs on tokio's blocking pool. Status codes are never turned
//! into errors by the agent so the adapter sees every response, and the body
//! is read on the blocking thread before the response is handed back, with
//! no size limit.

use http::{HeaderMap, StatusCode};
use ureq::ResponseExt;

use crate::http::{BoxError, Fetch, FetchRequest, FetchResponse, Redirect};

#[derive(Debug, Clone)]
pub struct UreqFetch {
    follow: ureq::Agent,
    manual: ureq::Agent,
}

impl UreqFetch {
    pub fn new() -> Self {
        let follow = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        let manual = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .build()
            .new_agent();
        Self { follow, manual }
    }
}

impl Default for UreqFetch {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully read `ureq` response.
#[derive(Debug)]
pub struct UreqResponse {
    status: StatusCode,
    url: String,
    headers: HeaderMap,
    body: String,
}

fn execute(agent: &ureq::Agent, request: FetchRequest) -> Result<UreqResponse, BoxError> {
    let mut builder = http::Request::builder()
        .method(request.method)
        .uri(request.url.as_str());
    if let Some(headers) = builder.headers_mut() {
        headers.extend(request.headers);
    }

    let mut response = match request.body {
        Some(body) => agent.run(builder.body(body)?)?,
        None => agent.run(builder.body(())?)?,
    };
    let url = response.get_uri().to_string();
    let body = response.body_mut().with_config().limit(u64::MAX).read_to_string()?;

    Ok(UreqResponse {
        status: response.status(),
        url,
        headers: response.headers().clone(),
        body,
    })
}

impl Fetch for UreqFetch {
    type Response = UreqResponse;

    async fn fetch(&self, request: FetchRequest) -> Result<UreqResponse, BoxError> {
        let agent = match request.redirect {
            Redirect::Follow => self.follow.clone(),
            Redirect::Error | Redirect::Manual => self.manual.clone(),
        };
        tokio::task::spawn_blocking(move || execute(&agent, request)).await?
    }
}

impl FetchResponse for UreqResponse {
    fn status(&self) -> StatusCode {
        self.status
    }

    fn status_text(&self) -> &str {
        self.status.canonical_reason().unwrap_or("")
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    async fn text(self) -> Result<String, BoxError> {
        Ok(self.body)
    }
}
