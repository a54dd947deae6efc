use std::collections::BTreeMap;

use axum::{
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Redirect},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/json", get(json_data))
        .route("/text", get(text))
        .route("/empty-json", get(empty_json))
        .route("/no-content", get(no_content))
        .route("/fail", get(fail))
        .route("/redirect", get(redirect))
        .route("/echo", any(echo))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn json_data() -> Json<serde_json::Value> {
    Json(json!({ "data": "12345" }))
}

async fn text() -> &'static str {
    "You are doomed"
}

async fn empty_json() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONTENT_LENGTH, "0"),
        ],
        "",
    )
}

async fn no_content() -> impl IntoResponse {
    (StatusCode::NO_CONTENT, [(header::CONTENT_TYPE, "application/json")])
}

async fn fail() -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        [("custom", "Test")],
        Json(json!({ "message": "You are doomed" })),
    )
}

async fn redirect() -> Redirect {
    Redirect::to("/json")
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    })
}
