use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Echo};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn header<'a>(response: &'a axum::response::Response, name: &str) -> &'a str {
    response.headers()[name].to_str().unwrap()
}

#[tokio::test]
async fn json_returns_data() {
    let resp = app().oneshot(get("/json")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "content-type"), "application/json");
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body, serde_json::json!({ "data": "12345" }));
}

#[tokio::test]
async fn text_returns_plain_text() {
    let resp = app().oneshot(get("/text")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(header(&resp, "content-type").starts_with("text/plain"));
    assert_eq!(body_bytes(resp).await, "You are doomed");
}

#[tokio::test]
async fn empty_json_announces_zero_length() {
    let resp = app().oneshot(get("/empty-json")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "content-type"), "application/json");
    assert_eq!(header(&resp, "content-length"), "0");
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn no_content_returns_204() {
    let resp = app().oneshot(get("/no-content")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn fail_returns_400_with_custom_header() {
    let resp = app().oneshot(get("/fail")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&resp, "custom"), "Test");
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["message"], "You are doomed");
}

#[tokio::test]
async fn redirect_points_at_json() {
    let resp = app().oneshot(get("/redirect")).await.unwrap();

    assert!(resp.status().is_redirection());
    assert_eq!(header(&resp, "location"), "/json");
}

#[tokio::test]
async fn echo_reflects_request() {
    let request = Request::builder()
        .method("PUT")
        .uri("/echo?a=1&b=two%20words")
        .header(http::header::CONTENT_TYPE, "application/json")
        .header("x-test", "12345")
        .body(r#"{"title":"Buy milk"}"#.to_string())
        .unwrap();
    let resp = app().oneshot(request).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "PUT");
    assert_eq!(echo.query.as_deref(), Some("a=1&b=two%20words"));
    assert_eq!(echo.headers["x-test"], "12345");
    assert_eq!(echo.headers["content-type"], "application/json");
    assert_eq!(echo.body, r#"{"title":"Buy milk"}"#);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let resp = app().oneshot(get("/missing")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
