//! End-to-end requests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `FetchHttpService`
//! over real HTTP with each network backend. Checks that body decoding,
//! error mapping and redirect handling hold up against an actual server.

use std::net::SocketAddr;

use fetch_rest::{
    Body, ErrorKind, Fetch, FetchHttpService, HttpRequestOptions, NamedValues, Redirect, RequestInit,
    TransportFault,
};
use http::Method;
use mock_server::Echo;
use serde_json::json;

/// Bind the mock server to a random local port and serve it in the background.
async fn start_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    addr
}

/// Answer one connection with a hand-written status line, then close it.
async fn serve_raw(status_line: &'static str, content_type: &'static str, body: Vec<u8>) -> SocketAddr {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&chunk[..n]);
        }
        let head = format!(
            "{status_line}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
            body.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(&body).await.unwrap();
        socket.shutdown().await.unwrap();
    });
    addr
}

/// An address nothing is listening on.
fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

async fn exercise<F: Fetch>(make: impl Fn() -> F) {
    let addr = start_server().await;
    let base = format!("http://{addr}");
    let service = FetchHttpService::new(make());

    // Step 1: JSON body.
    let data = service
        .request(HttpRequestOptions::new(format!("{base}/json"), Method::GET))
        .await
        .unwrap();
    assert_eq!(data, Body::Json(json!({ "data": "12345" })));

    // Step 2: text body.
    let data = service
        .request(HttpRequestOptions::new(format!("{base}/text"), Method::GET))
        .await
        .unwrap();
    assert_eq!(data, Body::Text("You are doomed".to_string()));

    // Step 3: JSON content type with zero length.
    let data = service
        .request(HttpRequestOptions::new(format!("{base}/empty-json"), Method::GET))
        .await
        .unwrap();
    assert_eq!(data, Body::Null);

    // Step 4: 204.
    let data = service
        .request(HttpRequestOptions::new(format!("{base}/no-content"), Method::GET))
        .await
        .unwrap();
    assert_eq!(data, Body::Null);

    // Step 5: HTTP error.
    let err = service
        .request(HttpRequestOptions::new(format!("{base}/fail"), Method::GET))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Http);
    assert_eq!(err.status(), 400);
    assert_eq!(err.status_text(), Some("Bad Request"));
    assert_eq!(err.url(), format!("{base}/fail"));
    assert_eq!(err.body(), Some(&Body::Json(json!({ "message": "You are doomed" }))));
    let headers = err.headers().unwrap();
    assert_eq!(headers["custom"], "Test");
    assert_eq!(headers["content-type"], "application/json");

    // Step 6: query, headers and body reach the server.
    let options = HttpRequestOptions::new(format!("{base}/echo?myValue=1"), Method::POST)
        .with_query(NamedValues::from([("Test", "12345"), ("My-Addition", "1 + 6 = 7")]))
        .with_headers(NamedValues::from([("X-Test", "12345"), ("Content-Type", "application/json")]))
        .with_body(json!({ "title": "Buy milk" }));
    let echo: Echo = service.request(options).await.unwrap().deserialize().unwrap();
    assert_eq!(echo.method, "POST");
    assert_eq!(
        echo.query.as_deref(),
        Some("myValue=1&Test=12345&My-Addition=1%20+%206%20=%207")
    );
    assert_eq!(echo.headers["x-test"], "12345");
    let sent: serde_json::Value = serde_json::from_str(&echo.body).unwrap();
    assert_eq!(sent, json!({ "title": "Buy milk" }));

    // Step 7: redirects are followed by default.
    let data = service
        .request(HttpRequestOptions::new(format!("{base}/redirect"), Method::GET))
        .await
        .unwrap();
    assert_eq!(data, Body::Json(json!({ "data": "12345" })));

    // Step 8: refusing redirects turns one into a transport error.
    let init = RequestInit {
        redirect: Redirect::Error,
        ..RequestInit::default()
    };
    let service = FetchHttpService::with_init(make(), init);
    let err = service
        .request(HttpRequestOptions::new(format!("{base}/redirect"), Method::GET))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.status(), 0);
    assert_eq!(err.url(), format!("{base}/redirect"));

    // Step 9: nothing listening.
    let url = format!("http://{}/json", closed_addr());
    let err = service
        .request(HttpRequestOptions::new(url.clone(), Method::GET))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.status(), 0);
    assert_eq!(err.url(), url);
    assert!(err.fault().and_then(TransportFault::as_error_event).is_some());
}

#[cfg(feature = "reqwest")]
#[tokio::test]
async fn reqwest_backend_round_trips() {
    exercise(|| fetch_rest::ReqwestFetch::new().unwrap()).await;
}

#[cfg(feature = "reqwest")]
#[tokio::test]
async fn reqwest_wraps_connection_errors() {
    let service = FetchHttpService::new(fetch_rest::ReqwestFetch::new().unwrap());
    let url = format!("http://{}/json", closed_addr());

    let err = service
        .request(HttpRequestOptions::new(url, Method::GET))
        .await
        .unwrap_err();
    let event = err.fault().and_then(TransportFault::as_error_event).unwrap();
    let source = event.error().downcast_ref::<reqwest::Error>().unwrap();
    assert!(source.is_connect());
}

#[cfg(feature = "reqwest")]
#[tokio::test]
async fn reqwest_reports_custom_reason_phrase() {
    let addr = serve_raw(
        "HTTP/1.1 400 Shit happens",
        "application/json",
        br#"{"message":"You are doomed"}"#.to_vec(),
    )
    .await;
    let service = FetchHttpService::new(fetch_rest::ReqwestFetch::new().unwrap());

    let err = service
        .request(HttpRequestOptions::new(format!("http://{addr}/get"), Method::GET))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Http);
    assert_eq!(err.status(), 400);
    assert_eq!(err.status_text(), Some("Shit happens"));
    assert_eq!(err.body(), Some(&Body::Json(json!({ "message": "You are doomed" }))));
}

#[cfg(feature = "ureq")]
#[tokio::test(flavor = "multi_thread")]
async fn ureq_backend_round_trips() {
    exercise(fetch_rest::UreqFetch::new).await;
}

#[cfg(feature = "ureq")]
#[tokio::test(flavor = "multi_thread")]
async fn ureq_reads_bodies_over_ten_mebibytes() {
    let size = 11 * 1024 * 1024;
    let addr = serve_raw("HTTP/1.1 200 OK", "text/plain", vec![b'a'; size]).await;
    let service = FetchHttpService::new(fetch_rest::UreqFetch::new());

    let body = service
        .request(HttpRequestOptions::new(format!("http://{addr}/large"), Method::GET))
        .await
        .unwrap();
    assert_eq!(body.as_text().map(str::len), Some(size));
}
