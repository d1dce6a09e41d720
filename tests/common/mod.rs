#![allow(dead_code)]

use std::path::Path;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use hr_portal::config::Config;
use serde_json::Value as JsonValue;
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const BOUNDARY: &str = "portal-test-boundary";

pub fn config(api_base_url: &str, storage_dir: &Path) -> Config {
    Config {
        server_address: "127.0.0.1:0".to_string(),
        api_base_url: api_base_url.to_string(),
        storage_dir: storage_dir.to_path_buf(),
        request_timeout_secs: 5,
        cv_parse_delay_ms: 0,
        public_rps: 1000,
        upload_per_minute: 1000,
        wizard_idle_secs: 1800,
        dashboard_page_size: 10,
    }
}

/// Serves `router` on an ephemeral port and returns its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind upstream");
    let addr = listener.local_addr().expect("upstream addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("upstream server");
    });
    format!("http://{}", addr)
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<JsonValue>) -> (StatusCode, JsonValue) {
    send_as(app, method, uri, None, body).await
}

/// Like `send`, carrying `token` as the caller's bearer token.
pub async fn send_as(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");
    respond(app, request).await
}

pub async fn upload(app: &Router, uri: &str, file_name: &str, content_type: &str, data: &[u8]) -> (StatusCode, JsonValue) {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request");
    respond(app, request).await
}

async fn respond(app: &Router, request: Request<Body>) -> (StatusCode, JsonValue) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}
