#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use talk_ledger::transport::http::{create_router, AppState};
use talk_ledger::{ImportFormat, InfluenceStrategy, Storage};
use tower::util::ServiceExt; // for `oneshot`

pub const BOUNDARY: &str = "talk-ledger-test-boundary";

pub fn app() -> Router {
    app_with(InfluenceStrategy::Weighted)
}

pub fn app_with(strategy: InfluenceStrategy) -> Router {
    let storage = Storage::in_memory();
    create_router(AppState::new(&storage, strategy, ImportFormat::default()))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap()
}

pub fn json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// A `multipart/form-data` upload with one part named `field`.
pub fn upload(field: &str, csv: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"talks.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
        b = BOUNDARY,
        field = field,
        csv = csv
    );
    Request::builder()
        .method("POST")
        .uri("/api/import/talks")
        .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

/// Sends one request through a clone of the router.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub async fn import(app: &Router, csv: &str) -> Value {
    let (status, body) = send(app, upload("file", csv)).await;
    assert_eq!(status, StatusCode::OK, "import failed: {body}");
    body["data"].clone()
}
