//! Shared fixtures for router-level tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use pi_gateway::config::Config;
use pi_gateway::routes::{router, AppState};
use serde_json::{json, Value};
use std::collections::HashMap;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_API_KEY: &str = "test-api-key";

/// Static directory with an index page and English/Turkish locales.
pub fn static_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Pi gateway</h1>").unwrap();

    let i18n = dir.path().join("i18n");
    std::fs::create_dir(&i18n).unwrap();
    std::fs::write(i18n.join("en.json"), json!({ "greeting": "Hello" }).to_string()).unwrap();
    std::fs::write(i18n.join("tr.json"), json!({ "greeting": "Merhaba" }).to_string()).unwrap();
    dir
}

pub fn config(upstream_url: &str, static_dir: &TempDir, extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("PI_API_BASE_URL".to_string(), upstream_url.to_string()),
        ("PI_API_KEY".to_string(), TEST_API_KEY.to_string()),
        ("PI_NETWORK".to_string(), "mainnet".to_string()),
        ("UPSTREAM_TIMEOUT_SECS".to_string(), "2".to_string()),
        (
            "STATIC_DIR".to_string(),
            static_dir.path().to_string_lossy().into_owned(),
        ),
        (
            "VALIDATION_KEY_FILE".to_string(),
            static_dir
                .path()
                .join("validation-key.txt")
                .to_string_lossy()
                .into_owned(),
        ),
    ]);
    for (key, value) in extra {
        vars.insert(key.to_string(), value.to_string());
    }
    Config::from_vars(|key| vars.get(key).cloned()).unwrap()
}

pub fn app(config: Config) -> axum::Router {
    router(AppState::from_config(config).unwrap())
}

pub async fn send(app: axum::Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = body_bytes(response).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub async fn body_text(response: Response<Body>) -> (StatusCode, String) {
    let status = response.status();
    let bytes = body_bytes(response).await;
    (status, String::from_utf8(bytes).unwrap())
}
