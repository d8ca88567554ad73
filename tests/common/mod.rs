//! Shared utilities for integration testing.

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use axum::Router;
use tower::ServiceExt;

use resource_filter::config::AppConfig;

/// Path to a file under `tests/fixtures`.
#[allow(dead_code)]
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Config mounted at `/app/` with metrics off and an ephemeral bind address.
#[allow(dead_code)]
pub fn app_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.filter.filter_path = Some("app/".into());
    config
}

/// Seconds since the epoch as a `SystemTime`.
#[allow(dead_code)]
pub fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

/// Send one GET through `router`.
#[allow(dead_code)]
pub async fn get(router: &Router, uri: &str, headers: &[(&str, &str)]) -> Response<Body> {
    let mut builder = Request::get(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Collect a response body.
#[allow(dead_code)]
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), 16 * 1024 * 1024).await.unwrap().to_vec()
}
