//! End-to-end requests through the router: resources, conditional requests,
//! the mount redirect and autocomplete callbacks.

use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant, SystemTime};

use axum::body::to_bytes;
use axum::http::{header, StatusCode};

use resource_filter::config::{AutoCompleteConfig, FileResourceConfig};
use resource_filter::http::X_REQUEST_ID;
use resource_filter::resource::{
    Attributes, ByteArrayResource, CacheDuration, DynamicImageResource, Resource, ResourceError,
    ResourceResponse,
};
use resource_filter::HttpServer;

mod common;

#[tokio::test]
async fn test_byte_array_resource_served() {
    let server = HttpServer::new(common::app_config());
    server.resources().add(
        "app",
        "hello.txt",
        ByteArrayResource::new("text/plain", b"hello".to_vec()).with_last_modified(common::at(1_000_000_000)),
    );

    let response = common::get(&server.router(), "/app/wicket/resource/app/hello.txt", &[]).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(X_REQUEST_ID));
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "5");
    assert_eq!(response.headers()[header::CACHE_CONTROL], "private, max-age=3600");
    assert_eq!(response.headers()[header::LAST_MODIFIED], "Sun, 09 Sep 2001 01:46:40 GMT");
    assert_eq!(common::body_bytes(response).await, b"hello");
}

#[tokio::test]
async fn test_not_modified_carries_future_expires() {
    let server = HttpServer::new(common::app_config());
    server.resources().add(
        "app",
        "foo.gif",
        DynamicImageResource::new("gif", |_: &Attributes<'_>| -> Option<Vec<u8>> {
            panic!("image data must not be produced for a 304")
        })
        .with_cache_duration(CacheDuration::MAX),
    );

    let next_week = httpdate::fmt_http_date(SystemTime::now() + Duration::from_secs(7 * 24 * 3600));
    let response = common::get(
        &server.router(),
        "/app/wicket/resource/app/foo.gif",
        &[("if-modified-since", next_week.as_str())],
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    let expires = response
        .headers()
        .get(header::EXPIRES)
        .expect("Expires header must be set on not modified response")
        .to_str()
        .unwrap();
    let expires = httpdate::parse_http_date(expires).unwrap();
    assert!(expires > SystemTime::now(), "expected Expires in the future");
    assert!(common::body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_stale_if_modified_since_gets_full_body() {
    let server = HttpServer::new(common::app_config());
    server.resources().add(
        "app",
        "data.bin",
        ByteArrayResource::new("application/octet-stream", vec![1u8, 2, 3]).with_last_modified(common::at(2_000_000_000)),
    );

    let response = common::get(
        &server.router(),
        "/app/wicket/resource/app/data.bin",
        &[("if-modified-since", "Sun, 09 Sep 2001 01:46:40 GMT")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_bytes(response).await, vec![1u8, 2, 3]);
}

#[tokio::test]
async fn test_redirect_to_mount_home() {
    let server = HttpServer::new(common::app_config());

    let response = common::get(&server.router(), "/app?lang=en", &[]).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/app/?lang=en");

    let response = common::get(&server.router(), "/app/", &[]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unmapped_paths() {
    let server = HttpServer::new(common::app_config());
    let router = server.router();

    for uri in ["/elsewhere/wicket/resource/app/x", "/app/wicket/resource/app/missing", "/app/index.html"] {
        let response = common::get(&router, uri, &[]).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[tokio::test]
async fn test_autocomplete_script_and_callback() {
    let mut config = common::app_config();
    config.autocomplete.push(AutoCompleteConfig {
        id: "country".into(),
        choices: vec!["Norway".into(), "Nepal".into(), "Peru".into()],
        max_results: 10,
    });
    let server = HttpServer::new(config);
    let router = server.router();

    let script = common::get(&router, "/app/wicket/resource/autocomplete/wicket-autocomplete.js", &[]).await;
    assert_eq!(script.status(), StatusCode::OK);
    assert_eq!(script.headers()[header::CONTENT_TYPE], "text/javascript");
    assert_eq!(script.headers()[header::CACHE_CONTROL], "private, max-age=31536000");

    let callback = common::get(&router, "/app/wicket/autocomplete/country?q=ne", &[]).await;
    assert_eq!(callback.status(), StatusCode::OK);
    assert_eq!(callback.headers()[header::CONTENT_TYPE], "text/xml; charset=utf-8");
    assert_eq!(callback.headers()[header::CACHE_CONTROL], "no-cache, no-store");
    assert_eq!(
        common::body_bytes(callback).await,
        b"<ul><li textvalue=\"Nepal\">Nepal</li></ul>"
    );

    let unknown = common::get(&router, "/app/wicket/autocomplete/city?q=o", &[]).await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_file_resource_from_config() {
    let dir = std::env::temp_dir().join(format!("resource-filter-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("notes.txt");
    std::fs::write(&file, "plain notes").unwrap();

    let mut config = common::app_config();
    config.resources.files.push(FileResourceConfig {
        scope: "docs".into(),
        name: "notes".into(),
        path: file.to_string_lossy().into_owned(),
        content_type: None,
        text_encoding: Some("UTF-8".into()),
        disposition: Default::default(),
        cache_secs: Some(0),
        cache_scope: Default::default(),
    });
    let server = HttpServer::new(config);

    let response = common::get(&server.router(), "/app/wicket/resource/docs/notes", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain; charset=UTF-8");
    assert_eq!(response.headers()[header::CONTENT_DISPOSITION], "inline; filename=\"notes.txt\"");
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache, no-store");
    assert_eq!(common::body_bytes(response).await, b"plain notes");

    std::fs::remove_file(&file).unwrap();
    let response = common::get(&server.router(), "/app/wicket/resource/docs/notes", &[]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let _ = std::fs::remove_dir_all(&dir);
}

/// Describes a body but never installs a write callback.
struct Broken;

impl Resource for Broken {
    fn new_resource_response(&self, attributes: &Attributes<'_>) -> ResourceResponse {
        let mut response = attributes.new_resource_response();
        response.set_content_type("text/plain");
        response
    }
}

#[tokio::test]
async fn test_missing_write_callback_is_server_error() {
    let server = HttpServer::new(common::app_config());
    server.resources().add("app", "broken", Broken);

    let response = common::get(&server.router(), "/app/wicket/resource/app/broken", &[]).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

/// Writes a first chunk, then holds the rest back until released.
struct Gated {
    release: Arc<Mutex<mpsc::Receiver<()>>>,
}

impl Resource for Gated {
    fn new_resource_response(&self, attributes: &Attributes<'_>) -> ResourceResponse {
        let mut response = attributes.new_resource_response();
        response.set_content_type("text/plain");
        let release = self.release.clone();
        response.set_write_callback(move |attributes: &mut Attributes<'_>| {
            attributes.response().write(b"first chunk ")?;
            if let Ok(release) = release.lock() {
                let _ = release.recv_timeout(Duration::from_secs(5));
            }
            attributes.response().write(b"rest")?;
            Ok(())
        });
        response
    }
}

#[tokio::test]
async fn test_headers_arrive_before_body_is_written() {
    let server = HttpServer::new(common::app_config());
    let (release, gate) = mpsc::channel::<()>();
    server.resources().add(
        "app",
        "gated.txt",
        Gated {
            release: Arc::new(Mutex::new(gate)),
        },
    );

    let started = Instant::now();
    let response = tokio::time::timeout(
        Duration::from_secs(2),
        common::get(&server.router(), "/app/wicket/resource/app/gated.txt", &[]),
    )
    .await
    .expect("headers must not wait for the whole body");
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");

    release.send(()).unwrap();
    assert_eq!(common::body_bytes(response).await, b"first chunk rest");
}

/// Fails halfway through writing its body.
struct Truncated;

impl Resource for Truncated {
    fn new_resource_response(&self, attributes: &Attributes<'_>) -> ResourceResponse {
        let mut response = attributes.new_resource_response();
        response.set_content_type("text/plain");
        response.set_content_length(100);
        response.set_write_callback(|attributes: &mut Attributes<'_>| {
            attributes.response().write(b"partial")?;
            Err(ResourceError::Stream(std::io::Error::other("source vanished")))
        });
        response
    }
}

#[tokio::test]
async fn test_failure_after_commit_ends_body_with_error() {
    let server = HttpServer::new(common::app_config());
    server.resources().add("app", "truncated", Truncated);

    let response = common::get(&server.router(), "/app/wicket/resource/app/truncated", &[]).await;

    // status was already sent
    assert_eq!(response.status(), StatusCode::OK);
    assert!(to_bytes(response.into_body(), 1024).await.is_err());
}
