//! Request handling.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) for every inbound request
//! - Capture the request data the resource pipeline needs (method, path,
//!   query, headers) in a [`WebRequest`]
//! - Parse conditional request headers (`If-Modified-Since`)
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The request timestamp is captured once; every date header written for
//!   this request is derived from it
//! - Malformed date headers are treated as absent, never as errors

use std::borrow::Cow;
use std::time::SystemTime;

use axum::http::{header, request::Parts, HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a UUID v4 request ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Layers that assign an `x-request-id` to each request and echo it on the response.
pub fn request_id_layers() -> (SetRequestIdLayer<MakeRequestUuid>, PropagateRequestIdLayer) {
    let name = HeaderName::from_static(X_REQUEST_ID);
    (
        SetRequestIdLayer::new(name.clone(), MakeRequestUuid),
        PropagateRequestIdLayer::new(name),
    )
}

/// Inbound HTTP request as seen by resources and behaviors.
#[derive(Debug, Clone)]
pub struct WebRequest {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    timestamp: SystemTime,
}

impl WebRequest {
    /// Create a request for `path_and_query` (e.g. `/app/foo?x=1`).
    pub fn new(method: Method, path_and_query: &str) -> Self {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (path_and_query.to_string(), None),
        };
        Self {
            method,
            path,
            query,
            headers: HeaderMap::new(),
            timestamp: SystemTime::now(),
        }
    }

    /// Shorthand for a GET request.
    pub fn get(path_and_query: &str) -> Self {
        Self::new(Method::GET, path_and_query)
    }

    /// Build from the parts of an axum request.
    pub fn from_parts(parts: &Parts) -> Self {
        Self::from_uri(parts.method.clone(), &parts.uri, parts.headers.clone())
    }

    /// Build from a method, URI and header map.
    pub fn from_uri(method: Method, uri: &Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            headers,
            timestamp: SystemTime::now(),
        }
    }

    /// Add a header. Invalid values are dropped.
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
            }
            Err(_) => tracing::warn!(header = %name, "Dropping invalid request header value"),
        }
        self
    }

    /// Set `If-Modified-Since` to the given time.
    pub fn with_if_modified_since(self, time: SystemTime) -> Self {
        let value = httpdate::fmt_http_date(time);
        self.with_header(header::IF_MODIFIED_SINCE, &value)
    }

    /// Override the request timestamp.
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string without the leading `?`, empty when absent.
    pub fn query(&self) -> &str {
        self.query.as_deref().unwrap_or("")
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as a string, if present and visible ASCII.
    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Time at which this request was received.
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Parsed `If-Modified-Since` header; `None` when absent or malformed.
    pub fn if_modified_since(&self) -> Option<SystemTime> {
        let raw = self.header(header::IF_MODIFIED_SINCE)?;
        match httpdate::parse_http_date(raw) {
            Ok(time) => Some(time),
            Err(_) => {
                tracing::debug!(value = %raw, "Ignoring malformed If-Modified-Since header");
                None
            }
        }
    }

    /// First value of the named query parameter, percent-decoded.
    pub fn query_parameter(&self, name: &str) -> Option<Cow<'_, str>> {
        url::form_urlencoded::parse(self.query().as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}
