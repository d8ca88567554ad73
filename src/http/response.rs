//! Response handling.
//!
//! # Responsibilities
//! - Define the [`WebResponse`] sink resources write into
//! - Emit caching, validator and disposition headers byte-for-byte
//! - Stream a response to axum: head on commit, body chunk by chunk
//! - Buffer a response for callers that answer in one piece
//!
//! # Design Decisions
//! - Headers are committed by the first body write or an explicit flush;
//!   header changes after that are ignored with a warning, like a servlet
//!   container would
//! - Date headers take an explicit `now` so a response is a pure function
//!   of the request
//! - Cache lifetimes are capped at one year (RFC 2616 recommendation)

use std::io;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;

/// Longest cache lifetime ever sent to a client.
pub const MAX_CACHE_DURATION: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Which caches may store a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheScope {
    /// Only the end user's browser may cache.
    #[default]
    Private,
    /// Shared proxies may cache as well.
    Public,
}

impl CacheScope {
    /// `Cache-Control` directive for this scope.
    pub fn cache_control(&self) -> &'static str {
        match self {
            CacheScope::Private => "private",
            CacheScope::Public => "public",
        }
    }
}

/// Outbound HTTP response sink.
///
/// Implementations provide the raw operations; the header helpers are shared.
pub trait WebResponse: Send {
    fn set_status(&mut self, status: StatusCode);

    /// Send an error status with an optional plain-text message as the body.
    fn send_error(&mut self, status: StatusCode, message: Option<&str>);

    fn set_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Write body bytes. Commits the headers.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Commit the headers and push buffered data downstream.
    fn flush(&mut self) -> io::Result<()>;

    fn set_date_header(&mut self, name: HeaderName, time: SystemTime) {
        let value = httpdate::fmt_http_date(time);
        self.set_header_str(name, &value);
    }

    /// Set a header from a string, dropping values that are not valid header text.
    fn set_header_str(&mut self, name: HeaderName, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(value) => self.set_header(name, value),
            Err(_) => tracing::warn!(header = %name, value = %value, "Invalid header value dropped"),
        }
    }

    fn set_last_modified_time(&mut self, time: SystemTime) {
        self.set_date_header(header::LAST_MODIFIED, time);
    }

    fn set_content_type(&mut self, content_type: &str) {
        self.set_header_str(header::CONTENT_TYPE, content_type);
    }

    fn set_content_length(&mut self, length: u64) {
        self.set_header(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    /// Force a download, optionally naming the file.
    fn set_attachment_header(&mut self, file_name: Option<&str>) {
        self.set_header_str(header::CONTENT_DISPOSITION, &disposition_value("attachment", file_name));
    }

    /// Render inline, optionally naming the file.
    fn set_inline_header(&mut self, file_name: Option<&str>) {
        self.set_header_str(header::CONTENT_DISPOSITION, &disposition_value("inline", file_name));
    }

    /// Allow caching for `duration` within `scope`.
    fn enable_caching(&mut self, duration: Duration, scope: CacheScope, now: SystemTime) {
        let duration = duration.min(MAX_CACHE_DURATION);
        self.set_date_header(header::DATE, now);
        self.set_date_header(header::EXPIRES, now + duration);
        let max_age = duration.as_secs_f64().round() as u64;
        self.set_header_str(
            header::CACHE_CONTROL,
            &format!("{}, max-age={}", scope.cache_control(), max_age),
        );
        // not an official value, but it overrides a stray 'no-cache'
        self.set_header(header::PRAGMA, HeaderValue::from_static("cache"));
    }

    /// Tell clients and proxies not to store the response.
    fn disable_caching(&mut self, now: SystemTime) {
        self.set_date_header(header::DATE, now);
        self.set_date_header(header::EXPIRES, UNIX_EPOCH);
        self.set_header(header::PRAGMA, HeaderValue::from_static("no-cache"));
        self.set_header(header::CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
    }
}

/// `Content-Disposition` value per RFC 6266.
pub fn disposition_value(kind: &str, file_name: Option<&str>) -> String {
    let Some(name) = file_name.filter(|n| !n.is_empty()) else {
        return kind.to_string();
    };

    let mut value = String::with_capacity(kind.len() + name.len() + 16);
    value.push_str(kind);
    value.push_str("; filename=\"");
    for c in name.chars() {
        match c {
            '"' | '\\' => {
                value.push('\\');
                value.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => value.push(c),
            _ => value.push('_'),
        }
    }
    value.push('"');

    if !name.is_ascii() {
        value.push_str("; filename*=UTF-8''");
        for byte in name.bytes() {
            if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
                value.push(byte as char);
            } else {
                value.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    value
}

/// In-memory [`WebResponse`] converted into an axum response when complete.
#[derive(Debug)]
pub struct BufferedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    committed: bool,
    flushes: usize,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            committed: false,
            flushes: 0,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Whether headers have been committed.
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Number of explicit flushes.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl Default for BufferedResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl WebResponse for BufferedResponse {
    fn set_status(&mut self, status: StatusCode) {
        if self.committed {
            tracing::warn!(status = %status, "Status change after commit ignored");
            return;
        }
        self.status = status;
    }

    fn send_error(&mut self, status: StatusCode, message: Option<&str>) {
        if self.committed {
            tracing::warn!(status = %status, "Cannot send error, response already committed");
            return;
        }
        self.status = status;
        self.body.clear();
        if let Some(message) = message {
            self.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
            self.body.extend_from_slice(message.as_bytes());
        }
        self.committed = true;
    }

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        if self.committed {
            tracing::warn!(header = %name, "Header change after commit ignored");
            return;
        }
        self.headers.insert(name, value);
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.committed = true;
        self.body.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.committed = true;
        self.flushes += 1;
        Ok(())
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Status and headers of a streamed response.
#[derive(Debug)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

type BodyChunk = Result<Bytes, io::Error>;

/// [`WebResponse`] that hands its head to the server as soon as it is
/// committed and then sends the body one chunk at a time.
///
/// Writes block the calling thread while the body channel is full, so this
/// sink belongs on the blocking pool.
pub struct StreamingResponse {
    status: StatusCode,
    headers: HeaderMap,
    head: Option<oneshot::Sender<ResponseHead>>,
    body: mpsc::Sender<BodyChunk>,
}

/// Receiving side of a [`StreamingResponse`].
pub struct ResponseReceiver {
    head: oneshot::Receiver<ResponseHead>,
    body: mpsc::Receiver<BodyChunk>,
}

impl StreamingResponse {
    /// A sink and its receiver; at most `capacity` body chunks are in flight.
    pub fn channel(capacity: usize) -> (Self, ResponseReceiver) {
        let (head_tx, head_rx) = oneshot::channel();
        let (body_tx, body_rx) = mpsc::channel(capacity.max(1));
        let response = Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            head: Some(head_tx),
            body: body_tx,
        };
        (response, ResponseReceiver { head: head_rx, body: body_rx })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the head has been sent.
    pub fn is_committed(&self) -> bool {
        self.head.is_none()
    }

    /// Send the head unless it already went out.
    pub fn commit(&mut self) {
        let Some(sender) = self.head.take() else {
            return;
        };
        let head = ResponseHead {
            status: self.status,
            headers: std::mem::take(&mut self.headers),
        };
        if sender.send(head).is_err() {
            tracing::debug!("Response head discarded, receiver gone");
        }
    }

    /// Give up on the response.
    ///
    /// Before commit the head is never sent and the receiver yields `None`.
    /// After commit the body ends with `error`, so the client sees a
    /// truncated response instead of a clean end of stream.
    pub fn abort(self, error: io::Error) {
        if self.is_committed() {
            let _ = self.body.blocking_send(Err(error));
        }
    }

    fn send_chunk(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.body
            .blocking_send(Ok(Bytes::copy_from_slice(bytes)))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "response body receiver dropped"))
    }
}

impl WebResponse for StreamingResponse {
    fn set_status(&mut self, status: StatusCode) {
        if self.is_committed() {
            tracing::warn!(status = %status, "Status change after commit ignored");
            return;
        }
        self.status = status;
    }

    fn send_error(&mut self, status: StatusCode, message: Option<&str>) {
        if self.is_committed() {
            tracing::warn!(status = %status, "Cannot send error, response already committed");
            return;
        }
        self.status = status;
        if message.is_some() {
            self.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
        }
        self.commit();
        if let Some(message) = message {
            if let Err(e) = self.send_chunk(message.as_bytes()) {
                tracing::debug!(error = %e, "Error message not delivered");
            }
        }
    }

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        if self.is_committed() {
            tracing::warn!(header = %name, "Header change after commit ignored");
            return;
        }
        self.headers.insert(name, value);
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.commit();
        if bytes.is_empty() {
            return Ok(());
        }
        self.send_chunk(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.commit();
        Ok(())
    }
}

impl ResponseReceiver {
    /// Wait for the head and build a response whose body follows the writer.
    ///
    /// Returns `None` when the writer was dropped or aborted before commit.
    pub async fn into_response(self) -> Option<Response> {
        let head = self.head.await.ok()?;
        let mut response = Response::new(Body::from_stream(ReceiverStream::new(self.body)));
        *response.status_mut() = head.status;
        *response.headers_mut() = head.headers;
        Some(response)
    }
}
