//! Per-request resource response descriptor.
//!
//! A resource builds one [`ResourceResponse`] for every request, configures it
//! and hands it to the responder, which consumes it exactly once.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::http::request::WebRequest;
use crate::http::response::{CacheScope, MAX_CACHE_DURATION};
use crate::resource::attributes::Attributes;
use crate::resource::error::ResourceError;
use crate::resource::mime::MimeTypes;
use crate::resource::write::WriteCallback;

/// Inline rendering vs. forced download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentDisposition {
    #[default]
    Inline,
    Attachment,
}

/// How long a client may cache a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheDuration(Duration);

impl CacheDuration {
    /// Caching disabled.
    pub const NONE: CacheDuration = CacheDuration(Duration::ZERO);

    /// Longest allowed lifetime.
    pub const MAX: CacheDuration = CacheDuration(MAX_CACHE_DURATION);

    pub const fn from_secs(secs: u64) -> Self {
        CacheDuration(Duration::from_secs(secs))
    }

    pub fn is_none(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl From<Duration> for CacheDuration {
    fn from(duration: Duration) -> Self {
        CacheDuration(duration)
    }
}

/// Describes how one resource request is answered.
pub struct ResourceResponse {
    error_code: Option<StatusCode>,
    error_message: Option<String>,
    file_name: Option<String>,
    content_disposition: ContentDisposition,
    content_type: Option<String>,
    text_encoding: Option<String>,
    content_length: i64,
    last_modified: Option<SystemTime>,
    cache_duration: CacheDuration,
    cache_scope: CacheScope,
    write_callback: Option<Box<dyn WriteCallback>>,
}

impl ResourceResponse {
    /// New descriptor using `default_cache_duration`.
    ///
    /// The cache scope starts out private: public caching could leak
    /// per-user data through shared proxies.
    pub fn new(default_cache_duration: CacheDuration) -> Self {
        Self {
            error_code: None,
            error_message: None,
            file_name: None,
            content_disposition: ContentDisposition::Inline,
            content_type: None,
            text_encoding: None,
            content_length: -1,
            last_modified: None,
            cache_duration: default_cache_duration,
            cache_scope: CacheScope::Private,
            write_callback: None,
        }
    }

    /// Send `code` instead of any data.
    pub fn set_error(&mut self, code: StatusCode) {
        self.set_error_with_message(code, None::<String>);
    }

    /// Send `code` with `message` instead of any data.
    pub fn set_error_with_message(&mut self, code: StatusCode, message: Option<impl Into<String>>) {
        self.error_code = Some(code);
        self.error_message = message.map(Into::into);
    }

    pub fn error_code(&self) -> Option<StatusCode> {
        self.error_code
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn set_file_name(&mut self, file_name: impl Into<String>) {
        self.file_name = Some(file_name.into());
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn set_content_disposition(&mut self, disposition: ContentDisposition) {
        self.content_disposition = disposition;
    }

    pub fn content_disposition(&self) -> ContentDisposition {
        self.content_disposition
    }

    /// Explicit mime type. When unset it is derived from the file name.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = Some(content_type.into());
    }

    /// The explicitly configured mime type.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Explicit mime type, else the one registered for the file name's extension.
    pub fn resolve_content_type(&self, mime_types: &dyn MimeTypes) -> Option<String> {
        match (&self.content_type, &self.file_name) {
            (Some(content_type), _) => Some(content_type.clone()),
            (None, Some(file_name)) => mime_types.mime_type(file_name),
            (None, None) => None,
        }
    }

    /// Charset for textual content. Ignored for non-text mime types.
    pub fn set_text_encoding(&mut self, encoding: impl Into<String>) {
        self.text_encoding = Some(encoding.into());
    }

    pub fn text_encoding(&self) -> Option<&str> {
        self.text_encoding.as_deref()
    }

    /// Body length in bytes, `-1` when unknown.
    pub fn set_content_length(&mut self, length: i64) {
        self.content_length = length;
    }

    pub fn content_length(&self) -> i64 {
        self.content_length
    }

    /// Set the validator used for conditional requests.
    pub fn set_last_modified(&mut self, last_modified: SystemTime) {
        self.last_modified = Some(last_modified);
    }

    pub fn last_modified(&self) -> Option<SystemTime> {
        self.last_modified
    }

    /// Whether the body has to be sent, based on `If-Modified-Since`.
    ///
    /// Header dates carry whole seconds, so the last-modified time is
    /// truncated before comparing. Changes within the same second as the
    /// client's copy are not detected.
    pub fn data_needs_to_be_written(&self, request: &WebRequest) -> bool {
        match (request.if_modified_since(), self.last_modified) {
            (Some(if_modified_since), Some(last_modified)) => {
                if_modified_since < truncate_to_seconds(last_modified)
            }
            _ => true,
        }
    }

    pub fn disable_caching(&mut self) {
        self.cache_duration = CacheDuration::NONE;
    }

    pub fn set_cache_duration_to_maximum(&mut self) {
        self.cache_duration = CacheDuration::MAX;
    }

    pub fn set_cache_duration(&mut self, duration: impl Into<CacheDuration>) {
        self.cache_duration = duration.into();
    }

    /// [`CacheDuration::NONE`] means caching is disabled.
    pub fn cache_duration(&self) -> CacheDuration {
        self.cache_duration
    }

    /// Only relevant when caching is enabled.
    pub fn set_cache_scope(&mut self, scope: CacheScope) {
        self.cache_scope = scope;
    }

    pub fn cache_scope(&self) -> CacheScope {
        self.cache_scope
    }

    /// Install the closure that writes the body once headers are committed.
    ///
    /// Required whenever data needs to be written and no error is set.
    pub fn set_write_callback<F>(&mut self, callback: F)
    where
        F: FnOnce(&mut Attributes<'_>) -> Result<(), ResourceError> + Send + 'static,
    {
        self.write_callback = Some(Box::new(callback));
    }

    /// Install a write callback object.
    pub fn set_boxed_write_callback(&mut self, callback: Box<dyn WriteCallback>) {
        self.write_callback = Some(callback);
    }

    pub fn has_write_callback(&self) -> bool {
        self.write_callback.is_some()
    }

    /// Remove the write callback so it can be invoked.
    pub fn take_write_callback(&mut self) -> Option<Box<dyn WriteCallback>> {
        self.write_callback.take()
    }
}

impl fmt::Debug for ResourceResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceResponse")
            .field("error_code", &self.error_code)
            .field("error_message", &self.error_message)
            .field("file_name", &self.file_name)
            .field("content_disposition", &self.content_disposition)
            .field("content_type", &self.content_type)
            .field("text_encoding", &self.text_encoding)
            .field("content_length", &self.content_length)
            .field("last_modified", &self.last_modified)
            .field("cache_duration", &self.cache_duration)
            .field("cache_scope", &self.cache_scope)
            .field("has_write_callback", &self.write_callback.is_some())
            .finish()
    }
}

/// Drop the sub-second part of `time`.
pub fn truncate_to_seconds(time: SystemTime) -> SystemTime {
    match time.duration_since(UNIX_EPOCH) {
        Ok(since_epoch) => UNIX_EPOCH + Duration::from_secs(since_epoch.as_secs()),
        Err(_) => time,
    }
}
