//! Resource streamed from a file on disk.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use axum::http::StatusCode;

use crate::http::response::CacheScope;
use crate::resource::attributes::Attributes;
use crate::resource::response::{CacheDuration, ContentDisposition, ResourceResponse};
use crate::resource::write::StreamWriteCallback;
use crate::resource::Resource;

/// Serves one file. Metadata is read per request so edits on disk show up
/// as a new last-modified time.
#[derive(Debug, Clone)]
pub struct FileResource {
    path: PathBuf,
    content_type: Option<String>,
    text_encoding: Option<String>,
    disposition: ContentDisposition,
    cache_duration: Option<CacheDuration>,
    cache_scope: CacheScope,
}

impl FileResource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content_type: None,
            text_encoding: None,
            disposition: ContentDisposition::Inline,
            cache_duration: None,
            cache_scope: CacheScope::Private,
        }
    }

    /// Explicit mime type; derived from the extension when unset.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_text_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.text_encoding = Some(encoding.into());
        self
    }

    pub fn with_disposition(mut self, disposition: ContentDisposition) -> Self {
        self.disposition = disposition;
        self
    }

    pub fn with_cache_duration(mut self, duration: CacheDuration) -> Self {
        self.cache_duration = Some(duration);
        self
    }

    pub fn with_cache_scope(mut self, scope: CacheScope) -> Self {
        self.cache_scope = scope;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Resource for FileResource {
    fn new_resource_response(&self, attributes: &Attributes<'_>) -> ResourceResponse {
        let mut response = attributes.new_resource_response();
        response.set_cache_scope(self.cache_scope);
        if let Some(duration) = self.cache_duration {
            response.set_cache_duration(duration);
        }

        // length and mtime must describe the version that gets streamed
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "File resource unavailable");
                response.set_error(status_for(&e));
                return response;
            }
        };
        let metadata = match file.metadata() {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => {
                response.set_error(StatusCode::NOT_FOUND);
                return response;
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to stat file resource");
                response.set_error(status_for(&e));
                return response;
            }
        };

        if let Ok(modified) = metadata.modified() {
            response.set_last_modified(modified);
        }
        if let Some(file_name) = self.path.file_name().and_then(|n| n.to_str()) {
            response.set_file_name(file_name);
        }
        if let Some(content_type) = &self.content_type {
            response.set_content_type(content_type.clone());
        }
        if let Some(encoding) = &self.text_encoding {
            response.set_text_encoding(encoding.clone());
        }
        response.set_content_disposition(self.disposition);

        if !response.data_needs_to_be_written(attributes.request()) {
            return response;
        }

        response.set_content_length(i64::try_from(metadata.len()).unwrap_or(-1));
        response.set_boxed_write_callback(Box::new(StreamWriteCallback::new(BufReader::new(file))));
        response
    }
}

fn status_for(error: &io::Error) -> StatusCode {
    match error.kind() {
        io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
        io::ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
