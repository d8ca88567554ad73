//! Resource backed by an in-memory byte array.

use std::sync::Arc;
use std::time::SystemTime;

use crate::http::response::CacheScope;
use crate::resource::attributes::Attributes;
use crate::resource::response::{CacheDuration, ContentDisposition, ResourceResponse};
use crate::resource::Resource;

/// Fixed bytes with a fixed content type. Last-modified is the creation time.
#[derive(Debug, Clone)]
pub struct ByteArrayResource {
    data: Arc<[u8]>,
    content_type: String,
    file_name: Option<String>,
    disposition: ContentDisposition,
    last_modified: SystemTime,
    cache_duration: Option<CacheDuration>,
    cache_scope: CacheScope,
}

impl ByteArrayResource {
    pub fn new(content_type: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
            file_name: None,
            disposition: ContentDisposition::Inline,
            last_modified: SystemTime::now(),
            cache_duration: None,
            cache_scope: CacheScope::Private,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_disposition(mut self, disposition: ContentDisposition) -> Self {
        self.disposition = disposition;
        self
    }

    pub fn with_last_modified(mut self, last_modified: SystemTime) -> Self {
        self.last_modified = last_modified;
        self
    }

    /// Override the application's default cache duration.
    pub fn with_cache_duration(mut self, duration: CacheDuration) -> Self {
        self.cache_duration = Some(duration);
        self
    }

    pub fn with_cache_scope(mut self, scope: CacheScope) -> Self {
        self.cache_scope = scope;
        self
    }
}

impl Resource for ByteArrayResource {
    fn new_resource_response(&self, attributes: &Attributes<'_>) -> ResourceResponse {
        let mut response = attributes.new_resource_response();
        response.set_content_type(self.content_type.clone());
        response.set_last_modified(self.last_modified);
        response.set_cache_scope(self.cache_scope);
        if let Some(duration) = self.cache_duration {
            response.set_cache_duration(duration);
        }

        if response.data_needs_to_be_written(attributes.request()) {
            if let Some(file_name) = &self.file_name {
                response.set_file_name(file_name.clone());
            }
            response.set_content_disposition(self.disposition);
            response.set_content_length(self.data.len() as i64);

            let data = Arc::clone(&self.data);
            response.set_write_callback(move |attributes| {
                attributes.response().write(&data)?;
                Ok(())
            });
        }
        response
    }
}
