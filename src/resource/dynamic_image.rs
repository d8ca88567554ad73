//! Image resource whose bytes are produced per request.

use std::fmt;
use std::time::SystemTime;

use axum::http::StatusCode;

use crate::resource::attributes::Attributes;
use crate::resource::response::{CacheDuration, ResourceResponse};
use crate::resource::Resource;

type ImageProducer = Box<dyn Fn(&Attributes<'_>) -> Option<Vec<u8>> + Send + Sync>;

/// Generated image. The producer only runs when the client's copy is stale.
pub struct DynamicImageResource {
    format: String,
    last_modified: SystemTime,
    cache_duration: Option<CacheDuration>,
    producer: ImageProducer,
}

impl DynamicImageResource {
    /// `format` is the image subtype, e.g. `png` for `image/png`.
    /// A producer returning `None` answers 404.
    pub fn new<F>(format: impl Into<String>, producer: F) -> Self
    where
        F: Fn(&Attributes<'_>) -> Option<Vec<u8>> + Send + Sync + 'static,
    {
        Self {
            format: format.into(),
            last_modified: SystemTime::now(),
            cache_duration: None,
            producer: Box::new(producer),
        }
    }

    pub fn with_last_modified(mut self, last_modified: SystemTime) -> Self {
        self.last_modified = last_modified;
        self
    }

    pub fn with_cache_duration(mut self, duration: CacheDuration) -> Self {
        self.cache_duration = Some(duration);
        self
    }

    pub fn format(&self) -> &str {
        &self.format
    }
}

impl fmt::Debug for DynamicImageResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicImageResource")
            .field("format", &self.format)
            .field("last_modified", &self.last_modified)
            .field("cache_duration", &self.cache_duration)
            .finish_non_exhaustive()
    }
}

impl Resource for DynamicImageResource {
    fn new_resource_response(&self, attributes: &Attributes<'_>) -> ResourceResponse {
        let mut response = attributes.new_resource_response();
        response.set_last_modified(self.last_modified);
        if let Some(duration) = self.cache_duration {
            response.set_cache_duration(duration);
        }

        if !response.data_needs_to_be_written(attributes.request()) {
            return response;
        }

        match (self.producer)(attributes) {
            Some(data) => {
                response.set_content_type(format!("image/{}", self.format));
                response.set_content_length(data.len() as i64);
                response.set_write_callback(move |attributes| {
                    attributes.response().write(&data)?;
                    Ok(())
                });
            }
            None => response.set_error(StatusCode::NOT_FOUND),
        }
        response
    }
}
