//! Application-wide resource settings.
//!
//! Held behind an `ArcSwap` by the server so a config reload takes effect
//! for the next request without locking.

use crate::config::schema::ResourcesConfig;
use crate::resource::mime::{MimeRegistry, MimeTypes};
use crate::resource::response::CacheDuration;

#[derive(Debug, Clone)]
pub struct ResourceSettings {
    default_cache_duration: CacheDuration,
    mime_types: MimeRegistry,
}

impl ResourceSettings {
    pub fn new(default_cache_duration: CacheDuration, mime_types: MimeRegistry) -> Self {
        Self {
            default_cache_duration,
            mime_types,
        }
    }

    pub fn from_config(config: &ResourcesConfig) -> Self {
        Self::new(
            CacheDuration::from_secs(config.default_cache_secs),
            MimeRegistry::with_overrides(&config.mime_types),
        )
    }

    pub fn default_cache_duration(&self) -> CacheDuration {
        self.default_cache_duration
    }

    pub fn mime_types(&self) -> &dyn MimeTypes {
        &self.mime_types
    }
}

impl Default for ResourceSettings {
    fn default() -> Self {
        Self::from_config(&ResourcesConfig::default())
    }
}
