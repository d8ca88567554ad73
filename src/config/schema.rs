//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::http::response::CacheScope;
use crate::resource::response::ContentDisposition;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Filter mount settings.
    pub filter: FilterConfig,

    /// Shared resource settings and file resources to register.
    pub resources: ResourcesConfig,

    /// Autocomplete fields served by the application.
    pub autocomplete: Vec<AutoCompleteConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Where the filter is mounted.
///
/// The mount path is taken from `filter_path` if set, else from
/// `filter_mapping_url_pattern`, else from the `web_xml` descriptor entry
/// named `filter_name`. With none of them the filter serves the root.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Filter (or servlet) name to look up in `web_xml`.
    pub filter_name: String,

    /// Servlet context path, `""` for the root context.
    pub context_path: String,

    /// Explicit filter path, e.g. `"app/"`.
    pub filter_path: Option<String>,

    /// Url-pattern init parameter, e.g. `"/app/*"`.
    pub filter_mapping_url_pattern: Option<String>,

    /// Deployment descriptor to read the mapping from.
    pub web_xml: Option<String>,

    /// Look up a `servlet-mapping` instead of a `filter-mapping`.
    pub is_servlet: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            filter_name: "WicketFilter".to_string(),
            context_path: String::new(),
            filter_path: None,
            filter_mapping_url_pattern: None,
            web_xml: None,
            is_servlet: false,
        }
    }
}

/// Resource defaults and registered file resources.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResourcesConfig {
    /// Cache lifetime for resources that do not set one, 0 disables caching.
    pub default_cache_secs: u64,

    /// Extension to mime type overrides, e.g. `{ "log" = "text/plain" }`.
    pub mime_types: HashMap<String, String>,

    /// Files served as shared resources.
    pub files: Vec<FileResourceConfig>,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            default_cache_secs: 3600,
            mime_types: HashMap::new(),
            files: Vec::new(),
        }
    }
}

/// A file on disk served under `/wicket/resource/<scope>/<name>`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileResourceConfig {
    #[serde(default = "default_scope")]
    pub scope: String,

    pub name: String,

    pub path: String,

    /// Overrides the mime type derived from the file extension.
    pub content_type: Option<String>,

    /// Charset for text content.
    pub text_encoding: Option<String>,

    #[serde(default)]
    pub disposition: ContentDisposition,

    /// Overrides `resources.default_cache_secs`.
    pub cache_secs: Option<u64>,

    #[serde(default)]
    pub cache_scope: CacheScope,
}

fn default_scope() -> String {
    "app".to_string()
}

/// One autocomplete text field.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AutoCompleteConfig {
    /// Markup id of the text field.
    pub id: String,

    /// Candidate values offered to the user.
    pub choices: Vec<String>,

    /// Maximum number of suggestions per request.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    10
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
