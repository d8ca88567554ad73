//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, mount settings and resource entries
//! - Detect duplicate resource keys and autocomplete ids
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::AppConfig;
use crate::filter::path::url_pattern_to_filter_path;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check `config` and report every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    validate_filter(config, &mut errors);
    validate_resources(config, &mut errors);
    validate_autocomplete(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_filter(config: &AppConfig, errors: &mut Vec<ValidationError>) {
    let filter = &config.filter;

    if !filter.context_path.is_empty() && !filter.context_path.starts_with('/') {
        errors.push(ValidationError::new("filter.context_path", "must start with '/'"));
    }

    if let Some(pattern) = &filter.filter_mapping_url_pattern {
        if let Err(e) = url_pattern_to_filter_path(pattern) {
            errors.push(ValidationError::new("filter.filter_mapping_url_pattern", e.to_string()));
        }
    }

    if filter.web_xml.is_some() && filter.filter_name.trim().is_empty() {
        errors.push(ValidationError::new(
            "filter.filter_name",
            "required when filter.web_xml is set",
        ));
    }
}

fn validate_resources(config: &AppConfig, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();

    for (i, file) in config.resources.files.iter().enumerate() {
        let field = |name: &str| format!("resources.files[{}].{}", i, name);

        if file.scope.is_empty() || file.scope.contains('/') {
            errors.push(ValidationError::new(field("scope"), "must be a non-empty path segment"));
        }
        if file.name.is_empty() {
            errors.push(ValidationError::new(field("name"), "must not be empty"));
        }
        if file.path.is_empty() {
            errors.push(ValidationError::new(field("path"), "must not be empty"));
        }
        if !seen.insert((file.scope.as_str(), file.name.as_str())) {
            errors.push(ValidationError::new(
                field("name"),
                format!("duplicate resource '{}/{}'", file.scope, file.name),
            ));
        }
    }

    for (extension, mime) in &config.resources.mime_types {
        if !mime.contains('/') {
            errors.push(ValidationError::new(
                format!("resources.mime_types.{}", extension),
                format!("'{}' is not a mime type", mime),
            ));
        }
    }
}

fn validate_autocomplete(config: &AppConfig, errors: &mut Vec<ValidationError>) {
    let mut ids = HashSet::new();

    for (i, field) in config.autocomplete.iter().enumerate() {
        let valid_id = !field.id.is_empty()
            && field
                .id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid_id {
            errors.push(ValidationError::new(
                format!("autocomplete[{}].id", i),
                "must be a non-empty markup id ([A-Za-z0-9_-])",
            ));
        }
        if !ids.insert(field.id.as_str()) {
            errors.push(ValidationError::new(
                format!("autocomplete[{}].id", i),
                format!("duplicate id '{}'", field.id),
            ));
        }
        if field.max_results == 0 {
            errors.push(ValidationError::new(
                format!("autocomplete[{}].max_results", i),
                "must be greater than 0",
            ));
        }
    }
}
