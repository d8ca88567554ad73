//! Filter path resolution errors.

use thiserror::Error;

/// Failure to determine the mount path of the filter.
#[derive(Debug, Error)]
pub enum FilterPathError {
    #[error("no <url-pattern> mapped to '{name}' in the deployment descriptor")]
    NotFound { name: String },

    #[error("'{name}' is mapped to several paths ({paths:?}); only one is supported")]
    Ambiguous { name: String, paths: Vec<String> },

    #[error("unsupported url-pattern '{0}': expected '/*' or '/<prefix>/*'")]
    InvalidUrlPattern(String),

    #[error("malformed deployment descriptor: {0}")]
    Xml(String),

    #[error("failed to read deployment descriptor: {0}")]
    Io(#[from] std::io::Error),

    #[error("filter path is write-once; current value is '{current}'")]
    AlreadySet { current: String },
}
