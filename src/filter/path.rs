//! Filter path resolution and the trailing-slash redirect check.
//!
//! # Responsibilities
//! - Resolve the filter's mount path once, lazily, from its configured source
//! - Decide whether a request for the bare mount path must be redirected to
//!   the same path with a trailing slash
//! - Strip the mount prefix from request paths for request mapping
//!
//! # Design Decisions
//! - The resolved path lives in a `OnceLock`: concurrent first requests race
//!   to initialize it, exactly one initializer runs and every thread sees the
//!   same fully built value
//! - The path is write-once; setting it after resolution is an error
//! - Resolution failures fall back to the root mount with a warning so a bad
//!   descriptor never takes the whole filter down

use std::path::PathBuf;
use std::sync::OnceLock;

use crate::config::schema::FilterConfig;
use crate::filter::error::FilterPathError;
use crate::filter::web_xml;

/// Where the filter path comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterPathSource {
    /// A literal path such as `filter/` or `/filter`.
    Explicit(String),
    /// A url-pattern init parameter such as `/servlet/*`.
    UrlPattern(String),
    /// The mapping for `name` in a deployment descriptor.
    WebXml {
        file: PathBuf,
        name: String,
        is_servlet: bool,
    },
}

/// The resolved mount.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedPath {
    /// Canonical filter path, `""` or `"prefix/"`.
    path: String,
    /// Length of `path` without its trailing slash.
    length: usize,
    /// `<context>/<path>` without the trailing slash.
    home: String,
}

/// Mount path of one filter instance, shared by all request threads.
#[derive(Debug)]
pub struct FilterPath {
    context_path: String,
    source: Option<FilterPathSource>,
    resolved: OnceLock<ResolvedPath>,
}

impl FilterPath {
    /// An unresolved filter path with no source; resolves to the root mount
    /// unless [`FilterPath::set_filter_path`] is called first.
    pub fn new(context_path: &str) -> Self {
        Self {
            context_path: canonicalise_context_path(context_path),
            source: None,
            resolved: OnceLock::new(),
        }
    }

    /// An unresolved filter path that resolves from `source` on first use.
    pub fn with_source(context_path: &str, source: FilterPathSource) -> Self {
        Self {
            source: Some(source),
            ..Self::new(context_path)
        }
    }

    /// Pick the source from configuration: explicit path, then url-pattern
    /// init parameter, then deployment descriptor.
    pub fn from_config(config: &FilterConfig) -> Self {
        let source = if let Some(path) = &config.filter_path {
            Some(FilterPathSource::Explicit(path.clone()))
        } else if let Some(pattern) = &config.filter_mapping_url_pattern {
            Some(FilterPathSource::UrlPattern(pattern.clone()))
        } else {
            config.web_xml.as_ref().map(|file| FilterPathSource::WebXml {
                file: PathBuf::from(file),
                name: config.filter_name.clone(),
                is_servlet: config.is_servlet,
            })
        };

        match source {
            Some(source) => Self::with_source(&config.context_path, source),
            None => Self::new(&config.context_path),
        }
    }

    /// Fix the filter path. Fails if it is already known.
    pub fn set_filter_path(&self, path: &str) -> Result<(), FilterPathError> {
        let resolved = ResolvedPath::new(&self.context_path, canonicalise_filter_path(path));
        self.resolved.set(resolved).map_err(|_| FilterPathError::AlreadySet {
            current: self.filter_path().to_string(),
        })?;
        tracing::info!(filter_path = %self.filter_path(), "Filter path set");
        Ok(())
    }

    /// Canonical filter path (`""` for a root mount, otherwise `"prefix/"`).
    pub fn filter_path(&self) -> &str {
        &self.resolved().path
    }

    /// Servlet-style context path (`""` or `"/ctx"`).
    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    /// Whether the path has been resolved yet.
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// Redirect target for a request to the bare mount path, if needed.
    ///
    /// `/ctx/filter` becomes `/ctx/filter/` (plus `?query` when non-empty);
    /// every other path needs no redirect.
    pub fn check_if_redirect_required(&self, request_path: &str, query: &str) -> Option<String> {
        let resolved = self.resolved();
        let uri = strip_jsession_id(request_path);

        let home_length = self.context_path.len()
            + if resolved.length > 0 { 1 + resolved.length } else { 0 };
        if uri.len() != home_length || uri != resolved.home {
            return None;
        }

        let mut target = String::with_capacity(uri.len() + query.len() + 2);
        target.push_str(uri);
        target.push('/');
        if !query.is_empty() {
            target.push('?');
            target.push_str(query);
        }
        Some(target)
    }

    /// Part of `request_path` below the mount, e.g. `wicket/resource/a/b`
    /// for `/ctx/filter/wicket/resource/a/b`. `None` outside the mount.
    pub fn relative_path<'p>(&self, request_path: &'p str) -> Option<&'p str> {
        let resolved = self.resolved();
        strip_jsession_id(request_path)
            .strip_prefix(self.context_path.as_str())?
            .strip_prefix('/')?
            .strip_prefix(resolved.path.as_str())
    }

    /// Absolute URL path for `relative` below the mount.
    pub fn url_for(&self, relative: &str) -> String {
        format!("{}/{}{}", self.context_path, self.filter_path(), relative)
    }

    fn resolved(&self) -> &ResolvedPath {
        self.resolved.get_or_init(|| {
            let path = self.resolve_source();
            tracing::debug!(filter_path = %path, context_path = %self.context_path, "Filter path resolved");
            ResolvedPath::new(&self.context_path, path)
        })
    }

    fn resolve_source(&self) -> String {
        let result = match &self.source {
            None => Ok(String::new()),
            Some(FilterPathSource::Explicit(path)) => Ok(canonicalise_filter_path(path)),
            Some(FilterPathSource::UrlPattern(pattern)) => url_pattern_to_filter_path(pattern),
            Some(FilterPathSource::WebXml {
                file,
                name,
                is_servlet,
            }) => web_xml::unique_filter_path_from_file(*is_servlet, name, file),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, source = ?self.source, "Could not resolve filter path, using root mount");
            String::new()
        })
    }
}

impl ResolvedPath {
    fn new(context_path: &str, path: String) -> Self {
        let length = path.strip_suffix('/').unwrap_or(&path).len();
        let home = format!("{}/{}", context_path, &path[..length]);
        let home = match home.strip_suffix('/') {
            Some(stripped) => stripped.to_string(),
            None => home,
        };
        Self { path, length, home }
    }
}

/// Normalise a filter path: no leading `/`, no trailing `*`, a trailing `/`
/// unless empty.
pub fn canonicalise_filter_path(path: &str) -> String {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('*').unwrap_or(path);
    if path.is_empty() || path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// Convert a `/*` or `/<prefix>/*` url-pattern to a filter path.
pub fn url_pattern_to_filter_path(pattern: &str) -> Result<String, FilterPathError> {
    let pattern = pattern.trim();
    if !pattern.starts_with('/') || !pattern.ends_with("/*") {
        return Err(FilterPathError::InvalidUrlPattern(pattern.to_string()));
    }
    Ok(pattern[1..pattern.len() - 1].to_string())
}

fn canonicalise_context_path(context_path: &str) -> String {
    let trimmed = context_path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Drop a `;jsessionid=...` style path parameter.
fn strip_jsession_id(path: &str) -> &str {
    match path.find(';') {
        Some(index) => &path[..index],
        None => path,
    }
}
