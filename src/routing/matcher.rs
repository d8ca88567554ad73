//! Request path matching logic.
//!
//! # Responsibilities
//! - Recognise shared resource URLs (`wicket/resource/<scope>/<name>`)
//! - Recognise autocomplete callback URLs (`wicket/autocomplete/<id>`)
//!
//! # Design Decisions
//! - Matchers see the path relative to the filter mount
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching

/// What a request addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTarget {
    SharedResource { scope: String, name: String },
    AutoComplete { component_id: String },
}

/// Trait for matching mount-relative paths.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns the target if the path matches this condition.
    fn matches(&self, relative_path: &str) -> Option<RequestTarget>;
}

/// Matches `<prefix><scope>/<name>`; the name may contain further slashes.
#[derive(Debug, Clone)]
pub struct ResourceMatcher {
    prefix: String,
}

impl ResourceMatcher {
    pub const DEFAULT_PREFIX: &'static str = "wicket/resource/";

    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for ResourceMatcher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PREFIX)
    }
}

impl Matcher for ResourceMatcher {
    fn matches(&self, relative_path: &str) -> Option<RequestTarget> {
        let rest = relative_path.strip_prefix(self.prefix.as_str())?;
        let (scope, name) = rest.split_once('/')?;
        if scope.is_empty() || name.is_empty() {
            return None;
        }
        Some(RequestTarget::SharedResource {
            scope: scope.to_string(),
            name: name.to_string(),
        })
    }
}

/// Matches `<prefix><component-id>`.
#[derive(Debug, Clone)]
pub struct AutoCompleteMatcher {
    prefix: String,
}

impl AutoCompleteMatcher {
    pub const DEFAULT_PREFIX: &'static str = "wicket/autocomplete/";

    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for AutoCompleteMatcher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PREFIX)
    }
}

impl Matcher for AutoCompleteMatcher {
    fn matches(&self, relative_path: &str) -> Option<RequestTarget> {
        let id = relative_path.strip_prefix(self.prefix.as_str())?;
        if id.is_empty() || id.contains('/') {
            return None;
        }
        Some(RequestTarget::AutoComplete {
            component_id: id.to_string(),
        })
    }
}
