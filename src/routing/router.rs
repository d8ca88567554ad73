//! Request mapping.
//!
//! # Responsibilities
//! - Store the matchers in evaluation order
//! - Map a mount-relative path to its target
//! - Return the target or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan over matchers (acceptable for a handful of URL families)
//! - Explicit `None` rather than a silent default

use crate::routing::matcher::{AutoCompleteMatcher, Matcher, RequestTarget, ResourceMatcher};

/// Ordered list of matchers; the first match wins.
#[derive(Debug)]
pub struct RequestMapper {
    matchers: Vec<Box<dyn Matcher>>,
}

impl RequestMapper {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    /// Find the target for `relative_path`.
    pub fn map(&self, relative_path: &str) -> Option<RequestTarget> {
        self.matchers.iter().find_map(|m| m.matches(relative_path))
    }
}

impl Default for RequestMapper {
    fn default() -> Self {
        Self::new(vec![
            Box::new(ResourceMatcher::default()),
            Box::new(AutoCompleteMatcher::default()),
        ])
    }
}
