//! Autocomplete subsystem.
//!
//! # Data Flow
//! ```text
//! page render
//!     → behavior.rs (head script reference + init script)
//! browser types into the field
//!     → GET <mount>/wicket/autocomplete/<id>?q=<input>
//!     → AutoCompleteBehaviors lookup
//!     → source.rs (suggestions)
//!     → <ul><li textvalue="…">…</li></ul>
//! ```

pub mod behavior;
pub mod source;

use std::sync::Arc;

use dashmap::DashMap;

use crate::config::schema::AutoCompleteConfig;
use crate::resource::{ByteArrayResource, CacheDuration};

pub use behavior::{escape_html, AutoCompleteBehavior, INPUT_PARAMETER};
pub use source::{AutoCompleteSource, StaticChoices};

/// Shared resource scope of the client script.
pub const SCRIPT_SCOPE: &str = "autocomplete";

/// Shared resource name of the client script.
pub const SCRIPT_NAME: &str = "wicket-autocomplete.js";

static SCRIPT: &[u8] = include_bytes!("../../assets/wicket-autocomplete.js");

/// The client script as a resource, cacheable for the maximum duration.
pub fn script_resource() -> ByteArrayResource {
    ByteArrayResource::new("text/javascript", SCRIPT)
        .with_file_name(SCRIPT_NAME)
        .with_cache_duration(CacheDuration::MAX)
}

/// Behaviors by markup id.
#[derive(Debug, Clone, Default)]
pub struct AutoCompleteBehaviors {
    inner: Arc<DashMap<String, Arc<AutoCompleteBehavior>>>,
}

impl AutoCompleteBehaviors {
    pub fn new() -> Self {
        Self::default()
    }

    /// One behavior with static choices per configured field.
    pub fn from_config(fields: &[AutoCompleteConfig]) -> Self {
        let behaviors = Self::new();
        for field in fields {
            behaviors.register(AutoCompleteBehavior::new(
                field.id.clone(),
                StaticChoices::new(field.choices.clone(), field.max_results),
            ));
        }
        behaviors
    }

    /// Add `behavior`, replacing any with the same markup id.
    pub fn register(&self, behavior: AutoCompleteBehavior) -> Option<Arc<AutoCompleteBehavior>> {
        let id = behavior.markup_id().to_string();
        tracing::debug!(component = %id, "Autocomplete behavior registered");
        self.inner.insert(id, Arc::new(behavior))
    }

    pub fn get(&self, markup_id: &str) -> Option<Arc<AutoCompleteBehavior>> {
        self.inner.get(markup_id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
