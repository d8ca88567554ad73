//! Registry of shared resources.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::resource::Resource;

/// Resources are addressed by a scope and a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub scope: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope, self.name)
    }
}

/// Thread-safe map of mounted resources. Clones share the same map.
#[derive(Clone, Default)]
pub struct SharedResources {
    inner: Arc<DashMap<ResourceKey, Arc<dyn Resource>>>,
}

impl SharedResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `resource`, returning the one it replaced.
    pub fn add(
        &self,
        scope: impl Into<String>,
        name: impl Into<String>,
        resource: impl Resource + 'static,
    ) -> Option<Arc<dyn Resource>> {
        let key = ResourceKey::new(scope, name);
        tracing::debug!(resource = %key, "Shared resource registered");
        self.inner.insert(key, Arc::new(resource))
    }

    pub fn get(&self, scope: &str, name: &str) -> Option<Arc<dyn Resource>> {
        self.inner
            .get(&ResourceKey::new(scope, name))
            .map(|entry| entry.value().clone())
    }

    pub fn remove(&self, scope: &str, name: &str) -> Option<Arc<dyn Resource>> {
        self.inner
            .remove(&ResourceKey::new(scope, name))
            .map(|(_, resource)| resource)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<ResourceKey> {
        let mut keys: Vec<_> = self.inner.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }
}
