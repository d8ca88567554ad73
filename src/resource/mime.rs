//! Mime type lookup by file extension.

use std::collections::HashMap;
use std::path::Path;

/// Resolves a mime type from a file name.
pub trait MimeTypes: Send + Sync {
    fn mime_type(&self, file_name: &str) -> Option<String>;
}

/// Configured extension overrides first, then the `mime_guess` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimeRegistry {
    overrides: HashMap<String, String>,
}

impl MimeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build with `extension -> mime type` overrides. Extensions are matched
    /// case-insensitively and may be given with or without a leading dot.
    pub fn with_overrides<'a>(overrides: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        let mut registry = Self::new();
        for (extension, mime_type) in overrides {
            registry.register(extension, mime_type);
        }
        registry
    }

    pub fn register(&mut self, extension: &str, mime_type: &str) {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        self.overrides.insert(extension, mime_type.to_string());
    }
}

impl MimeTypes for MimeRegistry {
    fn mime_type(&self, file_name: &str) -> Option<String> {
        let extension = Path::new(file_name)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();

        if let Some(mime_type) = self.overrides.get(&extension) {
            return Some(mime_type.clone());
        }
        mime_guess::from_ext(&extension)
            .first_raw()
            .map(str::to_string)
    }
}
