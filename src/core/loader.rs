//! Configuration loader that merges multiple sources.

use crate::core::StructMap;
use crate::error::{ConfigError, Result};
use crate::sources::ConfigSource;

/// Loads and deep-merges configuration from multiple sources.
///
/// Sources are merged in priority order (lower priority first), so higher
/// priority sources override individual keys without replacing whole subtrees.
pub struct ConfigLoader {
    sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Add a configuration source.
    pub fn add_source(&mut self, source: Box<dyn ConfigSource>) {
        self.sources.push(source);
    }

    /// Whether no sources were added.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    fn sorted(&self) -> Vec<&dyn ConfigSource> {
        let mut sorted: Vec<_> = self.sources.iter().map(|s| s.as_ref()).collect();
        sorted.sort_by_key(|s| s.priority());
        sorted
    }

    /// Load and deep-merge every source.
    ///
    /// # Errors
    ///
    /// Returns an error if no sources were added or any source fails to load.
    pub fn load(&self) -> Result<StructMap> {
        if self.sources.is_empty() {
            return Err(ConfigError::LoadError(
                "No configuration sources specified".to_string(),
            ));
        }

        let merged = StructMap::new();
        for source in self.sorted() {
            let values = source.load().map_err(|e| {
                ConfigError::LoadError(format!("Failed to load source '{}': {}", source.name(), e))
            })?;
            tracing::debug!(source = %source.name(), keys = values.len(), "merging configuration source");
            merged.deep_merge_in_place(&values);
        }
        Ok(merged)
    }

    /// Get the list of source names in priority order.
    pub fn source_names(&self) -> Vec<String> {
        self.sorted().iter().map(|s| s.name()).collect()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
