//! Configuration source trait.

use crate::core::StructMap;
use crate::error::Result;

/// Trait for mapping sources.
///
/// Implement this trait to feed configuration from outside the process.
/// Parsing any file or wire format is the source's job; the store only
/// deep-merges the resulting map.
pub trait ConfigSource {
    /// Load configuration as a map.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be loaded or parsed.
    fn load(&self) -> Result<StructMap>;

    /// Get a human-readable name for this source (for logging/debugging).
    fn name(&self) -> String;

    /// Get the priority of this source (higher = takes precedence).
    ///
    /// Sources sharing a priority are merged in the order they were added.
    fn priority(&self) -> i32 {
        100
    }
}

impl ConfigSource for StructMap {
    fn load(&self) -> Result<StructMap> {
        Ok(self.deep_copy())
    }

    fn name(&self) -> String {
        "map".to_string()
    }
}
