//! Post-configuration hook.

use crate::core::StructMap;
use crate::error::ValidationError;

/// Runs after every `configure` and `pop` on a [`Configuration`](crate::core::Configuration).
///
/// Use it to validate the finished configuration or to notify dependent
/// objects. Any closure `Fn(&StructMap) -> Result<(), ValidationError>`
/// implements this trait.
///
/// # Examples
///
/// ```rust
/// use nestconf::prelude::*;
///
/// struct RequirePort;
///
/// impl AfterConfig for RequirePort {
///     fn after_config(&self, config: &StructMap) -> std::result::Result<(), ValidationError> {
///         if !config.contains_key("port") {
///             return Err(ValidationError::invalid_field("port", "is required"));
///         }
///         Ok(())
///     }
/// }
///
/// let mut config = Configuration::new();
/// config.set_after_config(RequirePort);
/// assert!(config.configure(|_| Ok(())).is_err());
/// ```
pub trait AfterConfig {
    /// Inspect the fully configured store.
    ///
    /// # Errors
    ///
    /// Should return a `ValidationError` describing what is wrong.
    fn after_config(&self, config: &StructMap) -> Result<(), ValidationError>;
}

impl<F> AfterConfig for F
where
    F: Fn(&StructMap) -> Result<(), ValidationError>,
{
    fn after_config(&self, config: &StructMap) -> Result<(), ValidationError> {
        self(config)
    }
}
