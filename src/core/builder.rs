//! Builder for constructing Configuration instances.

use crate::core::{AfterConfig, ConfigLoader, Configuration, StructMap};
use crate::error::Result;
use crate::sources::ConfigSource;

type DefaultsFn = Box<dyn FnOnce(&StructMap) -> Result<()>>;

/// Builder for constructing a [`Configuration`].
///
/// The baseline is assembled in this order: explicit defaults, defaults
/// blocks, then mapping sources merged by priority. Whatever results is
/// captured as the store's defaults.
///
/// # Examples
///
/// ```rust
/// use nestconf::prelude::*;
/// use serde_json::json;
///
/// # fn example() -> nestconf::error::Result<()> {
/// let overrides = StructMap::from_json(json!({ "server": { "host": "0.0.0.0" } }))?;
/// let config = Configuration::builder()
///     .with_defaults(StructMap::from_json(json!({ "server": { "port": 8080 } }))?)
///     .with_defaults_fn(|d| d.set_attr("project", "nestconf"))
///     .with_source(overrides)
///     .build()?;
///
/// assert_eq!(config.lookup("server.port")?, Some(Value::Integer(8080)));
/// assert_eq!(config.lookup("server.host")?, Some(Value::from("0.0.0.0")));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct ConfigurationBuilder {
    defaults: StructMap,
    defaults_fns: Vec<DefaultsFn>,
    sources: Vec<Box<dyn ConfigSource>>,
    hook: Option<Box<dyn AfterConfig>>,
}

impl ConfigurationBuilder {
    /// Create a new builder with empty defaults.
    pub fn new() -> Self {
        Self {
            defaults: StructMap::new(),
            defaults_fns: Vec::new(),
            sources: Vec::new(),
            hook: None,
        }
    }

    /// Deep-merge `defaults` into the baseline.
    pub fn with_defaults(self, defaults: StructMap) -> Self {
        self.defaults.deep_merge_in_place(&defaults);
        self
    }

    /// Run `block` against the baseline during [`build`](Self::build).
    pub fn with_defaults_fn<F>(mut self, block: F) -> Self
    where
        F: FnOnce(&StructMap) -> Result<()> + 'static,
    {
        self.defaults_fns.push(Box::new(block));
        self
    }

    /// Add a mapping source. Sources are merged over the defaults in
    /// ascending [`priority`](ConfigSource::priority) order.
    pub fn with_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Install the after-config hook.
    pub fn after_config(mut self, hook: impl AfterConfig + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    /// Assemble the baseline and build the store.
    ///
    /// # Errors
    ///
    /// Returns an error if a defaults block fails or a source cannot be loaded.
    pub fn build(self) -> Result<Configuration> {
        let defaults = self.defaults;
        for block in self.defaults_fns {
            block(&defaults)?;
        }

        let mut loader = ConfigLoader::new();
        for source in self.sources {
            loader.add_source(source);
        }
        if !loader.is_empty() {
            defaults.deep_merge_in_place(&loader.load()?);
        }

        Ok(Configuration::from_parts(defaults, self.hook))
    }
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::error::{ConfigError, ValidationError};
    use serde_json::json;

    struct StaticSource(serde_json::Value, i32);

    impl ConfigSource for StaticSource {
        fn load(&self) -> Result<StructMap> {
            StructMap::from_json(self.0.clone())
        }

        fn name(&self) -> String {
            "static".to_string()
        }

        fn priority(&self) -> i32 {
            self.1
        }
    }

    #[test]
    fn test_defaults_then_blocks_then_sources() {
        let config = ConfigurationBuilder::new()
            .with_defaults(StructMap::from_json(json!({ "a": 1, "b": { "c": 2 } })).unwrap())
            .with_defaults_fn(|d| d.set_attr("a", 10))
            .with_source(StaticSource(json!({ "b": { "d": 3 } }), 100))
            .build()
            .unwrap();

        assert_eq!(
            config.default_values(),
            StructMap::from_json(json!({ "a": 10, "b": { "c": 2, "d": 3 } })).unwrap()
        );
        assert_eq!(config.lookup("b.c").unwrap(), Some(Value::Integer(2)));
    }

    #[test]
    fn test_sources_merge_by_priority_not_insertion() {
        let config = ConfigurationBuilder::new()
            .with_source(StaticSource(json!({ "port": 9090 }), 200))
            .with_source(StaticSource(json!({ "port": 8080, "host": "localhost" }), 100))
            .build()
            .unwrap();

        assert_eq!(config.get("port").unwrap(), Some(Value::Integer(9090)));
        assert_eq!(config.get("host").unwrap(), Some(Value::from("localhost")));
    }

    #[test]
    fn test_block_error_aborts_build() {
        let result = ConfigurationBuilder::new()
            .with_defaults_fn(|d| d.set_attr("keys", 1))
            .build();
        assert!(matches!(result, Err(ConfigError::ReservedKey(_))));
    }

    #[test]
    fn test_hook_installed() {
        let mut config = ConfigurationBuilder::new()
            .after_config(|_: &StructMap| -> std::result::Result<(), ValidationError> {
                Err(ValidationError::custom("always"))
            })
            .build()
            .unwrap();
        assert!(config.configure(|_| Ok(())).is_err());
    }
}
