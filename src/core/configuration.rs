//! The configuration store: defaults, repeatable configuration and a snapshot stash.

use crate::core::{AfterConfig, ConfigurationBuilder, StructMap};
use crate::error::{ConfigError, Result};
use crate::sources::ConfigSource;
use std::fmt;
use std::ops::Deref;

/// A [`StructMap`] that remembers its defaults and can stash and restore state.
///
/// The store dereferences to its live map, so every `StructMap` operation is
/// available directly on it.
///
/// # Examples
///
/// ```rust
/// use nestconf::prelude::*;
/// use serde_json::json;
///
/// # fn example() -> nestconf::error::Result<()> {
/// let mut config = Configuration::with_defaults(StructMap::from_json(json!({
///     "project": "nestconf",
///     "github": { "url": "http://x/nestconf", "branch": "master" }
/// }))?);
///
/// config.configure_with(&StructMap::from_json(json!({
///     "github": { "url": "http://x/other" }
/// }))?)?;
/// assert_eq!(config.lookup("github.branch")?, Some(Value::from("master")));
///
/// config.push_with(&StructMap::from_json(json!({ "project": "temp" }))?)?;
/// assert_eq!(config.get("project")?, Some(Value::from("temp")));
/// config.pop()?;
/// assert_eq!(config.get("project")?, Some(Value::from("nestconf")));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct Configuration {
    /// The live content
    data: StructMap,
    /// Baseline captured at construction; never handed out by reference
    default_values: StructMap,
    /// Snapshots saved by `push`, most recent last
    stash: Vec<StructMap>,
    /// Optional post-configuration hook
    hook: Option<Box<dyn AfterConfig>>,
}

impl Configuration {
    /// Create a store with empty defaults.
    pub fn new() -> Self {
        Self::with_defaults(StructMap::new())
    }

    /// Create a store whose defaults are a deep copy of `defaults`.
    pub fn with_defaults(defaults: StructMap) -> Self {
        Self::from_parts(defaults, None)
    }

    /// Create a store whose defaults are built by `block`.
    ///
    /// # Errors
    ///
    /// Returns whatever `block` returns.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nestconf::prelude::*;
    ///
    /// let config = Configuration::from_fn(|d| {
    ///     d.set_attr("project", "nestconf")?;
    ///     d.attr_with("github", |g| g.set_attr("branch", "master"))?;
    ///     Ok(())
    /// }).unwrap();
    ///
    /// assert_eq!(config.lookup("github.branch").unwrap(), Some(Value::from("master")));
    /// ```
    pub fn from_fn<F>(block: F) -> Result<Self>
    where
        F: FnOnce(&StructMap) -> Result<()>,
    {
        let defaults = StructMap::new();
        block(&defaults)?;
        Ok(Self::with_defaults(defaults))
    }

    /// Create a builder for constructing a store.
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    pub(crate) fn from_parts(defaults: StructMap, hook: Option<Box<dyn AfterConfig>>) -> Self {
        let mut config = Self {
            data: StructMap::new(),
            default_values: defaults.deep_copy(),
            stash: Vec::new(),
            hook,
        };
        config.reset_defaults();
        tracing::debug!(keys = config.data.len(), "configuration defaults captured");
        config
    }

    /// The live content. Handles obtained here stay valid across `pop` and
    /// `reset_defaults`.
    pub fn data(&self) -> &StructMap {
        &self.data
    }

    /// A deep copy of the defaults captured at construction.
    pub fn default_values(&self) -> StructMap {
        self.default_values.deep_copy()
    }

    /// Number of snapshots on the stash.
    pub fn stash_depth(&self) -> usize {
        self.stash.len()
    }

    /// Install the hook run after `configure` and `pop`, replacing any previous one.
    pub fn set_after_config(&mut self, hook: impl AfterConfig + 'static) {
        self.hook = Some(Box::new(hook));
    }

    fn after_config(&self) -> Result<()> {
        if let Some(hook) = &self.hook {
            hook.after_config(&self.data).map_err(ConfigError::from)?;
        }
        Ok(())
    }

    /// Deep-merge `source` into the live content, then run the after-config hook.
    ///
    /// # Errors
    ///
    /// Returns an error if the after-config hook rejects the result. The merge
    /// is not undone.
    pub fn configure_with(&mut self, source: &StructMap) -> Result<&mut Self> {
        tracing::debug!(keys = source.len(), "configuring from mapping");
        self.data.deep_merge_in_place(source);
        self.after_config()?;
        Ok(self)
    }

    /// Mutate the live content with `block`, then run the after-config hook.
    ///
    /// # Errors
    ///
    /// Returns whatever `block` returns (the hook is skipped), or the hook's error.
    pub fn configure<F>(&mut self, block: F) -> Result<&mut Self>
    where
        F: FnOnce(&StructMap) -> Result<()>,
    {
        tracing::debug!("configuring from block");
        block(&self.data)?;
        self.after_config()?;
        Ok(self)
    }

    /// Deep-merge `source`, apply `block`, then run the after-config hook once.
    ///
    /// The hook only sees the combined result, never the state between the
    /// merge and the block.
    ///
    /// # Errors
    ///
    /// Returns whatever `block` returns (the hook is skipped), or the hook's error.
    pub fn configure_merging<F>(&mut self, source: &StructMap, block: F) -> Result<&mut Self>
    where
        F: FnOnce(&StructMap) -> Result<()>,
    {
        tracing::debug!(keys = source.len(), "configuring from mapping and block");
        self.data.deep_merge_in_place(source);
        block(&self.data)?;
        self.after_config()?;
        Ok(self)
    }

    /// Load `source` and deep-merge it into the live content.
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails to load or the hook rejects the result.
    pub fn configure_from(&mut self, source: &dyn ConfigSource) -> Result<&mut Self> {
        let values = source.load().map_err(|e| {
            ConfigError::LoadError(format!("Failed to load source '{}': {}", source.name(), e))
        })?;
        tracing::debug!(source = %source.name(), "configuring from source");
        self.configure_with(&values)
    }

    /// Save a deep copy of the live content on the stash.
    pub fn push(&mut self) -> &mut Self {
        self.stash.push(self.data.deep_copy());
        tracing::debug!(depth = self.stash.len(), "configuration pushed");
        self
    }

    /// Save the live content, then [`configure_with`](Self::configure_with) `source`.
    ///
    /// # Errors
    ///
    /// As `configure_with`. The snapshot stays on the stash.
    pub fn push_with(&mut self, source: &StructMap) -> Result<&mut Self> {
        self.push().configure_with(source)
    }

    /// Save the live content, then [`configure`](Self::configure) with `block`.
    ///
    /// # Errors
    ///
    /// As `configure`. The snapshot stays on the stash.
    pub fn push_configure<F>(&mut self, block: F) -> Result<&mut Self>
    where
        F: FnOnce(&StructMap) -> Result<()>,
    {
        self.push().configure(block)
    }

    /// Save the live content, then [`configure_merging`](Self::configure_merging)
    /// with `source` and `block`.
    ///
    /// # Errors
    ///
    /// As `configure_merging`. The snapshot stays on the stash.
    pub fn push_merging<F>(&mut self, source: &StructMap, block: F) -> Result<&mut Self>
    where
        F: FnOnce(&StructMap) -> Result<()>,
    {
        self.push().configure_merging(source, block)
    }

    /// Restore the most recently pushed snapshot, then run the after-config hook.
    ///
    /// # Errors
    ///
    /// `EmptyStash` if nothing was pushed (the store is left untouched), or the
    /// hook's error after the restore.
    pub fn pop(&mut self) -> Result<&mut Self> {
        let snapshot = self.stash.pop().ok_or(ConfigError::EmptyStash)?;
        self.data.clear();
        self.data.deep_merge_in_place(&snapshot);
        tracing::debug!(depth = self.stash.len(), "configuration popped");
        self.after_config()?;
        Ok(self)
    }

    /// Replace the live content with a fresh copy of the defaults and drop
    /// every stashed snapshot.
    pub fn reset_defaults(&mut self) -> &mut Self {
        self.data.replace(&self.default_values.deep_copy());
        self.stash.clear();
        tracing::debug!("configuration reset to defaults");
        self
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Configuration {
    type Target = StructMap;

    fn deref(&self) -> &StructMap {
        &self.data
    }
}

impl PartialEq<StructMap> for Configuration {
    fn eq(&self, other: &StructMap) -> bool {
        &self.data == other
    }
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.data, f)
    }
}
