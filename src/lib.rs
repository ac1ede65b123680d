//! # nestconf
//!
//! A nested, mutable configuration store with struct-style access, deferred
//! values, deep merge and push/pop snapshots.
//!
//! ## Overview
//!
//! `nestconf` is built from two layers:
//! - [`StructMap`](core::StructMap): an ordered map with normalized keys where
//!   every nested mapping is itself a `StructMap`, deferred values compute on
//!   read, and attribute-style access guards against reserved names
//! - [`Configuration`](core::Configuration): a `StructMap` that captures its
//!   defaults, merges repeated `configure` calls, runs an after-config hook,
//!   and can `push`/`pop` whole-state snapshots
//!
//! ## Quick Start
//!
//! ```rust
//! use nestconf::prelude::*;
//! use serde_json::json;
//!
//! # fn example() -> nestconf::error::Result<()> {
//! let mut config = Configuration::with_defaults(StructMap::from_json(json!({
//!     "project": "nestconf",
//!     "github": { "url": "http://x/nestconf", "branch": "master" }
//! }))?);
//!
//! // Deep merge keeps `github.branch`
//! config.configure_with(&StructMap::from_json(json!({
//!     "project": "other",
//!     "github": { "url": "http://x/other" }
//! }))?)?;
//! assert_eq!(config.lookup("github.branch")?, Some(Value::from("master")));
//!
//! // Struct-style mutation and deferred values
//! config.configure(|c| {
//!     c.attr_with("github", |g| {
//!         g.set_attr("clone_url", Deferred::new(|g: &StructMap| {
//!             g.get("url").ok().flatten().and_then(|u| u.as_str().map(|u| format!("{u}.git")))
//!         }))
//!     })?;
//!     Ok(())
//! })?;
//! assert_eq!(config.lookup("github.clone_url")?, Some(Value::from("http://x/other.git")));
//!
//! // Temporary override
//! config.push_with(&StructMap::from_json(json!({ "project": "temp" }))?)?;
//! config.pop()?;
//! assert_eq!(config.get("project")?, Some(Value::from("other")));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Mapping Sources
//!
//! The crate does not read files or the environment itself. Implement
//! [`ConfigSource`](sources::ConfigSource) for whatever an application loads
//! settings from and hand it to the builder or to
//! [`Configuration::configure_from`](core::Configuration::configure_from).
//!
//! The store is single-threaded. Wrap it in your own lock if several threads
//! must reach the same instance.

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod i18n;
pub mod sources;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{
        AfterConfig, ConfigTemplate, Configuration, ConfigurationBuilder, Deferred, Key, Opaque,
        StructMap, Value, deferred,
    };
    pub use crate::error::{ConfigError, Result, ValidationError};
    pub use crate::sources::ConfigSource;
}
