//! Core configuration types.

mod access;
mod builder;
mod configuration;
mod deferred;
mod hook;
mod key;
mod loader;
mod struct_map;
mod template;
mod value;

pub use builder::ConfigurationBuilder;
pub use configuration::Configuration;
pub use deferred::{Deferred, deferred};
pub use hook::AfterConfig;
pub use key::{Key, RESERVED_NAMES};
pub use loader::ConfigLoader;
pub use struct_map::StructMap;
pub use template::ConfigTemplate;
pub use value::{Opaque, OpaqueValue, Value};
