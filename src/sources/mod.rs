//! Mapping sources that can seed defaults or be merged into a store.

mod config_source;

pub use config_source::ConfigSource;
