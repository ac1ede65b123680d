//! Integration tests for feeding stores from mapping sources.

use nestconf::prelude::*;
use serde_json::json;

/// A source parsing JSON text, standing in for whatever format an
/// application reads its settings from.
struct JsonText {
    name: &'static str,
    text: &'static str,
    priority: i32,
}

impl ConfigSource for JsonText {
    fn load(&self) -> Result<StructMap> {
        serde_json::from_str(self.text)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }

    fn name(&self) -> String {
        self.name.to_string()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

#[test]
fn test_sources_deep_merge_by_priority() {
    let config = Configuration::builder()
        .with_source(JsonText {
            name: "local",
            text: r#"{ "server": { "port": 9090 } }"#,
            priority: 200,
        })
        .with_source(JsonText {
            name: "default",
            text: r#"{
                "server": { "port": 8080, "host": "localhost" },
                "database": { "url": "postgres://localhost/db", "max connections": 10 }
            }"#,
            priority: 100,
        })
        .build()
        .unwrap();

    assert_eq!(config.lookup("server.port").unwrap(), Some(Value::Integer(9090)));
    assert_eq!(
        config.lookup("server.host").unwrap(),
        Some(Value::from("localhost"))
    );
    // Keys from sources are normalized like any other.
    assert_eq!(
        config.lookup("database.max_connections").unwrap(),
        Some(Value::Integer(10))
    );
    assert_eq!(config.default_values(), config.deep_copy());
}

#[test]
fn test_configure_from_source_keeps_defaults() {
    let mut config = Configuration::with_defaults(
        StructMap::from_json(json!({
            "features": { "enable_metrics": false, "enable_caching": false }
        }))
        .unwrap(),
    );
    config
        .configure_from(&JsonText {
            name: "local",
            text: r#"{ "features": { "enable_caching": true } }"#,
            priority: 100,
        })
        .unwrap();

    assert_eq!(
        config.lookup("features.enable_caching").unwrap(),
        Some(Value::Bool(true))
    );
    assert_eq!(
        config.lookup("features.enable_metrics").unwrap(),
        Some(Value::Bool(false))
    );

    config.reset_defaults();
    assert_eq!(
        config.lookup("features.enable_caching").unwrap(),
        Some(Value::Bool(false))
    );
}

#[test]
fn test_broken_source_fails_build() {
    let result = Configuration::builder()
        .with_source(JsonText {
            name: "broken",
            text: "{ not json",
            priority: 100,
        })
        .build();

    match result {
        Err(ConfigError::LoadError(msg)) => assert!(msg.contains("'broken'")),
        _ => panic!("expected a load error"),
    }
}

#[test]
fn test_non_mapping_source_rejected() {
    let mut config = Configuration::new();
    let err = config
        .configure_from(&JsonText {
            name: "array",
            text: "[1, 2, 3]",
            priority: 100,
        })
        .unwrap_err();

    assert!(matches!(err, ConfigError::LoadError(_)));
    assert!(config.is_empty());
}
