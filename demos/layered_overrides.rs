//! Example demonstrating layered overrides with push/pop and deferred values.
//!
//! This example shows how to:
//! - Build a store from defaults
//! - Derive a value from its siblings with a deferred computation
//! - Layer a temporary override and restore the previous state
//!
//! Run with: cargo run --example layered_overrides

use nestconf::prelude::*;
use serde_json::json;

fn main() -> Result<()> {
    println!("=== Layered Overrides Example ===\n");

    let mut config = Configuration::builder()
        .with_defaults(StructMap::from_json(json!({
            "project": "nestconf",
            "server": { "host": "localhost", "port": 8080 }
        }))?)
        .after_config(|c: &StructMap| -> std::result::Result<(), ValidationError> {
            match c.lookup("server.port") {
                Ok(Some(Value::Integer(port))) if port < 1024 => Err(
                    ValidationError::invalid_field("server.port", "must be >= 1024"),
                ),
                _ => Ok(()),
            }
        })
        .build()?;

    // Recomputed on every read, so it follows later overrides
    config.configure(|c| {
        c.attr_with("server", |s| {
            s.set_attr(
                "address",
                Deferred::new(|s: &StructMap| {
                    let host = s.get("host").ok().flatten();
                    let port = s.get("port").ok().flatten();
                    match (host, port) {
                        (Some(Value::String(host)), Some(Value::Integer(port))) => {
                            Some(format!("{host}:{port}"))
                        }
                        _ => None,
                    }
                }),
            )
        })?;
        Ok(())
    })?;

    println!("Defaults:");
    print_config(&config)?;

    println!("--- Push: staging override ---");
    config.push_with(&StructMap::from_json(json!({
        "server": { "host": "staging.internal", "port": 9090 }
    }))?)?;
    print_config(&config)?;
    println!("  Stash depth: {}\n", config.stash_depth());

    println!("--- Rejected override (privileged port) ---");
    config.push();
    match config.configure_with(&StructMap::from_json(json!({ "server": { "port": 80 } }))?) {
        Ok(_) => println!("  unexpectedly accepted"),
        Err(e) => println!("  {e}"),
    }
    config.pop()?;
    print_config(&config)?;

    println!("--- Pop: back to defaults ---");
    config.pop()?;
    print_config(&config)?;
    println!("  Stash depth: {}", config.stash_depth());

    Ok(())
}

fn print_config(config: &Configuration) -> Result<()> {
    println!("  project: {:?}", config.attr("project")?);
    println!("  server.address: {:?}", config.lookup("server.address")?);
    println!("  raw: {}\n", config.inspect());
    Ok(())
}
