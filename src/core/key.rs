//! Canonical configuration keys.

use std::fmt;

/// Names that struct-style access refuses to treat as configuration keys,
/// because they collide with the container's own operations.
pub const RESERVED_NAMES: &[&str] = &[
    "append",
    "attr",
    "call",
    "clear",
    "configure",
    "contains_key",
    "deep_copy",
    "deep_merge",
    "default_values",
    "entries",
    "get",
    "get_raw",
    "has",
    "inspect",
    "is_empty",
    "keys",
    "len",
    "lookup",
    "pop",
    "push",
    "remove",
    "replace",
    "reset_defaults",
    "set",
    "to_json",
    "values",
];

/// A normalized key.
///
/// Leading and trailing whitespace is trimmed, inner runs of whitespace collapse
/// to a single `_`, and the result is lower-cased. `"Default Branch"`,
/// `"default_branch"` and `" default   branch "` all address the same slot.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    /// Normalize a raw key.
    pub fn new(raw: &str) -> Self {
        Self(canonicalize(raw))
    }

    /// The canonical text of this key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether struct-style access must reject this key.
    pub fn is_reserved(&self) -> bool {
        RESERVED_NAMES.contains(&self.0.as_str())
    }
}

fn canonicalize(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(raw: &str) -> Self {
        Key::new(raw)
    }
}

impl From<String> for Key {
    fn from(raw: String) -> Self {
        Key::new(&raw)
    }
}

impl From<&String> for Key {
    fn from(raw: &String) -> Self {
        Key::new(raw)
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}
