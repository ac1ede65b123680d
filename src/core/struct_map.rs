//! The nested, struct-accessible map at the heart of the crate.

use crate::core::{Key, Value};
use crate::error::{ConfigError, Result};
use indexmap::IndexMap;
use serde::de::{Deserialize, Deserializer, Error as _};
use serde::ser::{Error as _, Serialize, SerializeMap, Serializer};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type Entries = IndexMap<Key, Value>;

/// An ordered map with normalized keys, nested maps and deferred values.
///
/// `StructMap` is a handle: cloning it yields another reference to the same
/// storage, which is how a nested map read from its parent stays live. Use
/// [`StructMap::deep_copy`] for an independent tree.
///
/// # Examples
///
/// ```rust
/// use nestconf::prelude::*;
/// use serde_json::json;
///
/// let map = StructMap::from_json(json!({
///     "project": "nestconf",
///     "github": { "url": "http://example.com/nestconf", "default branch": "main" }
/// })).unwrap();
///
/// assert_eq!(map.lookup("github.default_branch").unwrap(), Some(Value::from("main")));
///
/// // Nested maps are live references into the parent.
/// let github = map.attr("github").unwrap().unwrap();
/// github.as_map().unwrap().set("branch", "dev");
/// assert!(map.has("github.branch").unwrap());
/// ```
#[derive(Clone, Default)]
pub struct StructMap {
    inner: Rc<RefCell<Entries>>,
}

impl StructMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    fn from_entries(entries: Entries) -> Self {
        Self {
            inner: Rc::new(RefCell::new(entries)),
        }
    }

    /// Build a map from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `json` is not an object.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        match Value::from(json) {
            Value::Map(map) => Ok(map),
            other => Err(ConfigError::InvalidArgument(format!(
                "expected a mapping, got {}",
                other.kind()
            ))),
        }
    }

    /// Whether two handles refer to the same storage.
    pub fn ptr_eq(a: &StructMap, b: &StructMap) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    /// Read a key, evaluating deferred values.
    ///
    /// Returns `Ok(None)` when the key is absent. A deferred value is evaluated
    /// against this map on every read and the stored computation is left in place.
    ///
    /// # Errors
    ///
    /// Propagates any error raised by a deferred computation.
    pub fn get(&self, key: impl Into<Key>) -> Result<Option<Value>> {
        let stored = self.get_raw(key);
        match stored {
            Some(Value::Deferred(deferred)) => deferred.evaluate(self).map(Some),
            other => Ok(other),
        }
    }

    /// Read a key without evaluating deferred values.
    pub fn get_raw(&self, key: impl Into<Key>) -> Option<Value> {
        self.inner.borrow().get(&key.into()).cloned()
    }

    /// Write a key.
    ///
    /// When both the stored value and `value` are maps, the stored map's contents
    /// are replaced in place so existing handles to it observe the change.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        let existing = match self.inner.borrow().get(&key) {
            Some(Value::Map(map)) => Some(map.clone()),
            _ => None,
        };
        match (existing, value) {
            (Some(existing), Value::Map(incoming)) => existing.replace(&incoming),
            (_, value) => {
                self.inner.borrow_mut().insert(key, value);
            }
        }
    }

    /// Replace this map's contents with `other`'s entries, keeping identity.
    pub fn replace(&self, other: &StructMap) {
        if Self::ptr_eq(self, other) {
            return;
        }
        let entries = other.entries();
        let mut inner = self.inner.borrow_mut();
        inner.clear();
        inner.extend(entries);
    }

    /// Remove a key, returning its stored value.
    pub fn remove(&self, key: impl Into<Key>) -> Option<Value> {
        self.inner.borrow_mut().shift_remove(&key.into())
    }

    /// Remove every key.
    pub fn clear(&self) {
        self.inner.borrow_mut().clear();
    }

    /// Whether the key is present (even if it holds null).
    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        self.inner.borrow().contains_key(&key.into())
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Whether the map has no keys.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<Key> {
        self.inner.borrow().keys().cloned().collect()
    }

    /// Every value in key order, with deferred values evaluated.
    pub fn values(&self) -> Result<Vec<Value>> {
        self.keys()
            .into_iter()
            .map(|key| Ok(self.get(key)?.unwrap_or_default()))
            .collect()
    }

    /// Snapshot of the stored entries, without evaluation.
    pub fn entries(&self) -> Vec<(Key, Value)> {
        self.inner
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Recursively copy the whole tree.
    pub fn deep_copy(&self) -> StructMap {
        let entries = self
            .inner
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.deep_copy()))
            .collect();
        Self::from_entries(entries)
    }

    /// Return a deep copy of this map with `other` deep-merged into it.
    pub fn deep_merge(&self, other: &StructMap) -> StructMap {
        let merged = self.deep_copy();
        merged.deep_merge_in_place(other);
        merged
    }

    /// Deep-merge `other` into this map.
    ///
    /// Keys are visited in `other`'s order. Maps present on both sides merge
    /// recursively; absent keys are inserted; differing values are overwritten;
    /// equal values are left untouched. Inserted values are deep copies, so the
    /// result never aliases `other`.
    pub fn deep_merge_in_place(&self, other: &StructMap) {
        for (key, incoming) in other.entries() {
            let current = self.get_raw(&key);
            match (current, incoming) {
                (Some(Value::Map(target)), Value::Map(source)) => {
                    if !Self::ptr_eq(&target, &source) {
                        target.deep_merge_in_place(&source);
                    }
                }
                (Some(current), incoming) if current == incoming => {}
                (_, incoming) => {
                    tracing::trace!(key = %key, "deep merge overwrote value");
                    self.inner.borrow_mut().insert(key, incoming.deep_copy());
                }
            }
        }
    }

    /// Whether a dotted path resolves to a present key.
    ///
    /// # Errors
    ///
    /// Propagates errors from deferred values met along the path.
    pub fn has(&self, path: &str) -> Result<bool> {
        Ok(self.lookup(path)?.is_some())
    }

    /// Walk a dotted path such as `"github.url"`.
    ///
    /// Returns `Ok(None)` as soon as a segment is absent or the current value is
    /// not a map. A present key holding null yields `Ok(Some(Value::Null))`.
    ///
    /// # Errors
    ///
    /// Propagates errors from deferred values met along the path.
    pub fn lookup(&self, path: &str) -> Result<Option<Value>> {
        let mut current = Value::Map(self.clone());
        for segment in path.split('.') {
            let Value::Map(map) = current else {
                return Ok(None);
            };
            current = match map.get(segment)? {
                Some(value) => value,
                None => return Ok(None),
            };
        }
        Ok(Some(current))
    }

    /// Walk a dotted path, returning `fallback` when it does not resolve.
    ///
    /// # Errors
    ///
    /// Propagates errors from deferred values met along the path.
    pub fn lookup_or(&self, path: &str, fallback: impl Into<Value>) -> Result<Value> {
        Ok(self.lookup(path)?.unwrap_or_else(|| fallback.into()))
    }

    /// Debug rendering that never evaluates deferred values.
    pub fn inspect(&self) -> String {
        format!("{self:?}")
    }

    /// Render the evaluated tree as JSON.
    ///
    /// # Errors
    ///
    /// Fails if a deferred value fails or yields an unserializable value.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::Other(e.to_string()))
    }

    pub(crate) fn with_entry<T>(
        &self,
        key: Key,
        f: impl FnOnce(indexmap::map::Entry<'_, Key, Value>) -> T,
    ) -> T {
        f(self.inner.borrow_mut().entry(key))
    }
}

impl PartialEq for StructMap {
    fn eq(&self, other: &Self) -> bool {
        if Self::ptr_eq(self, other) {
            return true;
        }
        let left = self.inner.borrow();
        let right = other.inner.borrow();
        left.len() == right.len()
            && left
                .iter()
                .all(|(key, value)| right.get(key).is_some_and(|other| other == value))
    }
}

impl fmt::Debug for StructMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.inner.borrow().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value:?}")?;
        }
        f.write_str("}")
    }
}

impl<K, V> FromIterator<(K, V)> for StructMap
where
    K: Into<Key>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = StructMap::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Extend<(K, V)> for StructMap
where
    K: Into<Key>,
    V: Into<Value>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl TryFrom<serde_json::Value> for StructMap {
    type Error = ConfigError;

    fn try_from(json: serde_json::Value) -> Result<Self> {
        StructMap::from_json(json)
    }
}

impl Serialize for StructMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let keys = self.keys();
        let mut map = serializer.serialize_map(Some(keys.len()))?;
        for key in keys {
            let value = self.get(&key).map_err(S::Error::custom)?.unwrap_or_default();
            map.serialize_entry(key.as_str(), &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StructMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Map(map) => Ok(map),
            other => Err(D::Error::custom(format!(
                "expected a mapping, got {}",
                other.kind()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Deferred;
    use serde_json::json;

    fn sample() -> StructMap {
        StructMap::from_json(json!({
            "project": "nestconf",
            "github": {
                "url": "http://www.github.com/example/nestconf",
                "default_branch": "master"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_empty() {
        let map = StructMap::new();
        assert!(map.is_empty());
        assert_eq!(map, StructMap::from_json(json!({})).unwrap());
    }

    #[test]
    fn test_normalized_keys_address_same_slot() {
        let map = StructMap::from_json(json!({
            "Project": "nestconf",
            "github": {
                "url": "http://www.github.com/example/nestconf",
                "default branch": "master"
            }
        }))
        .unwrap();
        assert_eq!(map, sample());

        let github = map.get("github").unwrap().unwrap();
        let github = github.as_map().unwrap();
        assert_eq!(github.get("default_branch").unwrap(), Some(Value::from("master")));
        assert_eq!(github.get("Default Branch").unwrap(), Some(Value::from("master")));
    }

    #[test]
    fn test_nested_read_is_live() {
        let map = sample();
        let github = map.get("github").unwrap().unwrap();
        github.as_map().unwrap().set("foo", "bar");
        assert_eq!(map.lookup("github.foo").unwrap(), Some(Value::from("bar")));
    }

    #[test]
    fn test_set_map_replaces_in_place() {
        let map = sample();
        let held = map.get("github").unwrap().unwrap().as_map().unwrap().clone();

        map.set(
            "github",
            StructMap::from_json(json!({
                "url": "http://www.github.com/somefork/other",
                "branch": "pre-1.0"
            }))
            .unwrap(),
        );

        assert!(!held.contains_key("default_branch"));
        assert_eq!(held.get("branch").unwrap(), Some(Value::from("pre-1.0")));
        let current = map.get("github").unwrap().unwrap();
        assert!(StructMap::ptr_eq(current.as_map().unwrap(), &held));
    }

    #[test]
    fn test_set_scalar_over_map_rebinds() {
        let map = sample();
        map.set("github", "none");
        assert_eq!(map.get("github").unwrap(), Some(Value::from("none")));
    }

    #[test]
    fn test_deep_copy_isolation() {
        let map = sample();
        let copy = map.deep_copy();
        assert_eq!(map, copy);

        copy.lookup("github").unwrap().unwrap().as_map().unwrap().set("url", "changed");
        assert_eq!(
            map.lookup("github.url").unwrap(),
            Some(Value::from("http://www.github.com/example/nestconf"))
        );

        map.set("project", "other");
        assert_eq!(copy.get("project").unwrap(), Some(Value::from("nestconf")));
    }

    #[test]
    fn test_deep_merge_is_non_mutating() {
        let map = sample();
        let merged = map.deep_merge(
            &StructMap::from_json(json!({
                "new_foo": "bar",
                "github": { "default_branch": "develop" }
            }))
            .unwrap(),
        );

        assert_eq!(map, sample());
        assert_eq!(
            merged,
            StructMap::from_json(json!({
                "new_foo": "bar",
                "project": "nestconf",
                "github": {
                    "url": "http://www.github.com/example/nestconf",
                    "default_branch": "develop"
                }
            }))
            .unwrap()
        );
    }

    #[test]
    fn test_deep_merge_in_place_keeps_submap_identity() {
        let map = sample();
        let github = map.get_raw("github").unwrap();
        map.deep_merge_in_place(
            &StructMap::from_json(json!({ "github": { "default_branch": "develop" } })).unwrap(),
        );
        assert_eq!(
            github.as_map().unwrap().get("default_branch").unwrap(),
            Some(Value::from("develop"))
        );
        assert_eq!(
            github.as_map().unwrap().get("url").unwrap(),
            Some(Value::from("http://www.github.com/example/nestconf"))
        );
    }

    #[test]
    fn test_deep_merge_does_not_alias_source() {
        let map = StructMap::new();
        let source = StructMap::from_json(json!({ "db": { "host": "a" } })).unwrap();
        map.deep_merge_in_place(&source);
        source.lookup("db").unwrap().unwrap().as_map().unwrap().set("host", "b");
        assert_eq!(map.lookup("db.host").unwrap(), Some(Value::from("a")));
    }

    #[test]
    fn test_has_and_lookup() {
        let map = sample();
        assert!(map.has("github.url").unwrap());
        assert!(!map.has("github.foo.bar.baz").unwrap());
        assert!(!map.has("project.length").unwrap());

        assert_eq!(
            map.lookup_or("github.foo.bar.baz", "default").unwrap(),
            Value::from("default")
        );
        assert_eq!(map.lookup("github.foo.bar.baz").unwrap(), None);

        map.lookup("github").unwrap().unwrap().as_map().unwrap().set("quux", Value::Null);
        assert_eq!(map.lookup_or("github.quux", "default").unwrap(), Value::Null);
    }

    #[test]
    fn test_deferred_evaluates_on_every_read() {
        let map = sample();
        let github = map.get_raw("github").unwrap().as_map().unwrap().clone();
        github.set(
            "reverse_url",
            Deferred::new(|c: &StructMap| {
                c.get("url")
                    .ok()
                    .flatten()
                    .and_then(|v| v.as_str().map(|s| s.chars().rev().collect::<String>()))
            }),
        );

        assert_eq!(
            github.get("reverse_url").unwrap(),
            Some(Value::from("fnoctsen/elpmaxe/moc.buhtig.www//:ptth"))
        );
        github.set("url", "abc");
        assert_eq!(github.get("reverse_url").unwrap(), Some(Value::from("cba")));
        assert!(matches!(github.get_raw("reverse_url"), Some(Value::Deferred(_))));
    }

    #[test]
    fn test_deferred_receives_owner() {
        let map = StructMap::new();
        map.set("introspective", Deferred::new(|c: &StructMap| c.clone()));
        let result = map.get("introspective").unwrap().unwrap();
        assert!(StructMap::ptr_eq(result.as_map().unwrap(), &map));
    }

    #[test]
    fn test_values_evaluate_deferreds() {
        let map = StructMap::new();
        map.set("a", 1);
        map.set("b", Deferred::new(|c: &StructMap| {
            c.get("a").ok().flatten().and_then(|v| v.as_i64()).map(|n| n + 1)
        }));
        assert_eq!(map.values().unwrap(), vec![Value::Integer(1), Value::Integer(2)]);
    }

    #[test]
    fn test_inspect_does_not_evaluate() {
        let map = StructMap::new();
        map.set("name", "x");
        map.set(
            "boom",
            Deferred::try_new(|_| Err(ConfigError::other("not configured yet"))),
        );
        assert_eq!(map.inspect(), r#"{name: "x", boom: (deferred)}"#);
        assert!(map.get("boom").is_err());
    }

    #[test]
    fn test_to_json_evaluates() {
        let map = sample();
        map.set("n", Deferred::new(|_: &StructMap| 3));
        let json = map.to_json().unwrap();
        assert_eq!(json["n"], json!(3));
        assert_eq!(json["github"]["default_branch"], json!("master"));
    }

    #[test]
    fn test_to_json_fails_on_failing_deferred() {
        let map = sample();
        map.set(
            "token",
            Deferred::try_new(|_| Err(ConfigError::other("token not configured"))),
        );
        let err = map.to_json().unwrap_err();
        assert!(matches!(err, ConfigError::Other(ref msg) if msg.contains("token not configured")));
    }

    #[test]
    fn test_deferred_inside_array_is_inert() {
        let map = StructMap::new();
        map.append("hooks", [Deferred::new(|_: &StructMap| 1)]).unwrap();

        let hooks = map.get("hooks").unwrap().unwrap();
        assert!(matches!(hooks.as_array().unwrap()[0], Value::Deferred(_)));
        assert!(map.to_json().is_err());
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = StructMap::from_json(json!([1, 2])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidArgument(_)));
    }

    #[test]
    fn test_key_order_preserved() {
        let map: StructMap = [("b", 1), ("a", 2), ("c", 3)].into_iter().collect();
        map.remove("a");
        let keys: Vec<_> = map.keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["b", "c"]);
    }
}
