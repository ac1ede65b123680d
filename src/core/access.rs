//! Struct-style access layered over [`StructMap`].
//!
//! These methods mirror attribute syntax (`config.github.url = ...`) with
//! explicit calls. Unlike the plain [`StructMap::get`]/[`StructMap::set`] pair,
//! they refuse names reserved for the container's own operations.

use crate::core::{Key, StructMap, Value};
use crate::error::{ConfigError, Result};
use indexmap::map::Entry;

impl StructMap {
    fn struct_key(name: &str) -> Result<Key> {
        let key = Key::new(name);
        if key.is_reserved() {
            return Err(ConfigError::ReservedKey(key.to_string()));
        }
        Ok(key)
    }

    /// Read an attribute. Equivalent to [`StructMap::get`] for non-reserved names.
    ///
    /// # Errors
    ///
    /// `ReservedKey` for reserved names; otherwise errors from deferred values.
    pub fn attr(&self, name: &str) -> Result<Option<Value>> {
        self.get(Self::struct_key(name)?)
    }

    /// Write an attribute. Equivalent to [`StructMap::set`] for non-reserved names.
    ///
    /// # Errors
    ///
    /// `ReservedKey` for reserved names. The map is left unchanged.
    pub fn set_attr(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.set(Self::struct_key(name)?, value);
        Ok(())
    }

    /// Open a nested map and run `block` against it.
    ///
    /// An absent or null key is first filled with an empty map. Returns the
    /// nested map handle.
    ///
    /// # Errors
    ///
    /// `ReservedKey` for reserved names, `TypeMismatch` if the key holds a
    /// non-map value, or whatever `block` returns.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nestconf::prelude::*;
    ///
    /// let config = StructMap::new();
    /// config.attr_with("baz", |baz| baz.set_attr("quux", "default_for_quux")).unwrap();
    /// assert_eq!(config.lookup("baz.quux").unwrap(), Some(Value::from("default_for_quux")));
    /// ```
    pub fn attr_with<F>(&self, name: &str, block: F) -> Result<StructMap>
    where
        F: FnOnce(&StructMap) -> Result<()>,
    {
        let key = Self::struct_key(name)?;
        let target = match self.get(&key)? {
            Some(Value::Map(map)) => map,
            None | Some(Value::Null) => {
                let map = StructMap::new();
                self.set(key, map.clone());
                map
            }
            Some(other) => {
                return Err(ConfigError::TypeMismatch {
                    key: key.to_string(),
                    expected: "map",
                    found: other.kind(),
                });
            }
        };
        block(&target)?;
        Ok(target)
    }

    /// Append values to the sequence under `name`, creating it if absent.
    ///
    /// Appended [`Deferred`](crate::core::Deferred) values are stored as is and
    /// never evaluated by reads of the sequence.
    ///
    /// # Errors
    ///
    /// `ReservedKey` for reserved names, or `TypeMismatch` if the key holds
    /// something other than a sequence.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nestconf::prelude::*;
    ///
    /// let github = StructMap::new();
    /// github.append("roles", ["owner", "maintainer"]).unwrap();
    /// github.append("roles", ["guest"]).unwrap();
    /// assert_eq!(github.get("roles").unwrap().unwrap().as_array().unwrap().len(), 3);
    /// ```
    pub fn append<I>(&self, name: &str, items: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let key = Self::struct_key(name)?;
        // Items may read this map, so drain them before the entry is borrowed.
        let items: Vec<Value> = items.into_iter().map(Into::into).collect();
        self.with_entry(key, |entry| match entry {
            Entry::Vacant(slot) => {
                slot.insert(Value::Array(items));
                Ok(())
            }
            Entry::Occupied(mut slot) => {
                if slot.get().is_null() {
                    slot.insert(Value::Array(Vec::new()));
                }
                match slot.get_mut() {
                    Value::Array(existing) => {
                        existing.extend(items);
                        Ok(())
                    }
                    other => {
                        let found = other.kind();
                        Err(ConfigError::TypeMismatch {
                            key: slot.key().to_string(),
                            expected: "array",
                            found,
                        })
                    }
                }
            }
        })
    }

    /// Build a new map with `block` and append it to the sequence under `name`.
    ///
    /// # Errors
    ///
    /// As [`StructMap::append`], plus whatever `block` returns. The sequence is
    /// type-checked before `block` runs.
    pub fn append_with<F>(&self, name: &str, block: F) -> Result<()>
    where
        F: FnOnce(&StructMap) -> Result<()>,
    {
        self.append(name, std::iter::empty::<Value>())?;
        let item = StructMap::new();
        block(&item)?;
        self.append(name, [item])
    }

    /// Dispatch a struct-style call by name.
    ///
    /// | form          | arguments | effect                    |
    /// |---------------|-----------|---------------------------|
    /// | `name`        | 0         | [`StructMap::attr`]       |
    /// | `name`        | 1         | [`StructMap::set_attr`]   |
    /// | `name=`       | 1         | [`StructMap::set_attr`]   |
    /// | `add_name!`   | 1 or more | [`StructMap::append`]     |
    ///
    /// Writes return the written value and appends return the whole sequence.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for any other argument count, plus the errors of the
    /// dispatched operation.
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Option<Value>> {
        if let Some(field) = name.strip_prefix("add_").and_then(|n| n.strip_suffix('!')) {
            if args.is_empty() {
                return Err(ConfigError::InvalidArgument(format!(
                    "`{name}` expects at least one value"
                )));
            }
            self.append(field, args)?;
            return self.attr(field);
        }

        let (field, setter) = match name.strip_suffix('=') {
            Some(field) => (field, true),
            None => (name, false),
        };
        let mut args = args;
        match (setter, args.len()) {
            (false, 0) => self.attr(field),
            (_, 1) => {
                let value = args.remove(0);
                self.set_attr(field, value.clone())?;
                Ok(Some(value))
            }
            (_, n) => Err(ConfigError::InvalidArgument(format!(
                "wrong number of arguments for `{name}` (given {n}, expected {})",
                if setter { "1" } else { "0..=1" }
            ))),
        }
    }
}
