//! The value variants a [`StructMap`] can hold.

use crate::core::{Deferred, StructMap};
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Error as _, Serialize, SerializeSeq, Serializer};
use std::any::Any;
use std::fmt;

/// A configuration value.
///
/// Mapping-shaped data is always a [`StructMap`], so the whole tree stays
/// struct-accessible. Cloning a `Value::Map` clones the handle, not the tree;
/// use [`Value::deep_copy`] for an independent copy.
#[derive(Clone, Default)]
pub enum Value {
    /// Explicit absence of a value (a present key holding nil).
    #[default]
    Null,
    /// Boolean scalar
    Bool(bool),
    /// Integer scalar
    Integer(i64),
    /// Floating point scalar
    Float(f64),
    /// String scalar
    String(String),
    /// Ordered sequence
    Array(Vec<Value>),
    /// Nested map
    Map(StructMap),
    /// Computed on every read of the map entry holding it; inert inside an array
    Deferred(Deferred),
    /// Arbitrary application value carried through untouched
    Opaque(Opaque),
}

impl Value {
    /// A short name for the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Deferred(_) => "deferred",
            Value::Opaque(_) => "opaque",
        }
    }

    /// Recursively copy this value. Nested maps and opaque values are duplicated;
    /// deferred computations are shared.
    pub fn deep_copy(&self) -> Value {
        match self {
            Value::Map(map) => Value::Map(map.deep_copy()),
            Value::Array(items) => Value::Array(items.iter().map(Value::deep_copy).collect()),
            other => other.clone(),
        }
    }

    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value is mapping-shaped.
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Borrow the string, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The integer, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// The number as a float, if this is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// The boolean, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The map handle, if this is a map.
    pub fn as_map(&self) -> Option<&StructMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The sequence, if this is an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Downcast an opaque value.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Opaque(opaque) => opaque.downcast_ref(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Deferred(a), Value::Deferred(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

/// Debug output never evaluates deferred values.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n:?}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Array(items) => f.debug_list().entries(items).finish(),
            Value::Map(map) => fmt::Debug::fmt(map, f),
            Value::Deferred(d) => fmt::Debug::fmt(d, f),
            Value::Opaque(o) => fmt::Debug::fmt(o, f),
        }
    }
}

/// An application value stored as-is.
///
/// Anything `Clone + PartialEq + Debug + 'static` qualifies. Deep copies call the
/// value's own `clone`.
pub trait OpaqueValue: Any + fmt::Debug {
    /// Clone into a new box.
    fn clone_boxed(&self) -> Box<dyn OpaqueValue>;
    /// Compare with another opaque value of possibly different type.
    fn eq_opaque(&self, other: &dyn OpaqueValue) -> bool;
    /// Upcast for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T> OpaqueValue for T
where
    T: Any + fmt::Debug + Clone + PartialEq,
{
    fn clone_boxed(&self) -> Box<dyn OpaqueValue> {
        Box::new(self.clone())
    }

    fn eq_opaque(&self, other: &dyn OpaqueValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Boxed [`OpaqueValue`].
pub struct Opaque(Box<dyn OpaqueValue>);

impl Opaque {
    /// Box an application value.
    pub fn new<T: OpaqueValue>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// Downcast to the concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }
}

impl Clone for Opaque {
    fn clone(&self) -> Self {
        Self(self.0.clone_boxed())
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_opaque(other.0.as_ref())
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident $(as $cast:ty)?),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v $(as $cast)?)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i8 => Integer as i64,
    i16 => Integer as i64,
    i32 => Integer as i64,
    i64 => Integer,
    u8 => Integer as i64,
    u16 => Integer as i64,
    u32 => Integer as i64,
    f32 => Float as f64,
    f64 => Float,
    String => String,
    StructMap => Map,
    Deferred => Deferred,
    Opaque => Opaque,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<&StructMap> for Value {
    fn from(v: &StructMap) -> Self {
        Value::Map(v.clone())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(entries.into_iter().collect()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => map.serialize(serializer),
            Value::Deferred(_) => Err(S::Error::custom(
                "deferred values must be evaluated through their owning map",
            )),
            Value::Opaque(o) => serializer.collect_str(&format_args!("{o:?}")),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any configuration value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(i64::try_from(v).map_or(Value::Float(v as f64), Value::Integer))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let map = StructMap::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            map.set(key, value);
        }
        Ok(Value::Map(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq)]
    struct Timestamp(u64);

    #[test]
    fn test_json_conversion_wraps_objects() {
        let value = Value::from(json!({ "a": { "b": [1, "two", null] } }));
        let a = value.as_map().unwrap().get("a").unwrap().unwrap();
        assert!(a.is_map());
        let b = a.as_map().unwrap().get("b").unwrap().unwrap();
        assert_eq!(
            b,
            Value::Array(vec![Value::Integer(1), Value::from("two"), Value::Null])
        );
    }

    #[test]
    fn test_opaque_roundtrip() {
        let value = Value::Opaque(Opaque::new(Timestamp(42)));
        assert_eq!(value.downcast_ref::<Timestamp>(), Some(&Timestamp(42)));
        assert_eq!(value.deep_copy(), value);
        assert_ne!(value, Value::Opaque(Opaque::new(Timestamp(7))));
        assert_ne!(value, Value::Opaque(Opaque::new(42u64)));
    }

    #[test]
    fn test_deep_copy_detaches_maps() {
        let original = Value::from(json!({ "x": 1 }));
        let copy = original.deep_copy();
        copy.as_map().unwrap().set("x", 2);
        assert_eq!(
            original.as_map().unwrap().get("x").unwrap(),
            Some(Value::Integer(1))
        );
    }

    #[test]
    fn test_deserialize_from_json_text() {
        let value: Value = serde_json::from_str(r#"{"Default Branch": "main", "n": 3}"#).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.get("default_branch").unwrap(), Some(Value::from("main")));
        assert_eq!(map.get("n").unwrap(), Some(Value::Integer(3)));
    }

    #[test]
    fn test_debug_rendering() {
        assert_eq!(format!("{:?}", Value::from("x")), "\"x\"");
        assert_eq!(format!("{:?}", Value::from(vec![1, 2])), "[1, 2]");
        assert_eq!(format!("{:?}", Value::Null), "null");
    }
}
