//! Values computed at read time.

use crate::core::{StructMap, Value};
use crate::error::Result;
use std::fmt;
use std::rc::Rc;

type Computation = dyn Fn(&StructMap) -> Result<Value>;

/// A computation run every time its key is read.
///
/// The computation receives the map that holds it, so it can refer to sibling
/// keys. Results are never cached: changing a sibling between two reads changes
/// what the second read returns.
///
/// Only a `Deferred` held directly by a map is evaluated. One stored inside an
/// array is returned as is by reads and rejected by serialization.
///
/// Copies of a `Deferred` share the same computation. Equality is identity.
///
/// # Examples
///
/// ```rust
/// use nestconf::prelude::*;
///
/// let github = StructMap::new();
/// github.set("url", "http://example.com/repo");
/// github.set("upcase_url", Deferred::new(|c: &StructMap| {
///     c.get("url").ok().flatten().and_then(|v| v.as_str().map(str::to_uppercase))
/// }));
///
/// assert_eq!(
///     github.get("upcase_url").unwrap(),
///     Some(Value::from("HTTP://EXAMPLE.COM/REPO"))
/// );
/// ```
#[derive(Clone)]
pub struct Deferred(Rc<Computation>);

impl Deferred {
    /// Wrap an infallible computation.
    pub fn new<F, V>(compute: F) -> Self
    where
        F: Fn(&StructMap) -> V + 'static,
        V: Into<Value>,
    {
        Self(Rc::new(move |owner: &StructMap| Ok(compute(owner).into())))
    }

    /// Wrap a computation that may fail.
    pub fn try_new<F>(compute: F) -> Self
    where
        F: Fn(&StructMap) -> Result<Value> + 'static,
    {
        Self(Rc::new(compute))
    }

    /// Run the computation against its owning map.
    pub fn evaluate(&self, owner: &StructMap) -> Result<Value> {
        tracing::trace!("evaluating deferred value");
        (self.0)(owner)
    }
}

/// Shorthand for [`Deferred::new`].
pub fn deferred<F, V>(compute: F) -> Deferred
where
    F: Fn(&StructMap) -> V + 'static,
    V: Into<Value>,
{
    Deferred::new(compute)
}

impl PartialEq for Deferred {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(deferred)")
    }
}
