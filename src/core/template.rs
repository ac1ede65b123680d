//! Reusable configuration shapes.

use crate::core::{Configuration, StructMap};
use crate::error::Result;
use std::rc::Rc;

type Shaper = Rc<dyn Fn(&StructMap) -> Result<()>>;

/// A reusable description of a configuration's defaults.
///
/// Define the shape once and stamp out as many independent stores as needed.
///
/// # Examples
///
/// ```rust
/// use nestconf::prelude::*;
///
/// let service = ConfigTemplate::from_fn(|d| {
///     d.attr_with("server", |s| s.set_attr("port", 8080))?;
///     Ok(())
/// });
///
/// let a = service.instantiate().unwrap();
/// let b = service.instantiate().unwrap();
/// a.lookup("server").unwrap().unwrap().as_map().unwrap().set("port", 9090);
/// assert_eq!(b.lookup("server.port").unwrap(), Some(Value::Integer(8080)));
/// ```
#[derive(Clone, Default)]
pub struct ConfigTemplate {
    defaults: StructMap,
    shaper: Option<Shaper>,
}

impl ConfigTemplate {
    /// A template seeded from a map. The map is copied.
    pub fn new(defaults: &StructMap) -> Self {
        Self {
            defaults: defaults.deep_copy(),
            shaper: None,
        }
    }

    /// A template whose defaults are built by `shaper` on every instantiation.
    pub fn from_fn<F>(shaper: F) -> Self
    where
        F: Fn(&StructMap) -> Result<()> + 'static,
    {
        Self {
            defaults: StructMap::new(),
            shaper: Some(Rc::new(shaper)),
        }
    }

    /// Build a fresh, independent store.
    ///
    /// # Errors
    ///
    /// Returns whatever the shaping function returns.
    pub fn instantiate(&self) -> Result<Configuration> {
        let mut builder = Configuration::builder().with_defaults(self.defaults.deep_copy());
        if let Some(shaper) = &self.shaper {
            let shaper = Rc::clone(shaper);
            builder = builder.with_defaults_fn(move |d| shaper(d));
        }
        builder.build()
    }
}
