//! Deferred translations backed by an application-supplied translator.
//!
//! The crate only defines how translated values are deferred. The actual
//! lookup is delegated to a [`Translator`] installed on the current thread;
//! evaluating a translated value with no translator installed fails with
//! [`ConfigError::MissingHandler`].
//!
//! # Examples
//!
//! ```rust
//! use nestconf::i18n::{self, Translator};
//! use nestconf::prelude::*;
//!
//! struct French;
//!
//! impl Translator for French {
//!     fn translate(&self, key: &str) -> nestconf::error::Result<String> {
//!         Ok(match key {
//!             "Hello, World!" => "Bonjour, Monde!".to_string(),
//!             other => other.to_string(),
//!         })
//!     }
//!
//!     fn localize(&self, value: &Value) -> nestconf::error::Result<String> {
//!         Ok(format!("{value:?}"))
//!     }
//! }
//!
//! let greeting = StructMap::new();
//! greeting.set("hello", "Hello, World!");
//! greeting.set("local_hello", i18n::deferred(|c: &StructMap| c.get("hello").ok().flatten()));
//!
//! assert!(greeting.get("local_hello").is_err());
//! i18n::install(French);
//! assert_eq!(greeting.get("local_hello").unwrap(), Some(Value::from("Bonjour, Monde!")));
//! ```

use crate::core::{Deferred, StructMap, Value};
use crate::error::{ConfigError, Result};
use std::cell::RefCell;
use std::rc::Rc;

/// The external translation collaborator.
pub trait Translator {
    /// Translate a message key.
    ///
    /// # Errors
    ///
    /// Implementations decide how unknown keys are reported.
    fn translate(&self, key: &str) -> Result<String>;

    /// Render a non-string value (dates, numbers, ...) for the current locale.
    ///
    /// # Errors
    ///
    /// Implementations decide how unsupported values are reported.
    fn localize(&self, value: &Value) -> Result<String>;
}

thread_local! {
    static TRANSLATOR: RefCell<Option<Rc<dyn Translator>>> = const { RefCell::new(None) };
}

/// Install the translator used by deferred translations on this thread.
pub fn install(translator: impl Translator + 'static) {
    TRANSLATOR.with(|slot| *slot.borrow_mut() = Some(Rc::new(translator)));
    tracing::debug!("i18n translator installed");
}

/// Remove the translator, returning whether one was installed.
pub fn uninstall() -> bool {
    TRANSLATOR.with(|slot| slot.borrow_mut().take().is_some())
}

/// Whether a translator is installed on this thread.
pub fn is_loaded() -> bool {
    TRANSLATOR.with(|slot| slot.borrow().is_some())
}

fn translator() -> Result<Rc<dyn Translator>> {
    TRANSLATOR
        .with(|slot| slot.borrow().clone())
        .ok_or(ConfigError::MissingHandler("i18n"))
}

fn render(value: Value) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::String(key) => translator()?.translate(&key).map(Value::String),
        other => translator()?.localize(&other).map(Value::String),
    }
}

/// A deferred value translating whatever `source` yields at read time.
///
/// Strings are translated, null passes through, and anything else is localized.
pub fn deferred<F, V>(source: F) -> Deferred
where
    F: Fn(&StructMap) -> V + 'static,
    V: Into<Value>,
{
    Deferred::try_new(move |owner| render(source(owner).into()))
}

/// A deferred value translating a fixed message key.
pub fn translation(key: impl Into<String>) -> Deferred {
    let key = key.into();
    Deferred::try_new(move |_| translator()?.translate(&key).map(Value::String))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Opaque;

    #[derive(Debug, Clone, PartialEq)]
    struct Instant(u32);

    struct Mock;

    impl Translator for Mock {
        fn translate(&self, key: &str) -> Result<String> {
            match key {
                "Hello, World!" => Ok("Bonjour, Monde!".to_string()),
                other => Err(ConfigError::other(format!("missing translation: {other}"))),
            }
        }

        fn localize(&self, value: &Value) -> Result<String> {
            match value.downcast_ref::<Instant>() {
                Some(_) => Ok("French Time!".to_string()),
                None => Ok(format!("{value:?}")),
            }
        }
    }

    fn github() -> StructMap {
        let github = StructMap::new();
        github.set("hello", "Hello, World!");
        github.set("time", Opaque::new(Instant(1)));
        github.set("local_hello", deferred(|c: &StructMap| c.get("hello").ok().flatten()));
        github.set("local_time", deferred(|c: &StructMap| c.get("time").ok().flatten()));
        github
    }

    #[test]
    fn test_missing_handler() {
        uninstall();
        let github = github();
        let err = github.get("local_hello").unwrap_err();
        assert!(matches!(err, ConfigError::MissingHandler("i18n")));
        // Inspection never reaches the translator.
        assert!(github.inspect().contains("local_hello: (deferred)"));
    }

    #[test]
    fn test_translate_and_localize() {
        install(Mock);
        let github = github();
        assert_eq!(
            github.get("local_hello").unwrap(),
            Some(Value::from("Bonjour, Monde!"))
        );
        assert_eq!(
            github.get("local_time").unwrap(),
            Some(Value::from("French Time!"))
        );
        assert!(uninstall());
        assert!(!is_loaded());
    }

    #[test]
    fn test_fixed_key_translation() {
        install(Mock);
        let map = StructMap::new();
        map.set("greeting", translation("Hello, World!"));
        map.set("broken", translation("nope"));
        assert_eq!(map.get("greeting").unwrap(), Some(Value::from("Bonjour, Monde!")));
        assert!(map.get("broken").is_err());
        uninstall();
    }

    #[test]
    fn test_null_passes_through() {
        uninstall();
        let map = StructMap::new();
        map.set("empty", deferred(|_: &StructMap| Value::Null));
        assert_eq!(map.get("empty").unwrap(), Some(Value::Null));
    }
}
