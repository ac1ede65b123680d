//! Error types for nestconf.

use std::fmt;

/// Result type alias for nestconf operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `pop` was called with no snapshot on the stash.
    #[error("Stash is empty")]
    EmptyStash,

    /// Struct-style access used a name reserved for the container's own operations.
    #[error("`{0}` is a reserved name and cannot be used as a configuration key")]
    ReservedKey(String),

    /// A struct-style call or merge source could not be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The value stored under a key has the wrong shape for the requested operation.
    #[error("Type mismatch at `{key}`: expected {expected}, found {found}")]
    TypeMismatch {
        /// The canonical key that was accessed
        key: String,
        /// The shape the operation required
        expected: &'static str,
        /// The shape actually stored
        found: &'static str,
    },

    /// A deferred value needed a collaborator that was never installed.
    #[error("{0} handler not loaded")]
    MissingHandler(&'static str),

    /// The after-config hook rejected the configuration.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// Failed to load configuration from a source.
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    /// Failed to deserialize configuration.
    #[error("Failed to deserialize configuration: {0}")]
    DeserializationError(String),

    /// Generic error for other cases, including failures raised by deferred computations.
    #[error("Configuration error: {0}")]
    Other(String),
}

impl ConfigError {
    /// Create an error from any message, typically inside a deferred computation.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Validation error returned by after-config hooks.
#[derive(Debug)]
pub enum ValidationError {
    /// Custom validation error with a message.
    Custom(String),

    /// A specific field has an invalid value.
    InvalidField {
        /// The field name/path
        field: String,
        /// The reason why it's invalid
        reason: String,
    },

    /// Multiple validation errors occurred.
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Create a custom validation error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(msg) => write!(f, "{}", msg),
            Self::InvalidField { field, reason } => {
                write!(f, "Field '{}' is invalid: {}", field, reason)
            }
            Self::Multiple(errors) => {
                writeln!(f, "Multiple validation errors:")?;
                for (i, err) in errors.iter().enumerate() {
                    writeln!(f, "  {}. {}", i + 1, err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        ConfigError::ValidationError(err.to_string())
    }
}
