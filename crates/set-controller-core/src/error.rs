//! Error types for the observation primitives.

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while resolving keys on observable objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A key is not declared by the record type.
    #[error("Key '{key}' is not an observable key of {type_name}")]
    UnknownKey {
        key: String,
        type_name: &'static str,
    },

    /// A declared key could not be read on a specific instance.
    #[error("Key '{key}' could not be resolved on an instance of {type_name}")]
    Unresolved {
        key: String,
        type_name: &'static str,
    },

    /// A key does not name a set relationship on the container.
    #[error("Key '{key}' is not a set relationship of {type_name}")]
    NotASet {
        key: String,
        type_name: &'static str,
    },
}

impl CoreError {
    /// Create an unknown-key error.
    pub fn unknown_key<T: ?Sized>(key: impl Into<String>) -> Self {
        Self::UnknownKey {
            key: key.into(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Create an unresolved-key error.
    pub fn unresolved<T: ?Sized>(key: impl Into<String>) -> Self {
        Self::Unresolved {
            key: key.into(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Create a not-a-set error.
    pub fn not_a_set<C: ?Sized>(key: impl Into<String>) -> Self {
        Self::NotASet {
            key: key.into(),
            type_name: std::any::type_name::<C>(),
        }
    }

    /// The key this error is about.
    pub fn key(&self) -> &str {
        match self {
            Self::UnknownKey { key, .. } | Self::Unresolved { key, .. } | Self::NotASet { key, .. } => key,
        }
    }
}
