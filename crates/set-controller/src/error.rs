//! Error types for the set controller.

use set_controller_core::CoreError;

use crate::index::IndexPath;

/// Result type alias for controller operations.
pub type Result<T> = std::result::Result<T, SetControllerError>;

/// Errors surfaced by [`SetController`](crate::SetController) and the
/// projection engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SetControllerError {
    /// An operation was called in a state that does not allow it: a second
    /// query without `stop_observing`, a re-entrant change, or a dropped
    /// container.
    #[error("Inconsistent state: {reason}")]
    InconsistentState { reason: String },

    /// Building a projection failed while running a query or recompute.
    #[error("Query failed: {source}")]
    QueryFailed {
        #[source]
        source: CoreError,
    },

    /// The configuration does not match the container or the member type.
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        reason: String,
        #[source]
        source: Option<CoreError>,
    },

    /// An attribute could not be evaluated on a member.
    #[error("Attribute resolution failed: {0}")]
    AttributeResolution(#[from] CoreError),

    /// An index path does not address an existing section or item.
    #[error("Index path {path} is out of range")]
    IndexOutOfRange { path: IndexPath },
}

impl SetControllerError {
    /// Create an inconsistent-state error.
    pub fn inconsistent(reason: impl Into<String>) -> Self {
        Self::InconsistentState {
            reason: reason.into(),
        }
    }

    /// Create a configuration error caused by a key lookup failure.
    pub fn invalid_config(source: CoreError) -> Self {
        Self::InvalidConfiguration {
            reason: source.to_string(),
            source: Some(source),
        }
    }

    /// Wrap a projection failure as a failed query.
    pub fn query_failed(err: SetControllerError) -> Self {
        match err {
            Self::AttributeResolution(source) => Self::QueryFailed { source },
            other => other,
        }
    }

    /// Numeric error code.
    ///
    /// `InconsistentState` and `QueryFailed` keep the codes 1 and 2 of the
    /// classic controller API.
    pub fn code(&self) -> u32 {
        match self {
            Self::InconsistentState { .. } => 1,
            Self::QueryFailed { .. } => 2,
            Self::InvalidConfiguration { .. } => 3,
            Self::AttributeResolution(_) => 4,
            Self::IndexOutOfRange { .. } => 5,
        }
    }
}
