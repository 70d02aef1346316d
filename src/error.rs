//! Error types for association resolution
//!
//! Type mismatches are always surfaced to the caller; invalid keys are a
//! soft condition handled by returning empty results, never an error.

use std::fmt;

/// Result type alias for association operations
pub type AssociationResult<T> = Result<T, AssociationError>;

/// Error types for association operations
#[derive(Debug, Clone)]
pub enum AssociationError {
    /// A source or target record had the wrong model type
    TypeMismatch {
        /// Which parameter was mismatched ("source" or "target")
        param: &'static str,
        /// The model the relationship expected
        expected: String,
        /// The model that was actually supplied
        actual: String,
    },
    /// Invalid relationship definition (key arity, through-chain models, duplicate names)
    Configuration(String),
    /// Failure reported by the persistence collaborator, propagated unchanged
    Store(String),
}

impl AssociationError {
    /// Build a `TypeMismatch` error for the named parameter
    pub fn type_mismatch(
        param: &'static str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        AssociationError::TypeMismatch {
            param,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Build a `Store` error; intended for persistence collaborator implementations
    pub fn store(message: impl Into<String>) -> Self {
        AssociationError::Store(message.into())
    }
}

impl fmt::Display for AssociationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssociationError::TypeMismatch {
                param,
                expected,
                actual,
            } => write!(
                f,
                "Type mismatch: expected {} to be a '{}' record, got '{}'",
                param, expected, actual
            ),
            AssociationError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AssociationError::Store(msg) => write!(f, "Store error: {}", msg),
        }
    }
}

impl std::error::Error for AssociationError {}
