//! Error types for pipeline execution.
//!
//! Compile-time failures live in `phi_dsl`; everything here is raised while
//! a compiled pipeline runs. Factory functions (e.g. `unassigned_reference()`)
//! are the construction API so messages stay in one place.

use crate::{Name, Value};

/// Result of running a compiled function.
pub type EvalResult = Result<Value, EvalError>;

/// Runtime failure of a compiled pipeline.
///
/// Nothing inside the engine recovers from these: an error unwinds every
/// scoped body in progress (releasing its resource) and reaches the caller
/// of the pipeline unchanged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// A reference was read before anything was written to it.
    #[error("reference `{name}` was read before assignment")]
    UnassignedReference { name: Name },

    /// A write-once reference was written a second time.
    #[error("reference `{name}` is write-once and already assigned")]
    AlreadyAssigned { name: Name },

    /// The current scope was requested outside any scoped body.
    #[error("no scope is active")]
    NoActiveScope,

    /// A value did not have the shape a callable expected.
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
    },

    /// A scoped resource could not be acquired.
    #[error("failed to acquire resource: {message}")]
    Resource { message: String },

    /// Failure raised by a user-supplied callable.
    #[error("{message}")]
    Custom { message: String },
}

#[cold]
pub fn unassigned_reference(name: &Name) -> EvalError {
    EvalError::UnassignedReference { name: name.clone() }
}

#[cold]
pub fn already_assigned(name: &Name) -> EvalError {
    EvalError::AlreadyAssigned { name: name.clone() }
}

#[cold]
pub fn no_active_scope() -> EvalError {
    EvalError::NoActiveScope
}

/// A value had the wrong shape for the operation.
#[cold]
pub fn type_mismatch(expected: &'static str, got: &Value) -> EvalError {
    EvalError::TypeMismatch {
        expected,
        got: got.type_name(),
    }
}

#[cold]
pub fn resource_failed(message: impl Into<String>) -> EvalError {
    EvalError::Resource {
        message: message.into(),
    }
}

/// Failure raised from inside a user callable.
#[cold]
pub fn custom(message: impl Into<String>) -> EvalError {
    EvalError::Custom {
        message: message.into(),
    }
}
