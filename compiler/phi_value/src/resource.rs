//! The acquire/release contract for scoped bodies.

use std::fmt;
use std::sync::Arc;

use crate::EvalResult;

/// A resource that a scoped body holds for the duration of its execution.
///
/// `acquire` produces the value installed as the current scope.
/// `release` runs exactly once for every successful `acquire`, whether the
/// body returns normally, returns an error, or panics.
pub trait Resource: Send + Sync + fmt::Debug {
    /// Acquire the resource, producing the scope value seen by the body.
    fn acquire(&self) -> EvalResult;

    /// Release the resource.
    fn release(&self);
}

/// Shared handle to a resource, as carried by `Value::Resource`.
pub type SharedResource = Arc<dyn Resource>;
