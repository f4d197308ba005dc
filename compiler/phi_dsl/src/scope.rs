//! The dynamic scope visible to compiled functions.
//!
//! Every compiled function receives the `ScopeStack` of the run it belongs
//! to. A scoped body pushes its acquired resource value and the
//! [`ScopeGuard`] pops it on drop, so the previous scope is restored on
//! every exit path (normal return, `?` propagation, or unwinding).
//!
//! ```text
//! let mut scoped = stack.enter(resource_value);
//! let out = body.call(input, &mut scoped)?;
//! // popped here
//! ```

use std::ops::{Deref, DerefMut};

use phi_value::{no_active_scope, EvalError, SharedResource, Value};

use crate::Func;

/// Stack of active scope values, innermost last.
///
/// Each pipeline run owns one, so concurrent runs never observe each
/// other's scopes.
#[derive(Clone, Debug, Default)]
pub struct ScopeStack {
    frames: Vec<Value>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// The innermost active scope, if any.
    pub fn current(&self) -> Option<&Value> {
        self.frames.last()
    }

    /// Number of nested scopes currently active.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Install `scope` as the current scope until the guard is dropped.
    pub fn enter(&mut self, scope: Value) -> ScopeGuard<'_> {
        self.frames.push(scope);
        ScopeGuard { stack: self }
    }
}

/// RAII guard restoring the previous scope on drop.
///
/// Derefs to the stack so nested bodies can keep entering scopes through it.
pub struct ScopeGuard<'a> {
    stack: &'a mut ScopeStack,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.stack.frames.pop();
    }
}

impl Deref for ScopeGuard<'_> {
    type Target = ScopeStack;

    fn deref(&self) -> &Self::Target {
        self.stack
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.stack
    }
}

/// A function returning the innermost active scope.
///
/// Fails with `NoActiveScope` when called outside every scoped body.
pub fn current_scope() -> Func {
    Func::scoped(|_, scopes| scopes.current().cloned().ok_or_else(no_active_scope))
        .labeled("current_scope")
}

/// A scope value together with the resource it came from, if any.
///
/// Dropping it releases the resource. Plain values are used as the scope
/// directly and have nothing to release.
pub(crate) struct Acquired {
    scope: Value,
    resource: Option<SharedResource>,
}

impl Acquired {
    pub(crate) fn acquire(handle: Value) -> Result<Self, EvalError> {
        match handle {
            Value::Resource(resource) => {
                tracing::trace!(?resource, "acquiring resource");
                let scope = resource.acquire()?;
                Ok(Acquired {
                    scope,
                    resource: Some(resource),
                })
            }
            scope => Ok(Acquired {
                scope,
                resource: None,
            }),
        }
    }

    pub(crate) fn scope(&self) -> &Value {
        &self.scope
    }
}

impl Drop for Acquired {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            tracing::trace!(?resource, "releasing resource");
            resource.release();
        }
    }
}
