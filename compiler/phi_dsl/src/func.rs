//! Compiled functions and the helpers that combine them.
//!
//! Compiling a node yields either one function or an ordered list of
//! branch functions that have not been joined yet. Keeping branches apart
//! lets a following stage be applied to each branch individually; joining
//! happens only when a single function is required.

use std::fmt;
use std::sync::Arc;

use phi_value::{EvalResult, Value};

use crate::stack::ensure_sufficient_stack;
use crate::ScopeStack;

type FuncFn = dyn Fn(Value, &mut ScopeStack) -> EvalResult + Send + Sync;

/// A unary function of the compiled pipeline.
///
/// Cheap to clone. The scope stack is passed explicitly on every call; most
/// functions ignore it.
#[derive(Clone)]
pub struct Func {
    label: Arc<str>,
    f: Arc<FuncFn>,
}

impl Func {
    /// Wrap a fallible unary function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value) -> EvalResult + Send + Sync + 'static,
    {
        Self::scoped(move |x, _| f(x))
    }

    /// Wrap an infallible unary function.
    pub fn map<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self::scoped(move |x, _| Ok(f(x)))
    }

    /// Wrap a function that can see the active scopes.
    pub fn scoped<F>(f: F) -> Self
    where
        F: Fn(Value, &mut ScopeStack) -> EvalResult + Send + Sync + 'static,
    {
        Func {
            label: Arc::from("fn"),
            f: Arc::new(f),
        }
    }

    /// Returns its input unchanged.
    pub fn identity() -> Self {
        Func::new(Ok).labeled("identity")
    }

    /// Ignores its input and always returns `value`.
    pub fn constant(value: Value) -> Self {
        Func::new(move |_| Ok(value.clone())).labeled("const")
    }

    /// Attach a name used when printing nodes.
    #[must_use]
    pub fn labeled(mut self, label: impl AsRef<str>) -> Self {
        self.label = Arc::from(label.as_ref());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn call(&self, input: Value, scopes: &mut ScopeStack) -> EvalResult {
        (self.f)(input, scopes)
    }

    /// `self` applied to the output of `before`.
    #[must_use]
    pub fn after(&self, before: &Func) -> Func {
        let (first, second) = (before.clone(), self.clone());
        Func::scoped(move |x, scopes| {
            ensure_sufficient_stack(|| {
                let mid = first.call(x, scopes)?;
                second.call(mid, scopes)
            })
        })
        .labeled("seq")
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Func({})", self.label)
    }
}

/// Output of compiling a node.
#[derive(Clone, Debug)]
pub enum Compiled {
    Single(Func),
    /// Unjoined parallel branches, in declaration order.
    Branches(Vec<Func>),
}

impl Compiled {
    /// Number of leaf functions.
    pub fn arity(&self) -> usize {
        match self {
            Compiled::Single(_) => 1,
            Compiled::Branches(fs) => fs.len(),
        }
    }
}

/// Join branches into one function returning their results as a list.
///
/// Every branch receives the same input; results keep branch order.
pub fn normalize(compiled: Compiled) -> Func {
    match compiled {
        Compiled::Single(f) => f,
        Compiled::Branches(fs) => {
            Func::scoped(move |x, scopes| {
                let results = fs
                    .iter()
                    .map(|f| f.call(x.clone(), scopes))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::list(results))
            })
            .labeled("branches")
        }
    }
}

/// Run `before`, then `compiled` on its output.
///
/// With branches, each branch is composed individually and the result stays
/// unjoined, so every branch sees the same output of `before`.
pub fn compose(compiled: Compiled, before: &Func) -> Compiled {
    match compiled {
        Compiled::Single(f) => Compiled::Single(f.after(before)),
        Compiled::Branches(fs) => Compiled::Branches(fs.iter().map(|f| f.after(before)).collect()),
    }
}
