//! Compile-time errors.
//!
//! Runtime failures are `phi_value::EvalError`; everything here is reported
//! by `compile` before any function runs.

use phi_value::Name;

/// A literal that does not fit the grammar.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// No grammar rule matches the literal's shape.
    #[error("element not part of the DSL: got `{value}` of shape {shape}")]
    UnsupportedShape { value: String, shape: &'static str },

    /// A set element is neither a name nor a reference.
    #[error("sets can only contain names or references, got `{value}` of shape {shape}")]
    InvalidWriteTarget { value: String, shape: &'static str },

    /// A keyed-branch mapping uses a key that is not a name.
    #[error("branch keys must be names, got `{value}` of shape {shape}")]
    InvalidBranchKey { value: String, shape: &'static str },

    /// A keyed-branch mapping names the same key twice.
    #[error("duplicate branch key `{key}`")]
    DuplicateBranchKey { key: Name },

    /// A scoped-body mapping does not have exactly one entry.
    #[error("a scoped body mapping must have exactly 1 entry, got {entries}")]
    ScopedBodyArity { entries: usize },
}

/// Failure to turn a literal into a pipeline.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A read names something no earlier write or caller binding declared.
    #[error("unbound name `{name}`")]
    UnboundName { name: Name },
}
