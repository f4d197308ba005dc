//! Phi Value - runtime data model for the phi pipeline compiler.
//!
//! This crate provides:
//! - `Name`: cheap, ordered identifiers used for references and branch keys
//! - `Value`: the closed set of values flowing through compiled pipelines
//! - `Record`: the keyed output of a branch-by-key stage
//! - `Resource`: the acquire/release contract for scoped bodies
//! - `EvalError` / `EvalResult`: runtime failures
//!
//! All heap-backed values are reference counted with `Arc`, so handing the
//! same input to several parallel branches never deep-copies it.

mod errors;
mod name;
mod resource;
mod value;

pub use errors::{
    already_assigned, custom, no_active_scope, resource_failed, type_mismatch,
    unassigned_reference, EvalError, EvalResult,
};
pub use name::Name;
pub use resource::{Resource, SharedResource};
pub use value::{Record, Value};
