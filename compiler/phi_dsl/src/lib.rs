//! Phi DSL - compiles nested pipeline literals into function graphs.
//!
//! A pipeline is described by a nested [`Literal`]: tuples run stages in
//! order, lists fan out into parallel branches, sets write into named
//! references, one-entry maps hold a resource around a body, and wider maps
//! collect named branches into a [`Record`](phi_value::Record).
//!
//! # Architecture
//!
//! ```text
//! Literal --parse--> Node --compile(Environment)--> Compiled --normalize--> Pipeline
//! ```
//!
//! - `Reference`: named write-then-read slot shared with compiled functions
//! - `Environment`: copy-on-extend map of names to references
//! - `Node`: the closed AST, one `compile` per variant
//! - `Func` / `Compiled`: compiled functions and unjoined branches
//! - `ScopeStack`: the scopes active during one run, passed explicitly
//!
//! # Tracing
//!
//! - `RUST_LOG=phi_dsl=debug`: one event per compiled pipeline and per
//!   implicitly declared reference.
//! - `RUST_LOG=phi_dsl=trace`: every node compiled, every resource acquired
//!   and released.

mod compiler;
mod environment;
mod errors;
mod func;
mod node;
mod parse;
mod reference;
mod scope;
mod stack;

use std::sync::Once;

pub use compiler::{compile, Compiler, Pipeline};
pub use environment::{Environment, WriteTarget};
pub use errors::{CompileError, ParseError};
pub use func::{compose, normalize, Compiled, Func};
pub use node::{CompileResult, FunctionNode, Node};
pub use parse::{parse, parse_scoped, Literal};
pub use reference::{Reassign, Reference};
pub use scope::{current_scope, ScopeGuard, ScopeStack};
pub use stack::ensure_sufficient_stack;

pub use phi_value::{EvalError, EvalResult, Name, Record, Resource, SharedResource, Value};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Installs a subscriber only when `RUST_LOG` is set. Safe to call more
/// than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
