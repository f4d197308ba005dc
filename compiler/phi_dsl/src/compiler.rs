//! The compile entry point and its configuration.

use phi_value::{EvalResult, Value};

use crate::errors::CompileError;
use crate::func::{normalize, Func};
use crate::parse::{parse, Literal};
use crate::{Environment, Reassign, ScopeStack};

/// Configuration for turning literals into pipelines.
///
/// ```text
/// let (pipeline, env) = Compiler::new()
///     .reassign(Reassign::Reject)
///     .compile(literal, &Environment::new())?;
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Compiler {
    constants: bool,
    reassign: Option<Reassign>,
}

impl Compiler {
    /// Constants disallowed at the top level; the environment's write policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a bare constant as the whole pipeline.
    #[must_use]
    pub fn constants(mut self, allow: bool) -> Self {
        self.constants = allow;
        self
    }

    /// Policy for references declared implicitly during this compilation.
    ///
    /// Overrides the policy carried by the environment passed to `compile`
    /// for this compilation only; the returned environment keeps the
    /// caller's policy.
    #[must_use]
    pub fn reassign(mut self, reassign: Reassign) -> Self {
        self.reassign = Some(reassign);
        self
    }

    /// Parse `literal`, compile it against `env` and join the result.
    ///
    /// Returns the pipeline and the environment extended with every
    /// reference the literal declared. `env` itself is left untouched.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn compile(
        &self,
        literal: impl Into<Literal>,
        env: &Environment,
    ) -> Result<(Pipeline, Environment), CompileError> {
        let ast = parse(literal.into(), self.constants)?;

        let (compiled, env) = match self.reassign {
            Some(reassign) => {
                let (compiled, out) = ast.compile(&env.clone().with_reassign(reassign))?;
                (compiled, out.with_reassign(env.reassign()))
            }
            None => ast.compile(env)?,
        };
        tracing::debug!(
            branches = compiled.arity(),
            references = env.len(),
            "compiled pipeline"
        );

        Ok((Pipeline::new(normalize(compiled)), env))
    }
}

/// Compile `literal` against `env` with the default configuration.
pub fn compile(
    literal: impl Into<Literal>,
    env: &Environment,
) -> Result<(Pipeline, Environment), CompileError> {
    Compiler::new().compile(literal, env)
}

/// An executable pipeline: one value in, one value out.
#[derive(Clone, Debug)]
pub struct Pipeline {
    func: Func,
}

impl Pipeline {
    pub fn new(func: Func) -> Self {
        Pipeline { func }
    }

    /// Run on `input` with no scope active.
    pub fn run(&self, input: impl Into<Value>) -> EvalResult {
        let mut scopes = ScopeStack::new();
        self.run_in(input, &mut scopes)
    }

    /// Run on `input` inside the caller's scopes.
    pub fn run_in(&self, input: impl Into<Value>, scopes: &mut ScopeStack) -> EvalResult {
        self.func.call(input.into(), scopes)
    }

    pub fn func(&self) -> &Func {
        &self.func
    }

    pub fn into_func(self) -> Func {
        self.func
    }
}

#[cfg(test)]
mod tests;
