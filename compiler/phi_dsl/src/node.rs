//! AST nodes and how each one compiles.
//!
//! Compilation threads an `Environment` through the tree and returns the
//! compiled function(s) together with the possibly extended environment.
//! The input environment is never modified.
//!
//! | Node       | Compiles to                                               |
//! |------------|-----------------------------------------------------------|
//! | `Function` | the wrapped function                                      |
//! | `Input`    | a function returning the stored constant                  |
//! | `Read`     | a function returning the reference's current value        |
//! | `Write`    | a function storing its input and passing it through       |
//! | `Tree`     | one function per leaf branch, unjoined                    |
//! | `Sequence` | `right` after `left`, per branch when `right` branches    |
//! | `Dict`     | a function building a `Record` from every keyed branch    |
//! | `With`     | `body` evaluated while `scope`'s resource is held         |

use std::fmt;

use phi_value::{Name, Record, Value};

use crate::errors::CompileError;
use crate::func::{compose, normalize, Compiled, Func};
use crate::scope::Acquired;
use crate::stack::ensure_sufficient_stack;
use crate::{Environment, Reference, WriteTarget};

/// Result of compiling a node.
pub type CompileResult = Result<(Compiled, Environment), CompileError>;

/// An opaque function plus references it brings into scope.
#[derive(Clone, Debug)]
pub struct FunctionNode {
    func: Func,
    bindings: Vec<Reference>,
}

impl FunctionNode {
    pub fn new(func: Func) -> Self {
        FunctionNode {
            func,
            bindings: Vec::new(),
        }
    }

    /// Bind `reference` into the environment of everything compiled after this node.
    #[must_use]
    pub fn bind(mut self, reference: Reference) -> Self {
        self.bindings.push(reference);
        self
    }

    pub fn func(&self) -> &Func {
        &self.func
    }
}

/// A node of the pipeline AST.
#[derive(Clone, Debug)]
pub enum Node {
    Function(FunctionNode),
    /// Parallel branches evaluated against the same input.
    Tree(Vec<Node>),
    /// `right` applied to the output of `left`.
    Sequence(Box<Node>, Box<Node>),
    /// Named branches producing a `Record`.
    Dict(Vec<(Name, Node)>),
    /// `body` evaluated with `scope`'s resource installed as the current scope.
    With { scope: Box<Node>, body: Box<Node> },
    Read(Name),
    Write(WriteTarget),
    /// A constant, ignoring the input.
    Input(Value),
}

impl Node {
    pub fn function(func: Func) -> Self {
        Node::Function(FunctionNode::new(func))
    }

    pub fn identity() -> Self {
        Node::function(Func::identity())
    }

    pub fn read(name: impl Into<Name>) -> Self {
        Node::Read(name.into())
    }

    pub fn write(name: impl Into<Name>) -> Self {
        Node::Write(WriteTarget::Name(name.into()))
    }

    pub fn write_ref(reference: Reference) -> Self {
        Node::Write(WriteTarget::Ref(reference))
    }

    pub fn input(value: impl Into<Value>) -> Self {
        Node::Input(value.into())
    }

    pub fn sequence(left: Node, right: Node) -> Self {
        Node::Sequence(Box::new(left), Box::new(right))
    }

    /// Chain `nodes` so the first runs first.
    ///
    /// No nodes yields the identity; one node is returned as is.
    pub fn chain(nodes: Vec<Node>) -> Self {
        nodes.into_iter().reduce(Node::sequence).unwrap_or_else(Node::identity)
    }

    /// Compile against `env`.
    pub fn compile(&self, env: &Environment) -> CompileResult {
        ensure_sufficient_stack(|| self.compile_node(env))
    }

    fn compile_node(&self, env: &Environment) -> CompileResult {
        match self {
            Node::Function(node) => {
                tracing::trace!(label = node.func.label(), "compiling function");
                let env = if node.bindings.is_empty() {
                    env.clone()
                } else {
                    let local: Environment = node.bindings.iter().cloned().collect();
                    env.merged(&local)
                };
                Ok((Compiled::Single(node.func.clone()), env))
            }

            Node::Input(value) => {
                tracing::trace!(%value, "compiling constant");
                Ok((Compiled::Single(Func::constant(value.clone())), env.clone()))
            }

            Node::Read(name) => {
                let reference = env
                    .get(name.as_str())
                    .cloned()
                    .ok_or_else(|| CompileError::UnboundName { name: name.clone() })?;
                tracing::trace!(name = %name, "compiling read");
                let f = Func::new(move |_| reference.get()).labeled(name);
                Ok((Compiled::Single(f), env.clone()))
            }

            Node::Write(target) => {
                let (reference, env) = env.declare_or_reuse(target);
                tracing::trace!(name = %reference.name(), "compiling write");
                let label = format!("={}", reference.name());
                let f = Func::new(move |x| reference.set(x)).labeled(label);
                Ok((Compiled::Single(f), env))
            }

            Node::Tree(branches) => {
                tracing::trace!(branches = branches.len(), "compiling tree");
                let mut env = env.clone();
                let mut fs = Vec::with_capacity(branches.len());
                for branch in branches {
                    let (compiled, next) = branch.compile(&env)?;
                    env = next;
                    match compiled {
                        Compiled::Single(f) => fs.push(f),
                        Compiled::Branches(inner) => fs.extend(inner),
                    }
                }
                Ok((Compiled::Branches(fs), env))
            }

            Node::Sequence(left, right) => {
                let (left, env) = left.compile(env)?;
                let left = normalize(left);
                let (right, env) = right.compile(&env)?;
                Ok((compose(right, &left), env))
            }

            Node::Dict(entries) => {
                tracing::trace!(keys = entries.len(), "compiling dict");
                let mut out = env.clone();
                let mut branches = Vec::with_capacity(entries.len());
                for (key, node) in entries {
                    let (compiled, next) = node.compile(env)?;
                    out = out.merged(&next);
                    branches.push((key.clone(), normalize(compiled)));
                }
                let f = Func::scoped(move |x, scopes| {
                    let mut record = Record::new();
                    for (key, branch) in &branches {
                        record.insert(key.clone(), branch.call(x.clone(), scopes)?);
                    }
                    Ok(Value::record(record))
                })
                .labeled("record");
                Ok((Compiled::Single(f), out))
            }

            Node::With { scope, body } => {
                tracing::trace!("compiling scoped body");
                let (scope, env) = scope.compile(env)?;
                let scope = normalize(scope);
                let (body, env) = body.compile(&env)?;
                let body = normalize(body);
                let f = Func::scoped(move |x, scopes| {
                    let held = Acquired::acquire(scope.call(x.clone(), scopes)?)?;
                    let mut scoped = scopes.enter(held.scope().clone());
                    body.call(x, &mut scoped)
                })
                .labeled("with");
                Ok((Compiled::Single(f), env))
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Function(node) => write!(f, "Fun({})", node.func.label()),
            Node::Tree(branches) => {
                f.write_str("[")?;
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{branch}")?;
                }
                f.write_str("]")
            }
            Node::Sequence(left, right) => write!(f, "Seq({left}, {right})"),
            Node::Dict(entries) => {
                f.write_str("{")?;
                for (i, (key, node)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {node}")?;
                }
                f.write_str("}")
            }
            Node::With { scope, body } => write!(f, "{{{scope}: {body}}}"),
            Node::Read(name) => write!(f, "Read({name})"),
            Node::Write(target) => write!(f, "Write({})", target.name()),
            Node::Input(value) => write!(f, "Input({value})"),
        }
    }
}

#[cfg(test)]
mod tests;
