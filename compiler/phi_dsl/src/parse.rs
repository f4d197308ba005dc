//! The literal surface and its parser.
//!
//! A pipeline is written as a nested `Literal`. The grammar has no
//! keywords: the variant of each literal decides what it means.
//!
//! | Literal      | Parses to                                            |
//! |--------------|------------------------------------------------------|
//! | `Node`       | itself                                               |
//! | `Func`       | `Function`                                           |
//! | `Ref`        | `Function` reading the reference                     |
//! | `Name`       | `Read`                                               |
//! | `Set`        | one `Write` per element, chained                     |
//! | `Tuple`      | `Sequence` chain, first element runs first           |
//! | `Map`, 1 key | `With` (key is the scope, value the body)            |
//! | `Map`, other | `Dict`                                               |
//! | `List`       | `Tree`, or the element itself when there is just one |
//! | `Const`      | `Input` when constants are allowed, else an error    |

use std::fmt;

use phi_value::{EvalResult, Name, Value};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::errors::ParseError;
use crate::func::Func;
use crate::stack::ensure_sufficient_stack;
use crate::{Node, Reference, WriteTarget};

/// A pipeline as written by the caller.
#[derive(Clone, Debug)]
pub enum Literal {
    /// An already built node, used verbatim.
    Node(Node),
    Func(Func),
    /// A reference outside a set reads it.
    Ref(Reference),
    Name(Name),
    Const(Value),
    /// Sequential stages.
    Tuple(Vec<Literal>),
    /// Parallel branches.
    List(Vec<Literal>),
    /// Simultaneous writes. Elements must be names or references.
    Set(Vec<Literal>),
    /// Scoped body (one entry) or named branches (any other count).
    Map(Vec<(Literal, Literal)>),
}

impl Literal {
    pub fn name(name: impl Into<Name>) -> Self {
        Literal::Name(name.into())
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Literal::Const(value.into())
    }

    /// A plain unary function.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(Value) -> EvalResult + Send + Sync + 'static,
    {
        Literal::Func(Func::new(f))
    }

    pub fn tuple<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Literal>,
    {
        Literal::Tuple(items.into_iter().map(Into::into).collect())
    }

    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Literal>,
    {
        Literal::List(items.into_iter().map(Into::into).collect())
    }

    pub fn set<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Literal>,
    {
        Literal::Set(items.into_iter().map(Into::into).collect())
    }

    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Literal>,
        V: Into<Literal>,
    {
        Literal::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// `body` evaluated while the resource produced by `scope` is held.
    pub fn scoped(scope: impl Into<Literal>, body: impl Into<Literal>) -> Self {
        Literal::Map(vec![(scope.into(), body.into())])
    }

    /// Short name of the literal's shape, for diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Literal::Node(_) => "node",
            Literal::Func(_) => "function",
            Literal::Ref(_) => "reference",
            Literal::Name(_) => "name",
            Literal::Const(_) => "constant",
            Literal::Tuple(_) => "tuple",
            Literal::List(_) => "list",
            Literal::Set(_) => "set",
            Literal::Map(_) => "mapping",
        }
    }
}

/// Parse `literal` into a node.
///
/// With `constants` set, a constant becomes an `Input` node instead of an
/// error. Nested literals are always parsed with constants disallowed.
pub fn parse(literal: Literal, constants: bool) -> Result<Node, ParseError> {
    ensure_sufficient_stack(|| match literal {
        Literal::Node(node) => Ok(node),
        Literal::Func(f) => Ok(Node::function(f)),
        Literal::Ref(reference) => Ok(Node::function(read_reference(reference))),
        Literal::Name(name) => Ok(Node::Read(name)),
        Literal::Set(items) => parse_set(items),
        Literal::Tuple(items) => parse_tuple(items),
        Literal::Map(mut entries) if entries.len() == 1 => {
            let (scope, body) = entries.remove(0);
            Node::with_scope(scope, body)
        }
        Literal::Map(entries) => parse_dict(entries),
        Literal::List(items) => parse_iterable(items),
        Literal::Const(value) if constants => Ok(Node::Input(value)),
        Literal::Const(value) => Err(ParseError::UnsupportedShape {
            value: value.to_string(),
            shape: "constant",
        }),
    })
}

/// Parse a literal that must be a one-entry mapping into a scoped body.
pub fn parse_scoped(literal: Literal) -> Result<Node, ParseError> {
    match literal {
        Literal::Map(mut entries) if entries.len() == 1 => {
            let (scope, body) = entries.remove(0);
            Node::with_scope(scope, body)
        }
        Literal::Map(entries) => Err(ParseError::ScopedBodyArity {
            entries: entries.len(),
        }),
        other => Err(ParseError::UnsupportedShape {
            value: other.to_string(),
            shape: other.shape(),
        }),
    }
}

impl Node {
    /// Build a scoped body directly.
    ///
    /// `scope` may be a bare constant, which is then used as the scope value
    /// itself; `body` follows the normal grammar.
    pub fn with_scope(scope: Literal, body: Literal) -> Result<Node, ParseError> {
        let scope = parse(scope, true)?;
        let body = parse(body, false)?;
        Ok(Node::With {
            scope: Box::new(scope),
            body: Box::new(body),
        })
    }
}

fn read_reference(reference: Reference) -> Func {
    let label = reference.name().clone();
    Func::new(move |_| reference.get()).labeled(label)
}

/// Identity of a set element: names by text, references by slot.
#[derive(PartialEq, Eq, Hash)]
enum TargetKey {
    Name(Name),
    Slot(usize),
}

/// One `Write` per distinct element, chained.
///
/// Elements are collected into a hash map, so the order in which
/// simultaneous writes run is unspecified.
fn parse_set(items: Vec<Literal>) -> Result<Node, ParseError> {
    let mut targets = FxHashMap::default();
    for item in items {
        let (key, target) = match item {
            Literal::Name(name) => (TargetKey::Name(name.clone()), WriteTarget::Name(name)),
            Literal::Ref(reference) => (
                TargetKey::Slot(reference.slot_id()),
                WriteTarget::Ref(reference),
            ),
            other => {
                return Err(ParseError::InvalidWriteTarget {
                    value: other.to_string(),
                    shape: other.shape(),
                })
            }
        };
        targets.insert(key, target);
    }
    Ok(Node::chain(targets.into_values().map(Node::Write).collect()))
}

fn parse_tuple(items: Vec<Literal>) -> Result<Node, ParseError> {
    let nodes = items
        .into_iter()
        .map(|item| parse(item, false))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Node::chain(nodes))
}

/// Keyed branches, in the order written. Each key may appear once.
fn parse_dict(entries: Vec<(Literal, Literal)>) -> Result<Node, ParseError> {
    let mut seen = FxHashSet::default();
    let mut branches = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let key = match key {
            Literal::Name(name) => name,
            other => {
                return Err(ParseError::InvalidBranchKey {
                    value: other.to_string(),
                    shape: other.shape(),
                })
            }
        };
        if !seen.insert(key.clone()) {
            return Err(ParseError::DuplicateBranchKey { key });
        }
        branches.push((key, parse(value, false)?));
    }
    Ok(Node::Dict(branches))
}

fn parse_iterable(items: Vec<Literal>) -> Result<Node, ParseError> {
    let mut nodes = items
        .into_iter()
        .map(|item| parse(item, false))
        .collect::<Result<Vec<_>, _>>()?;
    if nodes.len() == 1 {
        if let Some(node) = nodes.pop() {
            return Ok(node);
        }
    }
    Ok(Node::Tree(nodes))
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn items(f: &mut fmt::Formatter<'_>, items: &[Literal]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }

        match self {
            Literal::Node(node) => write!(f, "{node}"),
            Literal::Func(func) => f.write_str(func.label()),
            Literal::Ref(reference) => write!(f, "Ref({})", reference.name()),
            Literal::Name(name) => write!(f, "{name:?}"),
            Literal::Const(value) => write!(f, "{value}"),
            Literal::Tuple(elems) => {
                f.write_str("(")?;
                items(f, elems)?;
                f.write_str(")")
            }
            Literal::List(elems) => {
                f.write_str("[")?;
                items(f, elems)?;
                f.write_str("]")
            }
            Literal::Set(elems) => {
                f.write_str("{")?;
                items(f, elems)?;
                f.write_str("}")
            }
            Literal::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<Node> for Literal {
    fn from(node: Node) -> Self {
        Literal::Node(node)
    }
}

impl From<Func> for Literal {
    fn from(f: Func) -> Self {
        Literal::Func(f)
    }
}

impl From<Reference> for Literal {
    fn from(reference: Reference) -> Self {
        Literal::Ref(reference)
    }
}

impl From<Name> for Literal {
    fn from(name: Name) -> Self {
        Literal::Name(name)
    }
}

impl From<&str> for Literal {
    fn from(name: &str) -> Self {
        Literal::Name(Name::new(name))
    }
}

impl From<String> for Literal {
    fn from(name: String) -> Self {
        Literal::Name(Name::from(name))
    }
}

impl From<Value> for Literal {
    fn from(value: Value) -> Self {
        Literal::Const(value)
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Const(Value::Int(n))
    }
}

impl From<Vec<Literal>> for Literal {
    fn from(items: Vec<Literal>) -> Self {
        Literal::List(items)
    }
}
