//! Runtime values flowing through compiled pipelines.
//!
//! Heap variants are `Arc`-backed. Parallel branches receive clones of the
//! same input, so cloning must stay cheap.
//!
//! ```text
//! let s = Value::string("hello");
//! let pair = Value::list(vec![Value::int(1), Value::int(2)]);
//! ```

mod record;

use std::fmt;
use std::sync::Arc;

pub use record::Record;

use crate::{type_mismatch, EvalError, SharedResource};

/// A runtime value.
#[derive(Clone, Default)]
pub enum Value {
    /// The unit value.
    #[default]
    Void,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    /// Ordered sequence; the aggregate output of parallel branches.
    List(Arc<Vec<Value>>),
    /// Keyed output of a branch-by-key stage.
    Record(Record),
    /// A scoped resource handle. Compared by identity.
    Resource(SharedResource),
}

impl Value {
    #[inline]
    pub fn int(n: i64) -> Self {
        Value::Int(n)
    }

    #[inline]
    pub fn float(x: f64) -> Self {
        Value::Float(x)
    }

    #[inline]
    pub fn bool(b: bool) -> Self {
        Value::Bool(b)
    }

    pub fn string(s: impl AsRef<str>) -> Self {
        Value::Str(Arc::from(s.as_ref()))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(items))
    }

    pub fn record(record: Record) -> Self {
        Value::Record(record)
    }

    pub fn resource(resource: SharedResource) -> Self {
        Value::Resource(resource)
    }

    /// Short name of the value's shape, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Record(_) => "record",
            Value::Resource(_) => "resource",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Extract an integer or fail with a type mismatch.
    ///
    /// Convenience for user callables that only accept integers.
    pub fn expect_int(&self) -> Result<i64, EvalError> {
        self.as_int().ok_or_else(|| type_mismatch("int", self))
    }

    /// Extract a list or fail with a type mismatch.
    pub fn expect_list(&self) -> Result<&[Value], EvalError> {
        self.as_list().ok_or_else(|| type_mismatch("list", self))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Resource(a), Value::Resource(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => f.write_str("void"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Record(record) => write!(f, "{record}"),
            Value::Resource(resource) => write!(f, "<resource {resource:?}>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => f.write_str("Void"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(x) => write!(f, "Float({x:?})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::List(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Record(record) => write!(f, "{record:?}"),
            Value::Resource(resource) => write!(f, "Resource({resource:?})"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Void
    }
}
