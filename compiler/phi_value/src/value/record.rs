//! Keyed output of a branch-by-key stage.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::{Name, Value};

/// Mapping from branch key to the value that branch computed.
///
/// Ordered by key so display and comparison never depend on the order in
/// which branches were declared. Writes are copy-on-write: a record that
/// has been cloned into another value is never mutated behind its back.
#[derive(Clone, Default, PartialEq)]
pub struct Record {
    fields: Arc<BTreeMap<Name, Value>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<Name>, value: Value) -> Option<Value> {
        Arc::make_mut(&mut self.fields).insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        Arc::make_mut(&mut self.fields).remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Name> {
        self.fields.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<Name>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let fields = iter.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Record {
            fields: Arc::new(fields),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.fields.iter()).finish()
    }
}
