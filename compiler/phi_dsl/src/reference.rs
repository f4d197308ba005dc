//! Named mutable slots shared between compile time and run time.
//!
//! A `Reference` is created while compiling (or handed in by the caller),
//! captured by every `Read` and `Write` function that names it, and stays
//! alive for as long as anyone holds a clone. The caller typically keeps one
//! to inspect what a pipeline wrote after it ran.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use phi_value::{already_assigned, unassigned_reference, EvalResult, Name, Value};

/// What happens when an already-assigned reference is written again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Reassign {
    /// Later writes silently replace the stored value.
    #[default]
    Overwrite,
    /// Later writes fail with `AlreadyAssigned`.
    Reject,
}

struct Slot {
    name: Name,
    value: RwLock<Option<Value>>,
    reassign: Reassign,
}

/// A named slot that must be written before it can be read.
///
/// Clones share the slot. Identity is the slot, not the name: two
/// references created separately under the same name are distinct.
#[derive(Clone)]
pub struct Reference(Arc<Slot>);

impl Reference {
    /// Create an unassigned reference that accepts repeated writes.
    pub fn new(name: impl Into<Name>) -> Self {
        Self::with_policy(name, Reassign::Overwrite)
    }

    /// Create an unassigned reference that rejects a second write.
    pub fn write_once(name: impl Into<Name>) -> Self {
        Self::with_policy(name, Reassign::Reject)
    }

    pub fn with_policy(name: impl Into<Name>, reassign: Reassign) -> Self {
        Reference(Arc::new(Slot {
            name: name.into(),
            value: RwLock::new(None),
            reassign,
        }))
    }

    /// Create a reference that is already assigned.
    pub fn with_value(name: impl Into<Name>, value: Value) -> Self {
        Reference(Arc::new(Slot {
            name: name.into(),
            value: RwLock::new(Some(value)),
            reassign: Reassign::Overwrite,
        }))
    }

    #[inline]
    pub fn name(&self) -> &Name {
        &self.0.name
    }

    #[inline]
    pub fn reassign(&self) -> Reassign {
        self.0.reassign
    }

    pub fn is_assigned(&self) -> bool {
        self.0.value.read().is_some()
    }

    /// The current value, if any write has happened.
    pub fn value(&self) -> Option<Value> {
        self.0.value.read().clone()
    }

    /// Read the most recent value.
    pub fn get(&self) -> EvalResult {
        self.value().ok_or_else(|| unassigned_reference(&self.0.name))
    }

    /// Store `value` and hand it back unchanged.
    pub fn set(&self, value: Value) -> EvalResult {
        let mut slot = self.0.value.write();
        if slot.is_some() && self.0.reassign == Reassign::Reject {
            return Err(already_assigned(&self.0.name));
        }
        *slot = Some(value.clone());
        Ok(value)
    }

    /// Whether both handles share the same slot.
    pub fn ptr_eq(&self, other: &Reference) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared slot, stable while any handle is alive.
    pub(crate) fn slot_id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference")
            .field("name", &self.0.name)
            .field("value", &*self.0.value.read())
            .finish()
    }
}
