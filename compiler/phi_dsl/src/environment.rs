//! Compile-time mapping from names to references.
//!
//! Environments are values: every operation that adds a reference returns a
//! new environment and leaves the receiver untouched. The map itself is
//! shared behind an `Arc` and only copied when an extension actually
//! happens, so threading an environment through a large literal is cheap.

use std::sync::Arc;

use phi_value::Name;
use rustc_hash::FxHashMap;

use crate::{Reassign, Reference};

/// Where a `Write` stores its input.
#[derive(Clone, Debug)]
pub enum WriteTarget {
    /// Reuse the reference bound to this name, or declare a fresh one.
    Name(Name),
    /// Write to this exact reference.
    Ref(Reference),
}

impl WriteTarget {
    pub fn name(&self) -> &Name {
        match self {
            WriteTarget::Name(name) => name,
            WriteTarget::Ref(reference) => reference.name(),
        }
    }
}

/// Names visible to the literal being compiled.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    refs: Arc<FxHashMap<Name, Reference>>,
    /// Policy for references declared implicitly by a write.
    reassign: Reassign,
}

impl Environment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Same bindings, with a different policy for implicitly declared references.
    #[must_use]
    pub fn with_reassign(mut self, reassign: Reassign) -> Self {
        self.reassign = reassign;
        self
    }

    pub fn reassign(&self) -> Reassign {
        self.reassign
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Reference> {
        self.refs.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.refs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.refs.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Reference)> {
        self.refs.iter()
    }

    /// Bind `reference` under its name unless that name is already bound.
    #[must_use]
    pub fn declare(&self, reference: Reference) -> Environment {
        if self.contains(reference.name().as_str()) {
            return self.clone();
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.refs).insert(reference.name().clone(), reference);
        next
    }

    /// Resolve a write target to a concrete reference.
    ///
    /// A name already bound resolves to its reference. An unbound name
    /// declares a fresh reference. An explicit reference is always the one
    /// written; it is bound only if its name is not taken.
    pub fn declare_or_reuse(&self, target: &WriteTarget) -> (Reference, Environment) {
        match target {
            WriteTarget::Name(name) => {
                if let Some(existing) = self.get(name.as_str()) {
                    return (existing.clone(), self.clone());
                }
                tracing::debug!(name = %name, "declaring reference");
                let fresh = Reference::with_policy(name.clone(), self.reassign);
                let next = self.declare(fresh.clone());
                (fresh, next)
            }
            WriteTarget::Ref(reference) => (reference.clone(), self.declare(reference.clone())),
        }
    }

    /// Union of both environments; bindings in `other` win on conflict.
    #[must_use]
    pub fn merged(&self, other: &Environment) -> Environment {
        if Arc::ptr_eq(&self.refs, &other.refs) {
            return self.clone();
        }
        let mut next = self.clone();
        let refs = Arc::make_mut(&mut next.refs);
        for (name, reference) in other.iter() {
            refs.insert(name.clone(), reference.clone());
        }
        next
    }
}

impl FromIterator<Reference> for Environment {
    fn from_iter<I: IntoIterator<Item = Reference>>(iter: I) -> Self {
        let refs = iter
            .into_iter()
            .map(|reference| (reference.name().clone(), reference))
            .collect();
        Environment {
            refs: Arc::new(refs),
            reassign: Reassign::default(),
        }
    }
}
