//! Stack growth for deeply nested literals.
//!
//! A tuple of n stages folds into a chain of n nested `Sequence` nodes, and
//! parsing, compiling and running that chain all recurse once per stage.
//! On native targets `stacker` grows the stack on demand; wasm32 manages its
//! own stack and calls straight through.

/// Remaining stack below which a new segment is allocated (100KB).
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
#[cfg(not(target_arch = "wasm32"))]
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if it is close to exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
