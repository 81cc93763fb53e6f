//! Stack safety for the recursive parts of the constraint engine.
//!
//! Expression traversals (rewriting, shift extraction) run on explicit
//! work-lists, but two paths stay naturally recursive:
//!
//! - constraint insertion, which splits nested conjunctions and re-inserts
//!   constraints rewritten by a newly learned equality;
//! - the s-expression printer used by logs and reports.
//!
//! Both recurse once per level of expression nesting, and symbolic
//! execution routinely folds thousands of instructions into one expression.
//! Wrap those recursive calls in [`ensure_sufficient_stack`].
//!
//! # Platform Support
//!
//! - **Native targets**: `stacker` grows the stack on demand.
//! - **WASM targets**: passthrough.
//!
//! # Configuration
//!
//! - **Red zone**: 100KB. Below this, a new segment is allocated.
//! - **Growth size**: 1MB per new segment.

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// ```text
/// fn insert(&mut self, arena: &mut ExprArena, e: ExprId) -> Result<(), ConstraintError> {
///     ensure_sufficient_stack(|| match arena.node(e) {
///         ExprNode::Binary { kind: Kind::And, left, right } => {
///             self.insert(arena, left)?;
///             self.insert(arena, right)
///         }
///         _ => { /* ... */ }
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version: call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
