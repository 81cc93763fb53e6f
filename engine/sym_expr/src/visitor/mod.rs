//! Tree rewrite visitor.
//!
//! An [`ExprRewriter`] decides, per node, whether to replace the whole
//! subtree, leave it alone, or descend into its children. [`RewriteDriver`]
//! runs a rewriter over an expression and rebuilds only the nodes whose
//! children actually changed, so untouched subtrees keep their `ExprId`.
//!
//! # Traversal
//!
//! For each non-constant node `e` (constants are returned as-is and never
//! shown to the rewriter):
//!
//! 1. `visit_expr(e)`:
//!    - [`Action::ChangeTo`] → the replacement is the result.
//!    - [`Action::SkipChildren`] → `e` is the result.
//!    - [`Action::DoChildren`] → continue.
//! 2. Rewrite every child, left to right.
//! 3. If any child changed, `e' = rebuild(e, new_kids)`, else `e' = e`.
//! 4. If `e'` is not a constant, `visit_expr_post(e')`; a
//!    [`Action::ChangeTo`] replaces `e'`, anything else keeps it.
//!
//! Results are memoized by the original `ExprId` for the lifetime of the
//! driver, so a sub-expression shared by several parents (or by several
//! roots rewritten with the same driver) is rewritten once.
//!
//! The traversal runs on an explicit work-list; depth is bounded by heap,
//! not by the call stack.
//!
//! # Example
//!
//! ```text
//! struct ZeroReads;
//!
//! impl ExprRewriter for ZeroReads {
//!     fn visit_expr(&mut self, arena: &ExprArena, id: ExprId) -> Action {
//!         if arena.kind(id) == Kind::Read {
//!             Action::ChangeTo(zero)
//!         } else {
//!             Action::DoChildren
//!         }
//!     }
//! }
//!
//! let rewritten = RewriteDriver::new(ZeroReads).rewrite(&mut arena, root);
//! ```

use rustc_hash::FxHashMap;

use crate::arena::ExprArena;
use crate::expr_id::ExprId;
use crate::node::Kids;

/// What to do with a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Replace the node (and its whole subtree) with this expression.
    ChangeTo(ExprId),
    /// Keep the node unchanged without looking at its children.
    SkipChildren,
    /// Rewrite the children and rebuild if any of them changed.
    DoChildren,
}

/// Per-node rewrite hooks.
///
/// Both hooks default to leaving the node alone; implement one or both.
pub trait ExprRewriter {
    /// Called before the children of `id` are visited.
    fn visit_expr(&mut self, arena: &ExprArena, id: ExprId) -> Action {
        let _ = (arena, id);
        Action::DoChildren
    }

    /// Called on the rebuilt (or unchanged) node after its children.
    ///
    /// Only [`Action::ChangeTo`] has an effect here.
    fn visit_expr_post(&mut self, arena: &ExprArena, id: ExprId) -> Action {
        let _ = (arena, id);
        Action::SkipChildren
    }
}

impl<R: ExprRewriter + ?Sized> ExprRewriter for &mut R {
    fn visit_expr(&mut self, arena: &ExprArena, id: ExprId) -> Action {
        (**self).visit_expr(arena, id)
    }

    fn visit_expr_post(&mut self, arena: &ExprArena, id: ExprId) -> Action {
        (**self).visit_expr_post(arena, id)
    }
}

/// Work-list entry.
enum Frame {
    /// Visit a node for the first time.
    Enter(ExprId),
    /// All children of `id` have results on the result stack.
    Exit { id: ExprId, kids: Kids },
}

/// Runs an [`ExprRewriter`] and memoizes its results.
pub struct RewriteDriver<V> {
    visitor: V,
    cache: FxHashMap<ExprId, ExprId>,
    work: Vec<Frame>,
    results: Vec<ExprId>,
}

impl<V: ExprRewriter> RewriteDriver<V> {
    pub fn new(visitor: V) -> Self {
        Self {
            visitor,
            cache: FxHashMap::default(),
            work: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn visitor(&self) -> &V {
        &self.visitor
    }

    pub fn into_visitor(self) -> V {
        self.visitor
    }

    /// Number of distinct nodes with a memoized result.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Rewrite `root`, returning the (possibly identical) result.
    pub fn rewrite(&mut self, arena: &mut ExprArena, root: ExprId) -> ExprId {
        debug_assert!(self.work.is_empty() && self.results.is_empty());
        self.work.push(Frame::Enter(root));

        while let Some(frame) = self.work.pop() {
            match frame {
                Frame::Enter(id) => self.enter(arena, id),
                Frame::Exit { id, kids } => self.exit(arena, id, &kids),
            }
        }

        match (self.results.pop(), self.results.is_empty()) {
            (Some(result), true) => result,
            _ => unreachable!("rewrite must leave exactly one result"),
        }
    }

    fn enter(&mut self, arena: &ExprArena, id: ExprId) {
        if arena.is_constant(id) {
            self.results.push(id);
            return;
        }
        if let Some(&done) = self.cache.get(&id) {
            self.results.push(done);
            return;
        }
        match self.visitor.visit_expr(arena, id) {
            Action::ChangeTo(replacement) => self.finish(id, replacement),
            Action::SkipChildren => self.finish(id, id),
            Action::DoChildren => {
                let kids = arena.kids(id);
                let pending = kids.clone();
                self.work.push(Frame::Exit { id, kids });
                // reversed so the first child is rewritten first
                self.work
                    .extend(pending.iter().rev().map(|&kid| Frame::Enter(kid)));
            }
        }
    }

    fn exit(&mut self, arena: &mut ExprArena, id: ExprId, kids: &[ExprId]) {
        let start = self.results.len() - kids.len();
        let rebuilt = if self.results[start..] == *kids {
            id
        } else {
            let new_kids: Kids = self.results[start..].iter().copied().collect();
            arena.rebuild(id, &new_kids)
        };
        self.results.truncate(start);

        let result = if arena.is_constant(rebuilt) {
            rebuilt
        } else {
            match self.visitor.visit_expr_post(arena, rebuilt) {
                Action::ChangeTo(replacement) => replacement,
                Action::SkipChildren | Action::DoChildren => rebuilt,
            }
        };
        self.finish(id, result);
    }

    fn finish(&mut self, id: ExprId, result: ExprId) {
        self.cache.insert(id, result);
        self.results.push(result);
    }
}
