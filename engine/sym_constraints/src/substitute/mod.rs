//! Equality-substitution rewriters.
//!
//! Both rewriters plug into [`RewriteDriver`](sym_expr::RewriteDriver):
//!
//! - [`ReplaceOne`] replaces a single expression by another, checking each
//!   node before and after its children are rewritten. The post check
//!   matters: rebuilding can create a node equal to `src` that did not
//!   exist anywhere in the original tree.
//! - [`ReplaceMap`] replaces any node found in a fixed equality map,
//!   strictly bottom-up. Each rebuilt node is looked up once; there is no
//!   fixpoint iteration inside a single rewrite.

use rustc_hash::FxHashMap;
use sym_expr::{Action, ExprArena, ExprId, ExprRewriter};

/// Known equalities: sub-expression to its replacement.
pub type Equalities = FxHashMap<ExprId, ExprId>;

/// Replace every occurrence of `src` by `dst`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ReplaceOne {
    src: ExprId,
    dst: ExprId,
}

impl ReplaceOne {
    pub fn new(src: ExprId, dst: ExprId) -> Self {
        Self { src, dst }
    }

    fn replace(&self, id: ExprId) -> Action {
        if id == self.src {
            Action::ChangeTo(self.dst)
        } else {
            Action::DoChildren
        }
    }
}

impl ExprRewriter for ReplaceOne {
    fn visit_expr(&mut self, _arena: &ExprArena, id: ExprId) -> Action {
        self.replace(id)
    }

    fn visit_expr_post(&mut self, _arena: &ExprArena, id: ExprId) -> Action {
        self.replace(id)
    }
}

/// Replace nodes that appear as keys of an equality map.
#[derive(Copy, Clone, Debug)]
pub struct ReplaceMap<'a> {
    equalities: &'a Equalities,
}

impl<'a> ReplaceMap<'a> {
    pub fn new(equalities: &'a Equalities) -> Self {
        Self { equalities }
    }
}

impl ExprRewriter for ReplaceMap<'_> {
    fn visit_expr_post(&mut self, _arena: &ExprArena, id: ExprId) -> Action {
        match self.equalities.get(&id) {
            Some(&replacement) => Action::ChangeTo(replacement),
            None => Action::SkipChildren,
        }
    }
}
