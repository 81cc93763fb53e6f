//! Path-condition store.
//!
//! [`ConstraintManager`] owns the ordered list of constraints collected
//! along one execution branch and keeps two invariants:
//!
//! - no stored constraint is a constant (true is dropped, false rejected);
//! - no stored constraint is a top-level `And` (conjunctions are split on
//!   insertion, so each element is an indivisible fact).
//!
//! # Equality propagation
//!
//! When an `Eq` between a constant and a non-constant expression is
//! inserted, every previously stored constraint is rewritten with the
//! non-constant side replaced by the constant. Constraints that change are
//! re-inserted through the same procedure, so a rewrite that produces a new
//! conjunction or a new constant equality cascades. This is one pass per
//! learned equality plus whatever the cascade triggers; it is not a global
//! fixpoint, and chains longer than one hop are only followed when a
//! re-insertion happens to learn the next link.
//!
//! Substitution is syntactic: the learned key is the exact sub-expression
//! on the non-constant side. Learning `(x + 1) == 10` says nothing about
//! bare `x`.
//!
//! # Forking
//!
//! The manager is `Clone`; a host forking a branch clones it. The
//! [`ExprArena`] is passed to every call and may be shared between branches.

use sym_expr::{ExprArena, ExprId, ExprNode, ExprRewriter, Kind, RewriteDriver, BOOL};
use sym_stack::ensure_sufficient_stack;
use tracing::{debug, trace};

use crate::error::ConstraintError;
use crate::shift::{extract_shifts, ShiftMap};
use crate::substitute::{Equalities, ReplaceMap, ReplaceOne};

/// Ordered conjunction of boolean constraints.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstraintManager {
    constraints: Vec<ExprId>,
}

impl ConstraintManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Stored constraints in insertion order.
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, ExprId>> {
        self.constraints.iter().copied()
    }

    pub fn as_slice(&self) -> &[ExprId] {
        &self.constraints
    }

    // Simplification

    /// Rewrite `e` using what the path condition already knows.
    ///
    /// Constant equalities substitute their constant for the non-constant
    /// side; every other stored constraint is replaced by `true` wherever it
    /// occurs. Does not modify the stored constraints.
    pub fn simplify_expr(&self, arena: &mut ExprArena, e: ExprId) -> ExprId {
        if arena.is_constant(e) {
            return e;
        }
        let equalities = self.equalities(arena);
        RewriteDriver::new(ReplaceMap::new(&equalities)).rewrite(arena, e)
    }

    fn equalities(&self, arena: &mut ExprArena) -> Equalities {
        let truth = arena.true_expr();
        let mut equalities = Equalities::default();
        for &constraint in &self.constraints {
            let (key, value) = constant_equality(arena, constraint).unwrap_or((constraint, truth));
            equalities.entry(key).or_insert(value);
        }
        equalities
    }

    // Insertion

    /// Add `e` to the path condition.
    ///
    /// # Panics
    /// If `e` is not boolean, or if it (or anything its insertion cascades
    /// into) is the constant false. Both mean the caller skipped a
    /// satisfiability check.
    pub fn add_constraint(&mut self, arena: &mut ExprArena, e: ExprId) {
        if let Err(err) = self.try_add_constraint(arena, e) {
            panic!("{err}: {}", arena.display(e));
        }
    }

    /// Checked form of [`add_constraint`](Self::add_constraint).
    ///
    /// On error the stored constraints are left exactly as they were before
    /// the call.
    pub fn try_add_constraint(
        &mut self,
        arena: &mut ExprArena,
        e: ExprId,
    ) -> Result<(), ConstraintError> {
        let width = arena.width(e);
        if width != BOOL {
            return Err(ConstraintError::NotBoolean { width });
        }
        if arena.is_false(e) {
            return Err(ConstraintError::FalseConstraint);
        }
        let simplified = self.simplify_expr(arena, e);
        self.atomically(|this| this.insert(arena, simplified))
    }

    /// Constrain `expr` to be one of `values`, returning the disjunction
    /// that was added.
    ///
    /// # Panics
    /// If `values` is empty, if a value does not fit the width of `expr`,
    /// or if the disjunction is false under the current path condition.
    pub fn add_disjunction(
        &mut self,
        arena: &mut ExprArena,
        expr: ExprId,
        values: &[u128],
    ) -> ExprId {
        let Some((&last, rest)) = values.split_last() else {
            panic!("disjunction over an empty set of values");
        };
        let width = arena.width(expr);
        if let Some(&value) = values
            .iter()
            .find(|&&value| value.checked_shr(width).is_some_and(|high| high != 0))
        {
            panic!("disjunction value {value} does not fit in {width} bits");
        }
        let mut disjunction = {
            let value = arena.constant(last, width);
            arena.eq(value, expr)
        };
        for &value in rest.iter().rev() {
            let value = arena.constant(value, width);
            let option = arena.eq(value, expr);
            disjunction = arena.or(option, disjunction);
        }
        self.add_constraint(arena, disjunction);
        disjunction
    }

    /// Rewrite every stored constraint with `driver`, re-inserting the ones
    /// that change. Returns whether anything changed.
    ///
    /// On error the stored constraints are left as they were.
    pub fn rewrite_constraints<V: ExprRewriter>(
        &mut self,
        arena: &mut ExprArena,
        driver: &mut RewriteDriver<V>,
    ) -> Result<bool, ConstraintError> {
        self.atomically(|this| this.rewrite_with(arena, driver))
            .map(|changed| changed > 0)
    }

    /// Run `f`, restoring the constraints if it fails.
    fn atomically<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ConstraintError>,
    ) -> Result<T, ConstraintError> {
        let snapshot = self.constraints.clone();
        let result = f(self);
        if result.is_err() {
            self.constraints = snapshot;
        }
        result
    }

    fn insert(&mut self, arena: &mut ExprArena, e: ExprId) -> Result<(), ConstraintError> {
        ensure_sufficient_stack(|| match arena.node(e) {
            ExprNode::Constant(c) if c.is_true() => Ok(()),
            ExprNode::Constant(_) => Err(ConstraintError::FalseConstraint),

            // split to keep every stored constraint indivisible
            ExprNode::Binary {
                kind: Kind::And,
                left,
                right,
            } => {
                self.insert(arena, left)?;
                self.insert(arena, right)
            }

            ExprNode::Compare { kind: Kind::Eq, .. } => {
                if let Some((expr, constant)) = constant_equality(arena, e) {
                    let mut driver = RewriteDriver::new(ReplaceOne::new(expr, constant));
                    let changed = self.rewrite_with(arena, &mut driver)?;
                    if changed > 0 {
                        debug!(
                            changed,
                            equality = %arena.display(e),
                            "propagated learned equality",
                        );
                    }
                }
                self.push(arena, e);
                Ok(())
            }

            _ => {
                self.push(arena, e);
                Ok(())
            }
        })
    }

    /// Rewrite all stored constraints, returning how many changed.
    fn rewrite_with<V: ExprRewriter>(
        &mut self,
        arena: &mut ExprArena,
        driver: &mut RewriteDriver<V>,
    ) -> Result<usize, ConstraintError> {
        let old = std::mem::take(&mut self.constraints);
        let mut changed = 0;
        for constraint in old {
            let rewritten = driver.rewrite(arena, constraint);
            if rewritten == constraint {
                self.constraints.push(constraint);
            } else {
                // re-insert to enable further reductions
                self.insert(arena, rewritten)?;
                changed += 1;
            }
        }
        Ok(changed)
    }

    fn push(&mut self, arena: &ExprArena, e: ExprId) {
        trace!(
            index = self.constraints.len(),
            constraint = %arena.display(e),
            "appending constraint",
        );
        self.constraints.push(e);
    }

    // Extraction

    /// Shift patterns of the `index`-th stored constraint.
    ///
    /// # Panics
    /// If `index` is out of range.
    pub fn shift_patterns(&self, arena: &ExprArena, index: usize) -> ShiftMap {
        extract_shifts(arena, self.constraints[index])
    }
}

impl<'a> IntoIterator for &'a ConstraintManager {
    type Item = ExprId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, ExprId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// `(non-constant side, constant side)` of an `Eq` with exactly one
/// constant operand.
fn constant_equality(arena: &ExprArena, e: ExprId) -> Option<(ExprId, ExprId)> {
    let ExprNode::Compare {
        kind: Kind::Eq,
        left,
        right,
    } = arena.node(e)
    else {
        return None;
    };
    match (arena.is_constant(left), arena.is_constant(right)) {
        (true, false) => Some((right, left)),
        (false, true) => Some((left, right)),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
