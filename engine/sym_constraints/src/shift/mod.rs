//! Shift-pattern extraction.
//!
//! Walks a constraint and records every `Shl` node as
//! `amount -> shifted operand`. Downstream address-pattern recognition
//! reads the map to spot scaled indexing (`base + (i << k)`).
//!
//! The walk is exhaustive and unmemoized: every child of every node is
//! visited, and a sub-expression reachable along several edges is visited
//! once per edge. Cost is proportional to the number of edges in the
//! expression DAG, which can be far larger than the number of nodes for
//! expressions built by repeated folding.
//!
//! When two shifts share an amount, the first one met in pre-order
//! (parent before children, left to right) wins.

use std::collections::BTreeMap;

use sym_expr::{ExprArena, ExprId, ExprNode, Kind};
use tracing::debug;

/// Shift amount to shifted operand.
pub type ShiftMap = BTreeMap<ExprId, ExprId>;

/// How the extractor treats a node kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PatternRole {
    /// `Shl`: recorded.
    ScaledIndex,
    /// `LShr`, `AShr`.
    RightShift,
    /// `Mul`, divisions and remainders.
    Multiplicative,
    /// `Add`, `Sub`.
    Additive,
    /// `Not`, `And`, `Or`, `Xor`.
    Bitwise,
    /// `ZExt`, `SExt`.
    Cast,
    /// All comparisons.
    Comparison,
    /// `Read`, `Select`, `Concat`, `Extract`, `NotOptimized`.
    Structural,
}

/// Classify a non-constant node kind.
///
/// # Panics
/// On [`Kind::Constant`]: constants are filtered out before dispatch.
pub fn classify(kind: Kind) -> PatternRole {
    match kind {
        Kind::Shl => PatternRole::ScaledIndex,
        Kind::LShr | Kind::AShr => PatternRole::RightShift,
        Kind::Mul | Kind::UDiv | Kind::SDiv | Kind::URem | Kind::SRem => {
            PatternRole::Multiplicative
        }
        Kind::Add | Kind::Sub => PatternRole::Additive,
        Kind::Not | Kind::And | Kind::Or | Kind::Xor => PatternRole::Bitwise,
        Kind::ZExt | Kind::SExt => PatternRole::Cast,
        Kind::Eq
        | Kind::Ne
        | Kind::Ult
        | Kind::Ule
        | Kind::Ugt
        | Kind::Uge
        | Kind::Slt
        | Kind::Sle
        | Kind::Sgt
        | Kind::Sge => PatternRole::Comparison,
        Kind::Read | Kind::Select | Kind::Concat | Kind::Extract | Kind::NotOptimized => {
            PatternRole::Structural
        }
        Kind::Constant => unreachable!("invalid expression kind: constants are not dispatched"),
    }
}

/// Accumulates shift patterns over one or more expressions.
#[derive(Debug, Default)]
pub struct ShiftExtractor {
    shifts: ShiftMap,
    stack: Vec<ExprId>,
}

impl ShiftExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shifts(&self) -> &ShiftMap {
        &self.shifts
    }

    pub fn into_shifts(self) -> ShiftMap {
        self.shifts
    }

    /// Walk `root`, adding its shifts to the map. Returns the number of
    /// non-constant nodes visited (edges followed, counting repeats).
    pub fn extract(&mut self, arena: &ExprArena, root: ExprId) -> usize {
        let mut visited = 0;
        self.stack.push(root);

        while let Some(id) = self.stack.pop() {
            if arena.is_constant(id) {
                continue;
            }
            visited += 1;

            let node = arena.node(id);
            if classify(node.kind()) == PatternRole::ScaledIndex {
                if let ExprNode::Binary { left, right, .. } = node {
                    self.shifts.entry(right).or_insert(left);
                }
            }
            // reversed so children pop left to right
            self.stack.extend(node.kids().iter().rev());
        }

        debug!(
            visited,
            entries = self.shifts.len(),
            "extracted shift patterns",
        );
        visited
    }
}

/// Shift patterns of a single expression.
pub fn extract_shifts(arena: &ExprArena, e: ExprId) -> ShiftMap {
    let mut extractor = ShiftExtractor::new();
    extractor.extract(arena, e);
    extractor.into_shifts()
}
