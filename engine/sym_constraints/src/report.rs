//! Shift report over a whole path condition.
//!
//! Hosts call [`shift_report`] when an execution branch terminates to hand
//! the shift patterns of each stored constraint to address-pattern
//! analysis.

use sym_expr::{ExprArena, ExprId};
use tracing::debug;

use crate::manager::ConstraintManager;
use crate::shift::{ShiftExtractor, ShiftMap};

/// Shift patterns of one stored constraint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstraintShifts {
    /// Position in the path condition.
    pub index: usize,
    pub constraint: ExprId,
    pub shifts: ShiftMap,
}

/// Extract shift patterns from every constraint of `manager`, in order.
///
/// Each constraint gets its own map; constraints without shifts are
/// reported with an empty one.
pub fn shift_report(manager: &ConstraintManager, arena: &ExprArena) -> Vec<ConstraintShifts> {
    manager
        .iter()
        .enumerate()
        .map(|(index, constraint)| {
            debug!(
                index,
                constraint = %arena.display(constraint),
                "extracting shift patterns",
            );
            let mut extractor = ShiftExtractor::new();
            let visited = extractor.extract(arena, constraint);
            let shifts = extractor.into_shifts();
            debug!(index, visited, entries = shifts.len(), "shift patterns extracted",);
            ConstraintShifts {
                index,
                constraint,
                shifts,
            }
        })
        .collect()
}
