//! Contract violations of the constraint store.

use sym_expr::Width;

/// A constraint that can never be part of a path condition.
///
/// Callers are expected to check satisfiability with a solver before
/// adding a constraint; reaching one of these is a bug in the caller.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConstraintError {
    /// The constraint, or a constraint rewritten while inserting it, is
    /// the constant false.
    #[error("attempt to add invalid (false) constraint")]
    FalseConstraint,

    /// Constraints are boolean; this one has a wider bit-width.
    #[error("attempt to add a {width}-bit expression as a constraint")]
    NotBoolean { width: Width },
}
