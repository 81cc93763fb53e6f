//! Path-condition management for the symbolic execution engine.
//!
//! This crate provides:
//!
//! - **Constraint store** ([`ConstraintManager`]): the ordered conjunction
//!   of boolean facts collected along one execution branch, with
//!   conjunction splitting and propagation of learned constant equalities
//!   into earlier constraints.
//!
//! - **Simplification** ([`ConstraintManager::simplify_expr`]): rewrites an
//!   expression under the current path condition by substituting known
//!   constant values and replacing known facts with `true`.
//!
//! - **Shift-pattern extraction** ([`shift`], [`report`]): collects
//!   `amount -> operand` pairs from `Shl` nodes for address-pattern
//!   analysis.
//!
//! # Crate Dependencies
//!
//! `sym_constraints` depends on `sym_expr` for the expression arena and the
//! rewrite framework, and on `sym_stack` to bound recursion during
//! insertion. Satisfiability is out of scope: callers check with a solver
//! before adding a constraint.

mod error;
mod manager;
pub mod report;
pub mod shift;
pub mod substitute;

pub use error::ConstraintError;
pub use manager::ConstraintManager;
pub use report::{shift_report, ConstraintShifts};
pub use shift::{extract_shifts, ShiftExtractor, ShiftMap};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `fmt` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset or unparsable, or when the host
/// already installed a global subscriber. Only the first call has any
/// effect. Use `RUST_LOG=sym_constraints=debug` for propagation and shift
/// summaries, `=trace` to also see every appended constraint.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Ok(filter) = EnvFilter::try_from_default_env() else {
            return;
        };
        let installed = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_test_writer())
            .with(filter)
            .try_init();
        if installed.is_err() {
            tracing::debug!("global subscriber already set, keeping it");
        }
    });
}
