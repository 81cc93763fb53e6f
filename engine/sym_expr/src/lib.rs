//! Symbolic bitvector expressions.
//!
//! This crate contains the expression layer of the symbolic execution
//! engine:
//! - [`Kind`] and widths for the closed expression grammar
//! - [`ExprArena`], a hash-consed arena addressed by [`ExprId`]
//! - canonicalizing builders with constant folding
//! - the [`visitor`] rewrite framework
//! - an s-expression printer ([`ExprDisplay`])
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: structurally equal expressions share one `ExprId`
//! - **Flatten Everything**: no `Box<Expr>`/`Rc<Expr>`, children are indices
//! - **Explicit Context**: every operation takes the arena it works on;
//!   there is no global expression state

/// Compile-time assertion that a type has a specific size.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
mod constant;
mod display;
mod expr_id;
mod fold;
mod kind;
mod node;
pub mod visitor;

pub use arena::{Array, ExprArena};
pub use constant::Constant;
pub use display::ExprDisplay;
pub use expr_id::{ArrayId, ExprId};
pub use kind::{Kind, Width, BOOL, INT16, INT32, INT64, INT8, MAX_CONSTANT_WIDTH};
pub use node::{ExprNode, Kids};
pub use visitor::{Action, ExprRewriter, RewriteDriver};

static_assert_size!(ExprId, 4);
static_assert_size!(Kind, 1);
