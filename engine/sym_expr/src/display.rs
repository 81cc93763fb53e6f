//! S-expression printer.
//!
//! ```text
//! (Eq w1 5 (Add w32 (Read w8 0 x) 1))
//! ```
//!
//! Constants print as decimal (`true`/`false` for booleans), reads as
//! `(Read w8 <index> <array>)`, extracts with their offset.
//!
//! A non-constant node reachable along more than one edge is printed in
//! full once, prefixed with a label, and by label afterwards:
//!
//! ```text
//! (Add w8 N0:(Read w8 0 a) N0)
//! ```
//!
//! Output size is linear in the number of distinct nodes, not in the number
//! of paths through the expression.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use sym_stack::ensure_sufficient_stack;

use crate::arena::ExprArena;
use crate::expr_id::ExprId;
use crate::kind::BOOL;
use crate::node::ExprNode;

/// Borrowed view of an expression that implements [`fmt::Display`].
#[derive(Copy, Clone)]
pub struct ExprDisplay<'a> {
    arena: &'a ExprArena,
    id: ExprId,
}

impl<'a> ExprDisplay<'a> {
    pub fn new(arena: &'a ExprArena, id: ExprId) -> Self {
        Self { arena, id }
    }
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Printer {
            arena: self.arena,
            shared: shared_nodes(self.arena, self.id),
            labels: FxHashMap::default(),
        }
        .print(f, self.id)
    }
}

impl fmt::Debug for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Non-constant nodes with more than one incoming edge under `root`.
fn shared_nodes(arena: &ExprArena, root: ExprId) -> FxHashSet<ExprId> {
    let mut seen = FxHashSet::default();
    let mut shared = FxHashSet::default();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        if arena.is_constant(id) {
            continue;
        }
        if !seen.insert(id) {
            shared.insert(id);
            continue;
        }
        stack.extend(arena.kids(id).iter());
    }
    shared
}

struct Printer<'a> {
    arena: &'a ExprArena,
    shared: FxHashSet<ExprId>,
    /// Labels handed out so far, in order of first occurrence.
    labels: FxHashMap<ExprId, usize>,
}

impl Printer<'_> {
    fn print(&mut self, f: &mut fmt::Formatter<'_>, id: ExprId) -> fmt::Result {
        if let Some(&label) = self.labels.get(&id) {
            return write!(f, "N{label}");
        }
        if self.shared.contains(&id) {
            let label = self.labels.len();
            self.labels.insert(id, label);
            write!(f, "N{label}:")?;
        }

        ensure_sufficient_stack(|| {
            let arena = self.arena;
            let node = arena.node(id);
            let width = arena.width(id);
            match node {
                ExprNode::Constant(c) if c.width() == BOOL => {
                    f.write_str(if c.is_true() { "true" } else { "false" })
                }
                ExprNode::Constant(c) => write!(f, "{}", c.value()),
                ExprNode::Read { array, index } => {
                    write!(f, "(Read w{width} ")?;
                    self.print(f, index)?;
                    write!(f, " {})", arena.array(array).name)
                }
                ExprNode::Extract { expr, offset, .. } => {
                    write!(f, "(Extract w{width} {offset} ")?;
                    self.print(f, expr)?;
                    f.write_str(")")
                }
                _ => {
                    write!(f, "({} w{width}", node.kind())?;
                    for kid in node.kids() {
                        f.write_str(" ")?;
                        self.print(f, kid)?;
                    }
                    f.write_str(")")
                }
            }
        })
    }
}
