//! Expression node shapes.

use smallvec::{smallvec, SmallVec};

use crate::constant::Constant;
use crate::expr_id::{ArrayId, ExprId};
use crate::kind::{Kind, Width};

/// Children of a node, in operand order. No node has more than three.
pub type Kids = SmallVec<[ExprId; 3]>;

/// One interned expression node.
///
/// Nodes are the interning key: the arena maps each distinct `ExprNode`
/// to exactly one [`ExprId`]. Immediates that are not children (extract
/// offset, cast width, array) are part of the key.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ExprNode {
    Constant(Constant),
    /// Opaque wrapper that blocks rewriting-time folding of its operand.
    NotOptimized {
        src: ExprId,
    },
    /// One byte of a symbolic array.
    Read {
        array: ArrayId,
        index: ExprId,
    },
    Select {
        cond: ExprId,
        on_true: ExprId,
        on_false: ExprId,
    },
    Concat {
        msb: ExprId,
        lsb: ExprId,
    },
    Extract {
        expr: ExprId,
        offset: Width,
        width: Width,
    },
    ZExt {
        src: ExprId,
        width: Width,
    },
    SExt {
        src: ExprId,
        width: Width,
    },
    Not {
        expr: ExprId,
    },
    /// Arithmetic, bitwise and shift operations (`Kind::is_binary`).
    Binary {
        kind: Kind,
        left: ExprId,
        right: ExprId,
    },
    /// Comparisons (`Kind::is_compare`); always boolean.
    Compare {
        kind: Kind,
        left: ExprId,
        right: ExprId,
    },
}

impl ExprNode {
    pub fn kind(&self) -> Kind {
        match *self {
            ExprNode::Constant(_) => Kind::Constant,
            ExprNode::NotOptimized { .. } => Kind::NotOptimized,
            ExprNode::Read { .. } => Kind::Read,
            ExprNode::Select { .. } => Kind::Select,
            ExprNode::Concat { .. } => Kind::Concat,
            ExprNode::Extract { .. } => Kind::Extract,
            ExprNode::ZExt { .. } => Kind::ZExt,
            ExprNode::SExt { .. } => Kind::SExt,
            ExprNode::Not { .. } => Kind::Not,
            ExprNode::Binary { kind, .. } | ExprNode::Compare { kind, .. } => kind,
        }
    }

    /// Children in operand order.
    pub fn kids(&self) -> Kids {
        match *self {
            ExprNode::Constant(_) => SmallVec::new(),
            ExprNode::NotOptimized { src }
            | ExprNode::ZExt { src, .. }
            | ExprNode::SExt { src, .. } => smallvec![src],
            ExprNode::Read { index, .. } => smallvec![index],
            ExprNode::Extract { expr, .. } | ExprNode::Not { expr } => smallvec![expr],
            ExprNode::Select {
                cond,
                on_true,
                on_false,
            } => smallvec![cond, on_true, on_false],
            ExprNode::Concat { msb, lsb } => smallvec![msb, lsb],
            ExprNode::Binary { left, right, .. } | ExprNode::Compare { left, right, .. } => {
                smallvec![left, right]
            }
        }
    }

    pub fn num_kids(&self) -> usize {
        match self {
            ExprNode::Constant(_) => 0,
            ExprNode::NotOptimized { .. }
            | ExprNode::Read { .. }
            | ExprNode::Extract { .. }
            | ExprNode::ZExt { .. }
            | ExprNode::SExt { .. }
            | ExprNode::Not { .. } => 1,
            ExprNode::Concat { .. } | ExprNode::Binary { .. } | ExprNode::Compare { .. } => 2,
            ExprNode::Select { .. } => 3,
        }
    }
}
