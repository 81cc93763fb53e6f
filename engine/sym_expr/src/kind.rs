//! Expression kinds and widths.

use std::fmt;

/// Bit-width of an expression.
pub type Width = u32;

/// Width of boolean expressions (comparisons, constraints).
pub const BOOL: Width = 1;
/// Width of a single byte read from a symbolic array.
pub const INT8: Width = 8;
pub const INT16: Width = 16;
pub const INT32: Width = 32;
pub const INT64: Width = 64;
/// Widest constant the arena can fold.
pub const MAX_CONSTANT_WIDTH: Width = 128;

/// Expression kind discriminant.
///
/// Closed: every traversal in the engine matches on it exhaustively, so
/// adding a kind is a compile-checked change.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    // Primitive
    Constant,
    // Special
    NotOptimized,
    // Structural
    Read,
    Select,
    Concat,
    Extract,

    // Casting
    ZExt,
    SExt,

    // Arithmetic
    Add,
    Sub,
    Mul,
    UDiv,
    SDiv,
    URem,
    SRem,

    // Bit
    Not,
    And,
    Or,
    Xor,
    Shl,
    LShr,
    AShr,

    // Compare
    Eq,
    Ne,
    Ult,
    Ule,
    Ugt,
    Uge,
    Slt,
    Sle,
    Sgt,
    Sge,
}

impl Kind {
    /// All kinds, in declaration order.
    pub const ALL: [Kind; 32] = [
        Kind::Constant,
        Kind::NotOptimized,
        Kind::Read,
        Kind::Select,
        Kind::Concat,
        Kind::Extract,
        Kind::ZExt,
        Kind::SExt,
        Kind::Add,
        Kind::Sub,
        Kind::Mul,
        Kind::UDiv,
        Kind::SDiv,
        Kind::URem,
        Kind::SRem,
        Kind::Not,
        Kind::And,
        Kind::Or,
        Kind::Xor,
        Kind::Shl,
        Kind::LShr,
        Kind::AShr,
        Kind::Eq,
        Kind::Ne,
        Kind::Ult,
        Kind::Ule,
        Kind::Ugt,
        Kind::Uge,
        Kind::Slt,
        Kind::Sle,
        Kind::Sgt,
        Kind::Sge,
    ];

    /// Two-operand bitvector operation whose width is the operands' width.
    pub const fn is_binary(self) -> bool {
        matches!(
            self,
            Kind::Add
                | Kind::Sub
                | Kind::Mul
                | Kind::UDiv
                | Kind::SDiv
                | Kind::URem
                | Kind::SRem
                | Kind::And
                | Kind::Or
                | Kind::Xor
                | Kind::Shl
                | Kind::LShr
                | Kind::AShr
        )
    }

    /// Comparison producing a boolean.
    pub const fn is_compare(self) -> bool {
        matches!(
            self,
            Kind::Eq
                | Kind::Ne
                | Kind::Ult
                | Kind::Ule
                | Kind::Ugt
                | Kind::Uge
                | Kind::Slt
                | Kind::Sle
                | Kind::Sgt
                | Kind::Sge
        )
    }

    pub const fn is_cast(self) -> bool {
        matches!(self, Kind::ZExt | Kind::SExt)
    }

    pub const fn is_shift(self) -> bool {
        matches!(self, Kind::Shl | Kind::LShr | Kind::AShr)
    }

    /// Name used by the s-expression printer.
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Constant => "Constant",
            Kind::NotOptimized => "NotOptimized",
            Kind::Read => "Read",
            Kind::Select => "Select",
            Kind::Concat => "Concat",
            Kind::Extract => "Extract",
            Kind::ZExt => "ZExt",
            Kind::SExt => "SExt",
            Kind::Add => "Add",
            Kind::Sub => "Sub",
            Kind::Mul => "Mul",
            Kind::UDiv => "UDiv",
            Kind::SDiv => "SDiv",
            Kind::URem => "URem",
            Kind::SRem => "SRem",
            Kind::Not => "Not",
            Kind::And => "And",
            Kind::Or => "Or",
            Kind::Xor => "Xor",
            Kind::Shl => "Shl",
            Kind::LShr => "LShr",
            Kind::AShr => "AShr",
            Kind::Eq => "Eq",
            Kind::Ne => "Ne",
            Kind::Ult => "Ult",
            Kind::Ule => "Ule",
            Kind::Ugt => "Ugt",
            Kind::Uge => "Uge",
            Kind::Slt => "Slt",
            Kind::Sle => "Sle",
            Kind::Sgt => "Sgt",
            Kind::Sge => "Sge",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
