//! Hash-consed expression arena.
//!
//! [`ExprArena`] stores every expression node once. Nodes are addressed by
//! [`ExprId`] and deduplicated through an interning table keyed by the node
//! itself (kind, children, immediates), so structural equality and `ExprId`
//! equality coincide. Rewriters rely on this for cache hits and for
//! recognising a sub-expression by a single integer compare.
//!
//! # Layout
//!
//! Struct-of-arrays: `nodes` and `widths` are parallel vectors indexed by
//! `ExprId`. Children are always interned before their parents, so the
//! expression graph is acyclic by construction.
//!
//! # Canonicalization
//!
//! All builders (and [`ExprArena::rebuild`]) canonicalize before interning:
//! constant operands fold, `Eq` keeps a lone constant on the left, and a few
//! identities collapse (`Add` with zero, boolean `And`/`Or` with a constant,
//! `Select` on a constant condition, no-op casts and extracts). A builder
//! returns either a constant, one of its operands, or a node whose children
//! are exactly its operands; it never invents intermediate nodes.

use rustc_hash::FxHashMap;

use crate::constant::Constant;
use crate::display::ExprDisplay;
use crate::expr_id::{ArrayId, ExprId};
use crate::fold;
use crate::kind::{Kind, Width, BOOL, INT32, INT8};
use crate::node::{ExprNode, Kids};

/// A named symbolic array. Reads from it produce bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Array {
    pub name: String,
    /// Size in bytes.
    pub size: u32,
}

/// Convert a `usize` length to `u32`, panicking on overflow.
fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("too many {what}: {len} exceeds u32::MAX"))
}

/// Arena of interned expressions.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    /// Node shapes (parallel with `widths`).
    nodes: Vec<ExprNode>,
    /// Bit-widths (parallel with `nodes`).
    widths: Vec<Width>,
    /// Structural interning table.
    interned: FxHashMap<ExprNode, ExprId>,
    /// Registered symbolic arrays, indexed by `ArrayId`.
    arrays: Vec<Array>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an arena pre-allocated for about `nodes` expressions.
    pub fn with_capacity(nodes: usize) -> Self {
        let mut interned = FxHashMap::default();
        interned.reserve(nodes);
        Self {
            nodes: Vec::with_capacity(nodes),
            widths: Vec::with_capacity(nodes),
            interned,
            arrays: Vec::new(),
        }
    }

    /// Number of distinct interned nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // Accessors

    #[inline]
    pub fn node(&self, id: ExprId) -> ExprNode {
        self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> Kind {
        self.nodes[id.index()].kind()
    }

    #[inline]
    pub fn width(&self, id: ExprId) -> Width {
        self.widths[id.index()]
    }

    pub fn kids(&self, id: ExprId) -> Kids {
        self.nodes[id.index()].kids()
    }

    pub fn num_kids(&self, id: ExprId) -> usize {
        self.nodes[id.index()].num_kids()
    }

    /// The `i`-th child of `id`.
    ///
    /// # Panics
    /// If `i` is out of range for the node's arity.
    pub fn kid(&self, id: ExprId, i: usize) -> ExprId {
        let kids = self.kids(id);
        match kids.get(i) {
            Some(&kid) => kid,
            None => panic!("{} has {} children, no child {i}", self.kind(id), kids.len()),
        }
    }

    #[inline]
    pub fn is_constant(&self, id: ExprId) -> bool {
        matches!(self.nodes[id.index()], ExprNode::Constant(_))
    }

    #[inline]
    pub fn as_constant(&self, id: ExprId) -> Option<Constant> {
        match self.nodes[id.index()] {
            ExprNode::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_true(&self, id: ExprId) -> bool {
        self.as_constant(id).is_some_and(Constant::is_true)
    }

    pub fn is_false(&self, id: ExprId) -> bool {
        self.as_constant(id).is_some_and(Constant::is_false)
    }

    pub fn array(&self, id: ArrayId) -> &Array {
        &self.arrays[id.index()]
    }

    /// Printable view of an expression.
    pub fn display(&self, id: ExprId) -> ExprDisplay<'_> {
        ExprDisplay::new(self, id)
    }

    // Interning

    fn intern(&mut self, node: ExprNode, width: Width) -> ExprId {
        if let Some(&id) = self.interned.get(&node) {
            return id;
        }
        let id = ExprId::new(to_u32(self.nodes.len(), "expressions"));
        self.nodes.push(node);
        self.widths.push(width);
        self.interned.insert(node, id);
        id
    }

    fn check_width(&self, id: ExprId, expected: Width, role: &str) {
        let actual = self.width(id);
        assert!(
            actual == expected,
            "width mismatch: {role} has width {actual}, expected {expected}"
        );
    }

    // Leaves

    pub fn constant(&mut self, value: u128, width: Width) -> ExprId {
        self.constant_of(Constant::new(value, width))
    }

    pub fn constant_of(&mut self, c: Constant) -> ExprId {
        self.intern(ExprNode::Constant(c), c.width())
    }

    pub fn bool(&mut self, value: bool) -> ExprId {
        self.constant_of(Constant::from_bool(value))
    }

    pub fn true_expr(&mut self) -> ExprId {
        self.bool(true)
    }

    pub fn false_expr(&mut self) -> ExprId {
        self.bool(false)
    }

    /// Register a symbolic array of `size` bytes.
    pub fn new_array(&mut self, name: impl Into<String>, size: u32) -> ArrayId {
        let id = ArrayId::new(to_u32(self.arrays.len(), "arrays"));
        self.arrays.push(Array {
            name: name.into(),
            size,
        });
        id
    }

    /// Read one byte of `array` at `index`.
    pub fn read(&mut self, array: ArrayId, index: ExprId) -> ExprId {
        assert!(
            array.index() < self.arrays.len(),
            "read from unregistered {array:?}"
        );
        self.intern(ExprNode::Read { array, index }, INT8)
    }

    /// A fresh symbolic value of `width` bits named `name`.
    ///
    /// Backed by a new array of `width / 8` bytes, assembled little-endian
    /// (byte 0 is the least significant).
    ///
    /// # Panics
    /// If `width` is not a positive multiple of 8.
    pub fn symbol(&mut self, name: impl Into<String>, width: Width) -> ExprId {
        assert!(
            width > 0 && width % 8 == 0,
            "symbol width {width} is not a whole number of bytes"
        );
        let bytes = width / 8;
        let array = self.new_array(name, bytes);
        let first = self.constant(0, INT32);
        let mut value = self.read(array, first);
        for byte in 1..bytes {
            let index = self.constant(u128::from(byte), INT32);
            let read = self.read(array, index);
            value = self.concat(read, value);
        }
        value
    }

    // Structural

    /// Opaque wrapper; never folded.
    pub fn not_optimized(&mut self, src: ExprId) -> ExprId {
        let width = self.width(src);
        self.intern(ExprNode::NotOptimized { src }, width)
    }

    pub fn select(&mut self, cond: ExprId, on_true: ExprId, on_false: ExprId) -> ExprId {
        self.check_width(cond, BOOL, "select condition");
        let width = self.width(on_true);
        self.check_width(on_false, width, "select false branch");
        if let Some(c) = self.as_constant(cond) {
            return if c.is_true() { on_true } else { on_false };
        }
        if on_true == on_false {
            return on_true;
        }
        self.intern(
            ExprNode::Select {
                cond,
                on_true,
                on_false,
            },
            width,
        )
    }

    /// `msb` occupies the high bits.
    pub fn concat(&mut self, msb: ExprId, lsb: ExprId) -> ExprId {
        if let (Some(a), Some(b)) = (self.as_constant(msb), self.as_constant(lsb)) {
            if let Some(c) = fold::concat(a, b) {
                return self.constant_of(c);
            }
        }
        let width = self.width(msb) + self.width(lsb);
        self.intern(ExprNode::Concat { msb, lsb }, width)
    }

    pub fn extract(&mut self, expr: ExprId, offset: Width, width: Width) -> ExprId {
        let src_width = self.width(expr);
        assert!(
            width > 0 && offset + width <= src_width,
            "extract of {width} bits at offset {offset} from {src_width}-bit expression"
        );
        if offset == 0 && width == src_width {
            return expr;
        }
        if let Some(c) = self.as_constant(expr) {
            return self.constant_of(fold::extract(c, offset, width));
        }
        self.intern(
            ExprNode::Extract {
                expr,
                offset,
                width,
            },
            width,
        )
    }

    pub fn zext(&mut self, src: ExprId, width: Width) -> ExprId {
        self.cast(Kind::ZExt, src, width)
    }

    pub fn sext(&mut self, src: ExprId, width: Width) -> ExprId {
        self.cast(Kind::SExt, src, width)
    }

    fn cast(&mut self, kind: Kind, src: ExprId, width: Width) -> ExprId {
        let src_width = self.width(src);
        assert!(
            width >= src_width,
            "{kind} from {src_width} bits to narrower {width} bits"
        );
        if width == src_width {
            return src;
        }
        if let Some(c) = self.as_constant(src) {
            let folded = if kind == Kind::ZExt {
                fold::zext(c, width)
            } else {
                fold::sext(c, width)
            };
            if let Some(folded) = folded {
                return self.constant_of(folded);
            }
        }
        let node = if kind == Kind::ZExt {
            ExprNode::ZExt { src, width }
        } else {
            ExprNode::SExt { src, width }
        };
        self.intern(node, width)
    }

    // Operators

    pub fn not(&mut self, expr: ExprId) -> ExprId {
        if let Some(c) = self.as_constant(expr) {
            return self.constant_of(fold::not(c));
        }
        let width = self.width(expr);
        self.intern(ExprNode::Not { expr }, width)
    }

    /// Two-operand bitvector operation (`kind.is_binary()`).
    ///
    /// # Panics
    /// If `kind` is not a binary operation or the operand widths differ.
    pub fn binary(&mut self, kind: Kind, left: ExprId, right: ExprId) -> ExprId {
        assert!(kind.is_binary(), "{kind} is not a binary operation");
        let width = self.width(left);
        self.check_width(right, width, "right operand");

        let lc = self.as_constant(left);
        let rc = self.as_constant(right);
        if let (Some(a), Some(b)) = (lc, rc) {
            if let Some(c) = fold::binary(kind, a, b) {
                return self.constant_of(c);
            }
        }

        match kind {
            Kind::Add => {
                if lc.is_some_and(Constant::is_zero) {
                    return right;
                }
                if rc.is_some_and(Constant::is_zero) {
                    return left;
                }
            }
            Kind::And | Kind::Or if width == BOOL => {
                let known = match (lc, rc) {
                    (Some(c), None) => Some((c, right)),
                    (None, Some(c)) => Some((c, left)),
                    _ => None,
                };
                if let Some((c, other)) = known {
                    // identity keeps `other`; annihilator is the constant itself
                    let identity = (kind == Kind::And) == c.is_true();
                    return if identity {
                        other
                    } else {
                        self.constant_of(c)
                    };
                }
            }
            _ => {}
        }

        self.intern(ExprNode::Binary { kind, left, right }, width)
    }

    /// Comparison (`kind.is_compare()`), producing a boolean.
    ///
    /// # Panics
    /// If `kind` is not a comparison or the operand widths differ.
    pub fn compare(&mut self, kind: Kind, left: ExprId, right: ExprId) -> ExprId {
        assert!(kind.is_compare(), "{kind} is not a comparison");
        let width = self.width(left);
        self.check_width(right, width, "right operand");

        let lc = self.as_constant(left);
        let rc = self.as_constant(right);
        if let (Some(a), Some(b)) = (lc, rc) {
            return self.bool(fold::compare(kind, a, b));
        }

        let (left, right) = if kind == Kind::Eq && lc.is_none() && rc.is_some() {
            (right, left)
        } else {
            (left, right)
        };
        if kind == Kind::Eq && left == right {
            return self.true_expr();
        }

        self.intern(ExprNode::Compare { kind, left, right }, BOOL)
    }

    pub fn add(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.binary(Kind::Add, l, r)
    }

    pub fn sub(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.binary(Kind::Sub, l, r)
    }

    pub fn mul(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.binary(Kind::Mul, l, r)
    }

    pub fn udiv(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.binary(Kind::UDiv, l, r)
    }

    pub fn sdiv(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.binary(Kind::SDiv, l, r)
    }

    pub fn urem(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.binary(Kind::URem, l, r)
    }

    pub fn srem(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.binary(Kind::SRem, l, r)
    }

    pub fn and(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.binary(Kind::And, l, r)
    }

    pub fn or(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.binary(Kind::Or, l, r)
    }

    pub fn xor(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.binary(Kind::Xor, l, r)
    }

    pub fn shl(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.binary(Kind::Shl, l, r)
    }

    pub fn lshr(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.binary(Kind::LShr, l, r)
    }

    pub fn ashr(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.binary(Kind::AShr, l, r)
    }

    pub fn eq(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.compare(Kind::Eq, l, r)
    }

    pub fn ne(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.compare(Kind::Ne, l, r)
    }

    pub fn ult(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.compare(Kind::Ult, l, r)
    }

    pub fn ule(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.compare(Kind::Ule, l, r)
    }

    pub fn ugt(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.compare(Kind::Ugt, l, r)
    }

    pub fn uge(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.compare(Kind::Uge, l, r)
    }

    pub fn slt(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.compare(Kind::Slt, l, r)
    }

    pub fn sle(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.compare(Kind::Sle, l, r)
    }

    pub fn sgt(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.compare(Kind::Sgt, l, r)
    }

    pub fn sge(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.compare(Kind::Sge, l, r)
    }

    // Rebuild

    /// Rebuild `id` with `kids` substituted for its children, keeping its
    /// kind and immediates. The result is canonicalized and interned, so it
    /// may fold to a constant or collapse to one of `kids`.
    ///
    /// # Panics
    /// If `kids.len()` differs from the node's arity.
    pub fn rebuild(&mut self, id: ExprId, kids: &[ExprId]) -> ExprId {
        let node = self.node(id);
        assert!(
            kids.len() == node.num_kids(),
            "rebuild of {} with {} children, expected {}",
            node.kind(),
            kids.len(),
            node.num_kids()
        );
        match node {
            ExprNode::Constant(_) => id,
            ExprNode::NotOptimized { .. } => self.not_optimized(kids[0]),
            ExprNode::Read { array, .. } => self.read(array, kids[0]),
            ExprNode::Select { .. } => self.select(kids[0], kids[1], kids[2]),
            ExprNode::Concat { .. } => self.concat(kids[0], kids[1]),
            ExprNode::Extract { offset, width, .. } => self.extract(kids[0], offset, width),
            ExprNode::ZExt { width, .. } => self.zext(kids[0], width),
            ExprNode::SExt { width, .. } => self.sext(kids[0], width),
            ExprNode::Not { .. } => self.not(kids[0]),
            ExprNode::Binary { kind, .. } => self.binary(kind, kids[0], kids[1]),
            ExprNode::Compare { kind, .. } => self.compare(kind, kids[0], kids[1]),
        }
    }
}
