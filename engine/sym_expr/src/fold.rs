//! Constant evaluation used by the arena's canonicalizing builders.
//!
//! Every function here takes constants and returns the folded constant,
//! or `None` when the operation must stay symbolic (division by zero,
//! results wider than 128 bits).

use crate::constant::{mask, Constant};
use crate::kind::{Kind, Width, MAX_CONSTANT_WIDTH};

/// Evaluate a two-operand bitvector operation on equal-width constants.
pub(crate) fn binary(kind: Kind, a: Constant, b: Constant) -> Option<Constant> {
    debug_assert_eq!(a.width(), b.width());
    let width = a.width();
    let (x, y) = (a.value(), b.value());
    let value = match kind {
        Kind::Add => x.wrapping_add(y),
        Kind::Sub => x.wrapping_sub(y),
        Kind::Mul => x.wrapping_mul(y),
        Kind::UDiv => x.checked_div(y)?,
        Kind::URem => x.checked_rem(y)?,
        Kind::SDiv => {
            if y == 0 {
                return None;
            }
            return Some(Constant::from_signed(
                a.to_signed().wrapping_div(b.to_signed()),
                width,
            ));
        }
        Kind::SRem => {
            if y == 0 {
                return None;
            }
            return Some(Constant::from_signed(
                a.to_signed().wrapping_rem(b.to_signed()),
                width,
            ));
        }
        Kind::And => x & y,
        Kind::Or => x | y,
        Kind::Xor => x ^ y,
        Kind::Shl => match shift_amount(y, width) {
            Some(shift) => x << shift,
            None => 0,
        },
        Kind::LShr => match shift_amount(y, width) {
            Some(shift) => x >> shift,
            None => 0,
        },
        Kind::AShr => match shift_amount(y, width) {
            Some(shift) => return Some(Constant::from_signed(a.to_signed() >> shift, width)),
            None if a.sign_bit() => mask(width),
            None => 0,
        },
        _ => unreachable!("{kind} is not a binary bitvector operation"),
    };
    Some(Constant::new(value, width))
}

/// In-range shift amount, or `None` when shifting out every bit.
fn shift_amount(amount: u128, width: Width) -> Option<u32> {
    u32::try_from(amount).ok().filter(|&shift| shift < width)
}

/// Evaluate a comparison on equal-width constants.
pub(crate) fn compare(kind: Kind, a: Constant, b: Constant) -> bool {
    debug_assert_eq!(a.width(), b.width());
    let (x, y) = (a.value(), b.value());
    let (sx, sy) = (a.to_signed(), b.to_signed());
    match kind {
        Kind::Eq => x == y,
        Kind::Ne => x != y,
        Kind::Ult => x < y,
        Kind::Ule => x <= y,
        Kind::Ugt => x > y,
        Kind::Uge => x >= y,
        Kind::Slt => sx < sy,
        Kind::Sle => sx <= sy,
        Kind::Sgt => sx > sy,
        Kind::Sge => sx >= sy,
        _ => unreachable!("{kind} is not a comparison"),
    }
}

pub(crate) fn not(a: Constant) -> Constant {
    Constant::new(!a.value(), a.width())
}

/// `msb` occupies the high bits of the result.
pub(crate) fn concat(msb: Constant, lsb: Constant) -> Option<Constant> {
    let width = msb.width() + lsb.width();
    if width > MAX_CONSTANT_WIDTH {
        return None;
    }
    Some(Constant::new(
        (msb.value() << lsb.width()) | lsb.value(),
        width,
    ))
}

pub(crate) fn extract(a: Constant, offset: Width, width: Width) -> Constant {
    Constant::new(a.value() >> offset, width)
}

pub(crate) fn zext(a: Constant, width: Width) -> Option<Constant> {
    (width <= MAX_CONSTANT_WIDTH).then(|| Constant::new(a.value(), width))
}

pub(crate) fn sext(a: Constant, width: Width) -> Option<Constant> {
    (width <= MAX_CONSTANT_WIDTH).then(|| Constant::from_signed(a.to_signed(), width))
}
