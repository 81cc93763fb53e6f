//! Fixed-width constant values.

use crate::kind::{Width, BOOL, MAX_CONSTANT_WIDTH};

/// A bitvector constant of up to 128 bits.
///
/// `value` is always masked to `width`; two constants are equal only if
/// both value and width match, so `1:w8` and `1:w32` intern separately.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Constant {
    value: u128,
    width: Width,
}

impl Constant {
    pub const TRUE: Constant = Constant {
        value: 1,
        width: BOOL,
    };
    pub const FALSE: Constant = Constant {
        value: 0,
        width: BOOL,
    };

    /// Create a constant, truncating `value` to `width` bits.
    ///
    /// # Panics
    /// If `width` is zero or wider than 128 bits.
    pub fn new(value: u128, width: Width) -> Self {
        assert!(
            width > 0 && width <= MAX_CONSTANT_WIDTH,
            "constant width {width} out of range 1..={MAX_CONSTANT_WIDTH}"
        );
        Constant {
            value: value & mask(width),
            width,
        }
    }

    pub const fn from_bool(value: bool) -> Self {
        if value {
            Self::TRUE
        } else {
            Self::FALSE
        }
    }

    #[inline]
    pub const fn value(self) -> u128 {
        self.value
    }

    #[inline]
    pub const fn width(self) -> Width {
        self.width
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.value == 0
    }

    /// Boolean true (width 1, value 1).
    #[inline]
    pub const fn is_true(self) -> bool {
        self.width == BOOL && self.value == 1
    }

    /// Boolean false (width 1, value 0).
    #[inline]
    pub const fn is_false(self) -> bool {
        self.width == BOOL && self.value == 0
    }

    /// Value of the most significant bit.
    #[inline]
    pub const fn sign_bit(self) -> bool {
        (self.value >> (self.width - 1)) & 1 == 1
    }

    /// Two's-complement interpretation, sign-extended to `i128`.
    #[expect(
        clippy::cast_possible_wrap,
        reason = "reinterpreting the sign-extended bit pattern is the point"
    )]
    pub fn to_signed(self) -> i128 {
        if self.sign_bit() {
            (self.value | !mask(self.width)) as i128
        } else {
            self.value as i128
        }
    }

    /// Build a constant from a signed value, wrapping into `width` bits.
    #[expect(
        clippy::cast_sign_loss,
        reason = "two's-complement bit pattern is truncated to width"
    )]
    pub fn from_signed(value: i128, width: Width) -> Self {
        Self::new(value as u128, width)
    }
}

/// All-ones mask for `width` bits (`width` in 1..=128).
#[inline]
pub(crate) const fn mask(width: Width) -> u128 {
    if width >= MAX_CONSTANT_WIDTH {
        u128::MAX
    } else {
        (1u128 << width) - 1
    }
}
