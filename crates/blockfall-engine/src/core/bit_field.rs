use std::{
    fmt::{self, Write as _},
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Shl, Shr},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

const LIMB_BITS: usize = u64::BITS as usize;
const HEX_DIGITS_PER_LIMB: usize = LIMB_BITS / 4;

/// Arbitrary-width unsigned integer used as a bit set.
///
/// Both the 400-bit piece buffer and the board buffer (6500 visible bits plus the
/// spawn rows above them) are stored in this type. The value grows when shifted
/// left and loses bits when shifted right; nothing is truncated silently.
///
/// # Representation
///
/// Limbs are stored in little-endian order (`limbs[0]` holds bits 0-63). The
/// vector is kept normalized, i.e. it never ends with a zero limb, so two equal
/// values always have identical limbs and `PartialEq` can be derived.
///
/// # Signed shifts
///
/// There is no signed shift operator. A caller holding an offset of unknown
/// sign uses [`BitField::shift_signed`], which branches explicitly into a left
/// or a right shift.
///
/// # Example
///
/// ```
/// use blockfall_engine::BitField;
///
/// let cell = BitField::from_u64(0b101);
/// let moved = &cell << 6400;
/// assert!(moved.test_bit(6400));
/// assert!(moved.test_bit(6402));
/// assert_eq!(moved.slice(6400, 3), 0b101);
/// assert_eq!(&moved >> 6400, cell);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitField {
    limbs: Vec<u64>,
}

impl BitField {
    pub const ZERO: Self = Self { limbs: Vec::new() };

    #[must_use]
    pub const fn new() -> Self {
        Self::ZERO
    }

    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Self::from_limbs(vec![value])
    }

    /// Returns a value with only bit `index` set.
    #[must_use]
    pub fn bit(index: usize) -> Self {
        let mut limbs = vec![0; index / LIMB_BITS + 1];
        limbs[index / LIMB_BITS] = 1 << (index % LIMB_BITS);
        Self { limbs }
    }

    /// Returns a value with the low `width` bits set.
    #[must_use]
    pub fn ones(width: usize) -> Self {
        let mut limbs = vec![u64::MAX; width / LIMB_BITS];
        let rem = width % LIMB_BITS;
        if rem > 0 {
            limbs.push((1 << rem) - 1);
        }
        Self { limbs }
    }

    fn from_limbs(limbs: Vec<u64>) -> Self {
        let mut this = Self { limbs };
        this.normalize();
        this
    }

    fn normalize(&mut self) {
        while self.limbs.last() == Some(&0) {
            self.limbs.pop();
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.limbs.is_empty()
    }

    /// Number of bits needed to represent the value (0 for zero).
    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.limbs.last().map_or(0, |top| {
            self.limbs.len() * LIMB_BITS - top.leading_zeros() as usize
        })
    }

    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.limbs.iter().map(|limb| limb.count_ones() as usize).sum()
    }

    #[must_use]
    pub fn test_bit(&self, index: usize) -> bool {
        self.limbs
            .get(index / LIMB_BITS)
            .is_some_and(|limb| (limb >> (index % LIMB_BITS)) & 1 != 0)
    }

    /// Extracts the `width`-bit unsigned value starting at bit `low`.
    ///
    /// Bits past the end of the value read as zero.
    ///
    /// # Panics
    ///
    /// Panics if `width` is greater than 64.
    #[must_use]
    pub fn slice(&self, low: usize, width: usize) -> u64 {
        assert!(width <= LIMB_BITS, "slice width {width} exceeds {LIMB_BITS}");
        if width == 0 {
            return 0;
        }
        let index = low / LIMB_BITS;
        let shift = low % LIMB_BITS;
        let limb = |i: usize| self.limbs.get(i).copied().unwrap_or(0);
        let mut value = limb(index) >> shift;
        if shift != 0 {
            value |= limb(index + 1) << (LIMB_BITS - shift);
        }
        if width == LIMB_BITS {
            value
        } else {
            value & ((1 << width) - 1)
        }
    }

    #[must_use]
    pub fn shift_left(&self, n: usize) -> Self {
        if self.is_zero() {
            return Self::ZERO;
        }
        let limb_shift = n / LIMB_BITS;
        let bit_shift = n % LIMB_BITS;
        let mut limbs = vec![0; self.limbs.len() + limb_shift + 1];
        for (i, &limb) in self.limbs.iter().enumerate() {
            limbs[i + limb_shift] |= limb << bit_shift;
            if bit_shift != 0 {
                limbs[i + limb_shift + 1] |= limb >> (LIMB_BITS - bit_shift);
            }
        }
        Self::from_limbs(limbs)
    }

    /// Logical right shift; bits shifted below bit 0 are discarded.
    #[must_use]
    pub fn shift_right(&self, n: usize) -> Self {
        let limb_shift = n / LIMB_BITS;
        if limb_shift >= self.limbs.len() {
            return Self::ZERO;
        }
        let bit_shift = n % LIMB_BITS;
        let src = &self.limbs[limb_shift..];
        let limbs = src
            .iter()
            .enumerate()
            .map(|(i, &limb)| {
                let mut value = limb >> bit_shift;
                if bit_shift != 0
                    && let Some(&next) = src.get(i + 1)
                {
                    value |= next << (LIMB_BITS - bit_shift);
                }
                value
            })
            .collect();
        Self::from_limbs(limbs)
    }

    /// Shifts left by `offset` when it is non-negative, right by `-offset` otherwise.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn shift_signed(&self, offset: i64) -> Self {
        if offset >= 0 {
            self.shift_left(offset.unsigned_abs() as usize)
        } else {
            self.shift_right(offset.unsigned_abs() as usize)
        }
    }

    /// Keeps only the low `width` bits.
    #[must_use]
    pub fn truncated(&self, width: usize) -> Self {
        let full = width / LIMB_BITS;
        if full >= self.limbs.len() {
            return self.clone();
        }
        let mut limbs = self.limbs[..full].to_vec();
        let rem = width % LIMB_BITS;
        if rem > 0 {
            limbs.push(self.limbs[full] & ((1 << rem) - 1));
        }
        Self::from_limbs(limbs)
    }

    /// Bitwise NOT restricted to the low `width` bits.
    ///
    /// An unbounded NOT would set infinitely many bits, so the width is explicit.
    #[must_use]
    pub fn complement(&self, width: usize) -> Self {
        Self::ones(width) ^ self.truncated(width)
    }

    /// Returns `self` with every bit of `mask` cleared.
    #[must_use]
    pub fn and_not(&self, mask: &Self) -> Self {
        let limbs = self
            .limbs
            .iter()
            .enumerate()
            .map(|(i, &limb)| limb & !mask.limbs.get(i).copied().unwrap_or(0))
            .collect();
        Self::from_limbs(limbs)
    }

    /// Returns whether `self` and `other` share at least one set bit.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.limbs
            .iter()
            .zip(&other.limbs)
            .any(|(a, b)| a & b != 0)
    }

    /// Returns whether every bit of `mask` is set in `self`.
    #[must_use]
    pub fn contains(&self, mask: &Self) -> bool {
        mask.limbs
            .iter()
            .enumerate()
            .all(|(i, &m)| self.limbs.get(i).copied().unwrap_or(0) & m == m)
    }
}

impl fmt::LowerHex for BitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((top, rest)) = self.limbs.split_last() else {
            return f.write_char('0');
        };
        write!(f, "{top:x}")?;
        for limb in rest.iter().rev() {
            write!(f, "{limb:016x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitField(0x{self:x})")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseBitFieldError {
    #[display("empty hex string")]
    Empty,
    #[display("invalid hex digit in {_0:?}")]
    InvalidDigit(#[error(not(source))] String),
}

impl FromStr for BitField {
    type Err = ParseBitFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.is_empty() {
            return Err(ParseBitFieldError::Empty);
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseBitFieldError::InvalidDigit(s.to_owned()));
        }
        let mut limbs = Vec::with_capacity(digits.len().div_ceil(HEX_DIGITS_PER_LIMB));
        let mut end = digits.len();
        while end > 0 {
            let start = end.saturating_sub(HEX_DIGITS_PER_LIMB);
            let limb = u64::from_str_radix(&digits[start..end], 16)
                .map_err(|_| ParseBitFieldError::InvalidDigit(s.to_owned()))?;
            limbs.push(limb);
            end = start;
        }
        Ok(Self::from_limbs(limbs))
    }
}

impl Serialize for BitField {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&format_args!("{self:x}"))
    }
}

impl<'de> Deserialize<'de> for BitField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|e| {
            serde::de::Error::custom(format!("invalid bit field hex string: {e}"))
        })
    }
}

impl Shl<usize> for &BitField {
    type Output = BitField;

    fn shl(self, n: usize) -> BitField {
        self.shift_left(n)
    }
}

impl Shl<usize> for BitField {
    type Output = BitField;

    fn shl(self, n: usize) -> BitField {
        self.shift_left(n)
    }
}

impl Shr<usize> for &BitField {
    type Output = BitField;

    fn shr(self, n: usize) -> BitField {
        self.shift_right(n)
    }
}

impl Shr<usize> for BitField {
    type Output = BitField;

    fn shr(self, n: usize) -> BitField {
        self.shift_right(n)
    }
}

impl BitAnd<&BitField> for &BitField {
    type Output = BitField;

    fn bitand(self, rhs: &BitField) -> BitField {
        let limbs = self.limbs.iter().zip(&rhs.limbs).map(|(a, b)| a & b).collect();
        BitField::from_limbs(limbs)
    }
}

fn zip_longest(lhs: &BitField, rhs: &BitField, op: impl Fn(u64, u64) -> u64) -> BitField {
    let len = lhs.limbs.len().max(rhs.limbs.len());
    let limb = |v: &BitField, i: usize| v.limbs.get(i).copied().unwrap_or(0);
    let limbs = (0..len).map(|i| op(limb(lhs, i), limb(rhs, i))).collect();
    BitField::from_limbs(limbs)
}

impl BitOr<&BitField> for &BitField {
    type Output = BitField;

    fn bitor(self, rhs: &BitField) -> BitField {
        zip_longest(self, rhs, |a, b| a | b)
    }
}

impl BitXor<&BitField> for &BitField {
    type Output = BitField;

    fn bitxor(self, rhs: &BitField) -> BitField {
        zip_longest(self, rhs, |a, b| a ^ b)
    }
}

macro_rules! forward_owned_binop {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident) => {
        impl $trait<BitField> for BitField {
            type Output = BitField;

            fn $method(self, rhs: BitField) -> BitField {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&BitField> for BitField {
            type Output = BitField;

            fn $method(self, rhs: &BitField) -> BitField {
                (&self).$method(rhs)
            }
        }

        impl $assign_trait<&BitField> for BitField {
            fn $assign_method(&mut self, rhs: &BitField) {
                *self = (&*self).$method(rhs);
            }
        }

        impl $assign_trait<BitField> for BitField {
            fn $assign_method(&mut self, rhs: BitField) {
                *self = (&*self).$method(&rhs);
            }
        }
    };
}

forward_owned_binop!(BitAnd, bitand, BitAndAssign, bitand_assign);
forward_owned_binop!(BitOr, bitor, BitOrAssign, bitor_assign);
forward_owned_binop!(BitXor, bitxor, BitXorAssign, bitxor_assign);
