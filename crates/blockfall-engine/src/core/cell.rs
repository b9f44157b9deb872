use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

/// Width of one packed cell: an occupancy bit followed by a 24-bit color.
pub const CELL_BITS: usize = 25;
/// Width of the packed RGB color stored above the occupancy bit.
pub const COLOR_BITS: usize = 24;

const COLOR_SHIFT: usize = CELL_BITS - COLOR_BITS;
const OCCUPIED_BIT: u32 = 1;
const CELL_MASK: u32 = (1 << CELL_BITS) - 1;

/// An RGB color, packed as `0xRRGGBB` inside a [`Cell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packs the color with red in the most significant byte.
    #[must_use]
    pub const fn pack(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn unpack(packed: u32) -> Self {
        Self {
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        }
    }
}

impl Distribution<Rgb> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Rgb {
        Rgb::new(rng.random(), rng.random(), rng.random())
    }
}

/// One board or piece cell.
///
/// Bit 0 is the occupancy flag and bits 1-24 hold the packed [`Rgb`] color.
/// An empty cell never carries color bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell(u32);

impl Cell {
    pub const EMPTY: Self = Self(0);

    #[must_use]
    pub const fn occupied(color: Rgb) -> Self {
        Self((color.pack() << COLOR_SHIFT) | OCCUPIED_BIT)
    }

    /// Builds a cell from the low [`CELL_BITS`] bits of `bits`.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn from_bits(bits: u64) -> Self {
        Self((bits & CELL_MASK as u64) as u32)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_occupied(self) -> bool {
        self.0 & OCCUPIED_BIT != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        !self.is_occupied()
    }

    #[must_use]
    pub const fn color(self) -> Option<Rgb> {
        if self.is_occupied() {
            Some(Rgb::unpack(self.0 >> COLOR_SHIFT))
        } else {
            None
        }
    }

    /// Returns false for an empty cell with leftover color bits.
    pub(crate) const fn is_consistent(self) -> bool {
        self.is_occupied() || self.0 == 0
    }
}
