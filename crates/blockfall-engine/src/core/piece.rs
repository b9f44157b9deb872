use arrayvec::ArrayVec;
use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::{
    bit_field::BitField,
    cell::{CELL_BITS, Cell, Rgb},
};

/// Side length of the square box every piece lives in.
pub const PIECE_SIZE: usize = 4;
const PIECE_ROW_BITS: usize = PIECE_SIZE * CELL_BITS;
/// Width of a packed piece buffer (16 cells).
pub const PIECE_BITS: usize = PIECE_SIZE * PIECE_ROW_BITS;

/// One of the seven tetromino templates.
///
/// Each template is a 16-bit 4×4 grid read row by row from the most
/// significant bit: cell `(col, row)` is set when `0x8000 >> (col + row * 4)`
/// is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum Shape {
    /// Vertical bar in column 1.
    I = 0,
    /// J-piece.
    J = 1,
    /// L-piece.
    L = 2,
    /// S-piece.
    S = 3,
    /// O-piece.
    O = 4,
    /// Z-piece.
    Z = 5,
    /// T-piece.
    T = 6,
}

const SHAPE_PATTERNS: [u16; Shape::LEN] = [
    0x4444, // I
    0x0e20, // J
    0x0e80, // L
    0x06c0, // S
    0x0660, // O
    0x0c60, // Z
    0x0e40, // T
];

impl Distribution<Shape> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Shape {
        Shape::ALL[rng.random_range(0..Shape::LEN)]
    }
}

impl Shape {
    /// Number of shapes (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        Self::I,
        Self::J,
        Self::L,
        Self::S,
        Self::O,
        Self::Z,
        Self::T,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::LEN {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Returns the 16-bit 4×4 template of the shape.
    #[must_use]
    pub const fn pattern(self) -> u16 {
        SHAPE_PATTERNS[self.index()]
    }

    const fn is_set(self, col: usize, row: usize) -> bool {
        self.pattern() & (0x8000 >> (col + row * PIECE_SIZE)) != 0
    }

    /// Returns the single character representation of this shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::Shape;
    ///
    /// assert_eq!(Shape::I.as_char(), 'I');
    /// assert_eq!(Shape::from_char('T'), Some(Shape::T));
    /// assert_eq!(Shape::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Shape::I => 'I',
            Shape::J => 'J',
            Shape::L => 'L',
            Shape::S => 'S',
            Shape::O => 'O',
            Shape::Z => 'Z',
            Shape::T => 'T',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(Shape::I),
            'J' => Some(Shape::J),
            'L' => Some(Shape::L),
            'S' => Some(Shape::S),
            'O' => Some(Shape::O),
            'Z' => Some(Shape::Z),
            'T' => Some(Shape::T),
            _ => None,
        }
    }
}

/// Bit offset of piece cell `(col, row)` inside the 400-bit piece buffer.
///
/// `(0, 0)` holds the highest-order cell and `(3, 3)` the lowest.
const fn cell_offset(col: usize, row: usize) -> usize {
    (PIECE_SIZE - 1 - row) * PIECE_ROW_BITS + (PIECE_SIZE - 1 - col) * CELL_BITS
}

fn cell_field(cell: Cell) -> BitField {
    BitField::from_u64(cell.bits().into())
}

/// Converts a board dimension to signed offset arithmetic.
fn signed(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// A falling piece: a shape template filled with one color, packed as 16 cells.
///
/// The packed buffer is the source of truth after creation; [`Piece::rotate`]
/// rewrites it in place while the shape and color stay as they were spawned.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Piece, Rgb, Shape};
///
/// let mut piece = Piece::new(Shape::T, Rgb::new(200, 0, 200));
/// assert_eq!(piece.occupied_cells().len(), 4);
///
/// let original = piece.clone();
/// for _ in 0..4 {
///     piece.rotate();
/// }
/// assert_eq!(piece, original);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    shape: Shape,
    color: Rgb,
    bits: BitField,
}

impl Piece {
    #[must_use]
    pub fn new(shape: Shape, color: Rgb) -> Self {
        let cell = cell_field(Cell::occupied(color));
        let mut bits = BitField::ZERO;
        for row in 0..PIECE_SIZE {
            for col in 0..PIECE_SIZE {
                if shape.is_set(col, row) {
                    bits |= &cell << cell_offset(col, row);
                }
            }
        }
        Self { shape, color, bits }
    }

    #[must_use]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    #[must_use]
    pub fn color(&self) -> Rgb {
        self.color
    }

    #[must_use]
    pub fn bits(&self) -> &BitField {
        &self.bits
    }

    /// Returns the cell at `(col, row)` of the 4×4 box.
    ///
    /// # Panics
    ///
    /// Panics if `col` or `row` is outside the box.
    #[must_use]
    pub fn get(&self, col: usize, row: usize) -> Cell {
        assert!(
            col < PIECE_SIZE && row < PIECE_SIZE,
            "piece cell ({col}, {row}) is outside the {PIECE_SIZE}x{PIECE_SIZE} box"
        );
        Cell::from_bits(self.bits.slice(cell_offset(col, row), CELL_BITS))
    }

    /// Returns `(col, row, cell)` for every occupied cell, top row first.
    #[must_use]
    pub fn occupied_cells(&self) -> ArrayVec<(usize, usize, Cell), { PIECE_SIZE * PIECE_SIZE }> {
        let mut cells = ArrayVec::new();
        for row in 0..PIECE_SIZE {
            for col in 0..PIECE_SIZE {
                let cell = self.get(col, row);
                if cell.is_occupied() {
                    cells.push((col, row, cell));
                }
            }
        }
        cells
    }

    /// Rotates the piece 90° clockwise inside its box.
    ///
    /// Cell `(col, row)` moves to `(3 - row, col)`. The buffer is rebuilt from
    /// the occupied cells only, so empty cells never pick up stale color bits.
    /// No bounds or collision check happens here.
    pub fn rotate(&mut self) {
        let mut rotated = BitField::ZERO;
        for (col, row, cell) in self.occupied_cells() {
            rotated |= cell_field(cell) << cell_offset(PIECE_SIZE - 1 - row, col);
        }
        self.bits = rotated;
    }

    /// Places the piece on a `width`×`height` board with box cell `(0, 0)` at
    /// board column `x`, row `y`.
    ///
    /// The result uses the board layout of [`Field`](super::field::Field).
    /// Rows below the board are shifted out and lost. Rows above the board
    /// (negative board rows) stay above the visible bits, which is where the
    /// spawn area lives. Columns are not clipped: callers check
    /// [`Field::is_valid`](super::field::Field::is_valid) first.
    #[must_use]
    pub fn map_to_board(&self, x: i32, y: i32, width: usize, height: usize) -> BitField {
        let cell_bits = signed(CELL_BITS);
        let width = signed(width);
        let height = signed(height);
        let (x, y) = (i64::from(x), i64::from(y));
        let box_size = signed(PIECE_SIZE);

        let mut mapped = BitField::ZERO;
        for row in 0..PIECE_SIZE {
            let row_cells =
                (&self.bits >> (PIECE_SIZE - 1 - row) * PIECE_ROW_BITS).truncated(PIECE_ROW_BITS);
            if row_cells.is_zero() {
                continue;
            }
            let board_row = y + signed(row);
            // lowest-order cell of the slice is box column 3, i.e. board column x + 3
            let offset = ((height - 1 - board_row) * width + (width - x - box_size)) * cell_bits;
            mapped |= row_cells.shift_signed(offset);
        }
        mapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(0xff, 0x10, 0x20);

    fn occupied_positions(piece: &Piece) -> Vec<(usize, usize)> {
        piece
            .occupied_cells()
            .into_iter()
            .map(|(col, row, _)| (col, row))
            .collect()
    }

    fn board_cell(bits: &BitField, x: i64, y: i64, width: i64, height: i64) -> Cell {
        let offset = ((height - 1 - y) * width + (width - 1 - x)) * signed(CELL_BITS);
        Cell::from_bits(bits.slice(usize::try_from(offset).unwrap(), CELL_BITS))
    }

    #[test]
    fn test_every_shape_has_four_cells() {
        for shape in Shape::ALL {
            let piece = Piece::new(shape, RED);
            assert_eq!(piece.occupied_cells().len(), 4, "{shape:?}");
            assert_eq!(shape.pattern().count_ones(), 4, "{shape:?}");
            assert!(piece.bits().bit_len() <= PIECE_BITS);
        }
    }

    #[test]
    fn test_occupied_cells_carry_color() {
        for shape in Shape::ALL {
            let piece = Piece::new(shape, RED);
            for (_, _, cell) in piece.occupied_cells() {
                assert_eq!(cell, Cell::occupied(RED));
            }
        }
    }

    #[test]
    fn test_template_positions() {
        let piece = Piece::new(Shape::I, RED);
        assert_eq!(occupied_positions(&piece), vec![(1, 0), (1, 1), (1, 2), (1, 3)]);

        let piece = Piece::new(Shape::T, RED);
        assert_eq!(occupied_positions(&piece), vec![(0, 1), (1, 1), (2, 1), (1, 2)]);

        let piece = Piece::new(Shape::O, RED);
        assert_eq!(occupied_positions(&piece), vec![(1, 1), (2, 1), (1, 2), (2, 2)]);
    }

    #[test]
    fn test_cell_offset_is_big_endian() {
        let piece = Piece::new(Shape::I, RED);
        // (1, 0) is the highest occupied cell: row 0 occupies the top 100 bits
        let top = cell_offset(1, 0);
        assert_eq!(top, 3 * PIECE_ROW_BITS + 2 * CELL_BITS);
        assert_eq!(piece.bits().bit_len(), top + CELL_BITS);
        assert_eq!(cell_offset(3, 3), 0);
    }

    #[test]
    fn test_rotate_clockwise() {
        let mut piece = Piece::new(Shape::I, RED);
        piece.rotate();
        // column 1 becomes row 1
        assert_eq!(occupied_positions(&piece), vec![(0, 1), (1, 1), (2, 1), (3, 1)]);

        let mut piece = Piece::new(Shape::T, RED);
        piece.rotate();
        // (col, row) -> (3 - row, col)
        assert_eq!(occupied_positions(&piece), vec![(2, 0), (1, 1), (2, 1), (2, 2)]);
    }

    #[test]
    fn test_rotate_four_times_is_identity() {
        for shape in Shape::ALL {
            let original = Piece::new(shape, RED);
            let mut piece = original.clone();
            for i in 1..=4 {
                piece.rotate();
                assert_eq!(piece.occupied_cells().len(), 4);
                if i < 4 && shape != Shape::O {
                    assert_ne!(piece.bits(), original.bits(), "{shape:?} after {i} turns");
                }
            }
            assert_eq!(piece, original, "{shape:?}");
        }
    }

    #[test]
    fn test_rotate_keeps_o_piece() {
        let original = Piece::new(Shape::O, RED);
        let mut piece = original.clone();
        piece.rotate();
        assert_eq!(piece, original);
    }

    #[test]
    fn test_map_to_board_reproduces_cells() {
        let (width, height) = (13, 20);
        for shape in Shape::ALL {
            let piece = Piece::new(shape, RED);
            for (x, y) in [(0, 0), (5, 3), (9, 16), (-1, 10), (4, -1)] {
                if piece
                    .occupied_cells()
                    .iter()
                    .any(|&(col, _, _)| !(0..13).contains(&(x + signed(col))))
                {
                    continue;
                }
                let mapped = piece.map_to_board(
                    i32::try_from(x).unwrap(),
                    i32::try_from(y).unwrap(),
                    width,
                    height,
                );
                assert_eq!(mapped.count_ones(), piece.bits().count_ones());
                for (col, row, cell) in piece.occupied_cells() {
                    let found = board_cell(
                        &mapped,
                        x + signed(col),
                        y + signed(row),
                        signed(width),
                        signed(height),
                    );
                    assert_eq!(found, cell, "{shape:?} at ({x}, {y}) cell ({col}, {row})");
                }
            }
        }
    }

    #[test]
    fn test_map_to_board_drops_rows_below_floor() {
        let piece = Piece::new(Shape::I, RED);
        // rows 18..=21: the last two fall off the board
        let mapped = piece.map_to_board(0, 18, 13, 20);
        let full = piece.map_to_board(0, 16, 13, 20);
        assert_eq!(mapped.count_ones(), full.count_ones() / 2);
        assert_eq!(board_cell(&mapped, 1, 19, 13, 20), Cell::occupied(RED));
    }

    #[test]
    fn test_map_to_board_keeps_rows_above_board() {
        let piece = Piece::new(Shape::I, RED);
        let mapped = piece.map_to_board(5, -2, 13, 20);
        let visible = 13 * 20 * CELL_BITS;
        // rows -2 and -1 sit above the visible bits
        assert_eq!((&mapped >> visible).count_ones(), 2 * Cell::occupied(RED).bits().count_ones() as usize);
        assert_eq!(board_cell(&mapped, 6, -1, 13, 20), Cell::occupied(RED));
        assert_eq!(board_cell(&mapped, 6, -2, 13, 20), Cell::occupied(RED));
        assert_eq!(board_cell(&mapped, 6, 0, 13, 20), Cell::occupied(RED));
    }

    #[test]
    fn test_shape_index_roundtrip() {
        for (i, shape) in Shape::ALL.into_iter().enumerate() {
            assert_eq!(shape.index(), i);
            assert_eq!(Shape::from_index(i), Some(shape));
            assert_eq!(Shape::from_char(shape.as_char()), Some(shape));
        }
        assert_eq!(Shape::from_index(Shape::LEN), None);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_get_outside_box_panics() {
        let _ = Piece::new(Shape::O, RED).get(4, 0);
    }
}
