use serde::{Deserialize, Serialize};

use crate::{FieldSizeError, InvalidFieldError};

use super::{
    bit_field::BitField,
    cell::{CELL_BITS, Cell, Rgb},
    piece::{PIECE_SIZE, Piece},
};

pub const DEFAULT_WIDTH: usize = 13;
pub const DEFAULT_HEIGHT: usize = 20;

/// Rows above the board that may hold cells: the reach of a piece box spawned above row 0.
const VIRTUAL_ROWS: usize = PIECE_SIZE;

const ASCII_COLOR: Rgb = Rgb::new(0x80, 0x80, 0x80);

/// The board of locked cells, packed into one [`BitField`].
///
/// # Bit Layout
///
/// Cell `(x, y)` (column `x`, row `y` counted downward from the top) sits at
///
/// ```text
/// ((height - 1 - y) * width + (width - 1 - x)) * CELL_BITS
/// ```
///
/// so the board reads row-major from the top-left cell at the highest-order
/// bits down to the bottom-right cell at bit 0. The lowest `width * CELL_BITS`
/// bits are therefore the floor row.
///
/// Rows with a negative index continue above bit `width * height * CELL_BITS`.
/// They are never drawn; row `-1` is the spawn row whose occupation ends the
/// game (see [`Field::is_over`]).
///
/// ```text
///          x = 0        x = width - 1
/// y = -1  [ virtual spawn row ........ ]  <- above the visible bits
/// y = 0   [ highest visible bits ..... ]
///   ...
/// y = h-1 [ ................ bit 0 ... ]  <- floor row (lowest bits)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FieldRepr")]
pub struct Field {
    width: usize,
    height: usize,
    bits: BitField,
}

#[derive(Deserialize)]
struct FieldRepr {
    width: usize,
    height: usize,
    bits: BitField,
}

impl TryFrom<FieldRepr> for Field {
    type Error = InvalidFieldError;

    fn try_from(repr: FieldRepr) -> Result<Self, Self::Error> {
        let mut field = Field::new(repr.width, repr.height)?;
        field.bits = repr.bits;
        let limit = field.stored_bits();
        if field.bits.bit_len() > limit {
            return Err(InvalidFieldError::BitsAboveSpawnArea {
                bit_len: field.bits.bit_len(),
                limit,
            });
        }
        if let Some((offset, cell)) = field.first_inconsistent_cell() {
            return Err(InvalidFieldError::InconsistentCell {
                offset,
                bits: cell.bits(),
            });
        }
        Ok(field)
    }
}

impl Default for Field {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            bits: BitField::ZERO,
        }
    }
}

impl Field {
    /// Creates an empty `width`×`height` field.
    ///
    /// The board must be at least as large as the 4×4 piece box.
    pub fn new(width: usize, height: usize) -> Result<Self, FieldSizeError> {
        if width < PIECE_SIZE || height < PIECE_SIZE {
            return Err(FieldSizeError { width, height });
        }
        Ok(Self {
            width,
            height,
            bits: BitField::ZERO,
        })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn bits(&self) -> &BitField {
        &self.bits
    }

    fn row_bits(&self) -> usize {
        self.width * CELL_BITS
    }

    fn visible_bits(&self) -> usize {
        self.height * self.row_bits()
    }

    /// Visible rows plus the virtual rows above them.
    fn stored_bits(&self) -> usize {
        (self.height + VIRTUAL_ROWS) * self.row_bits()
    }

    /// Bit offset of the lowest-order bit of visible row `y`.
    fn row_shift(&self, y: usize) -> usize {
        (self.height - 1 - y) * self.row_bits()
    }

    fn cell_offset(&self, x: usize, y: usize) -> usize {
        self.row_shift(y) + (self.width - 1 - x) * CELL_BITS
    }

    /// Every bit of one row (the floor row when unshifted).
    fn line_mask(&self) -> BitField {
        BitField::ones(self.row_bits())
    }

    /// The occupancy bit of every cell of one row (the floor row when unshifted).
    fn fill_mask(&self) -> BitField {
        (0..self.width).fold(BitField::ZERO, |mask, x| mask | BitField::bit(x * CELL_BITS))
    }

    fn map(&self, x: i32, y: i32, piece: &Piece) -> BitField {
        piece.map_to_board(x, y, self.width, self.height)
    }

    /// Returns false if any occupied piece cell would land left or right of the board.
    ///
    /// Vertical bounds are handled by [`Field::is_collision`].
    #[must_use]
    pub fn is_valid(&self, x: i32, _y: i32, piece: &Piece) -> bool {
        piece.occupied_cells().iter().all(|&(col, _, _)| {
            let board_x = i64::from(x) + i64::try_from(col).unwrap_or(i64::MAX);
            usize::try_from(board_x).is_ok_and(|board_x| board_x < self.width)
        })
    }

    /// Returns whether the piece at `(x, y)` overlaps a locked cell or reaches
    /// below the floor.
    ///
    /// Cells below the floor are shifted out by the mapping, so the floor
    /// check maps the piece one row higher and tests it against the floor row.
    #[must_use]
    pub fn is_collision(&self, x: i32, y: i32, piece: &Piece) -> bool {
        if self.map(x, y, piece).intersects(&self.bits) {
            return true;
        }
        self.map(x, y - 1, piece).intersects(&self.line_mask())
    }

    /// Returns whether the piece may occupy `(x, y)`.
    #[must_use]
    pub fn can_place(&self, x: i32, y: i32, piece: &Piece) -> bool {
        self.is_valid(x, y, piece) && !self.is_collision(x, y, piece)
    }

    /// Merges the piece permanently into the field.
    ///
    /// The caller is responsible for having validated the position.
    pub fn put(&mut self, x: i32, y: i32, piece: &Piece) {
        debug_assert!(
            self.is_valid(x, y, piece),
            "locking a piece outside the side walls at ({x}, {y})"
        );
        self.bits |= self.map(x, y, piece);
        self.debug_assert_consistent();
    }

    /// Returns whether every cell of visible row `y` is occupied.
    ///
    /// Only the occupancy bits take part; colors are ignored.
    #[must_use]
    pub fn is_row_full(&self, y: usize) -> bool {
        assert!(y < self.height, "row {y} is outside the field");
        let mask = self.fill_mask() << self.row_shift(y);
        self.bits.contains(&mask)
    }

    /// Zeroes every bit of visible row `y`.
    pub fn clear_row(&mut self, y: usize) {
        assert!(y < self.height, "row {y} is outside the field");
        let mask = self.line_mask() << self.row_shift(y);
        self.bits = self.bits.and_not(&mask);
    }

    /// Moves every row above `y` (including the virtual rows) down by one row.
    ///
    /// Row `y` should have been cleared first; rows below `y` are untouched.
    pub fn shift_rows_down(&mut self, y: usize) {
        assert!(y < self.height, "row {y} is outside the field");
        let boundary = self.row_shift(y) + self.row_bits();
        let above = &self.bits ^ &self.bits.truncated(boundary);
        self.bits ^= &above;
        self.bits |= above >> self.row_bits();
    }

    /// Clears every full row and lets the rows above fall, returning the
    /// number of rows cleared.
    ///
    /// Rows are scanned from the floor upward. After a clear the same row is
    /// examined again, because the row above has just fallen into it.
    pub fn resolve_lines(&mut self) -> usize {
        let mut cleared = 0;
        let mut remaining = self.height;
        while remaining > 0 {
            let y = remaining - 1;
            if self.is_row_full(y) {
                self.clear_row(y);
                self.shift_rows_down(y);
                cleared += 1;
            } else {
                remaining -= 1;
            }
        }
        self.debug_assert_consistent();
        cleared
    }

    /// Returns whether the virtual spawn row above the board holds a locked cell.
    #[must_use]
    pub fn is_over(&self) -> bool {
        (&self.bits >> self.visible_bits()).intersects(&self.line_mask())
    }

    /// Returns the cell at `(x, y)`, or `None` outside the visible board.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(Cell::from_bits(
            self.bits.slice(self.cell_offset(x, y), CELL_BITS),
        ))
    }

    /// Iterates over the visible rows, top row first.
    pub fn rows(&self) -> impl Iterator<Item = impl Iterator<Item = Cell> + '_> + '_ {
        (0..self.height).map(move |y| {
            (0..self.width).map(move |x| {
                Cell::from_bits(self.bits.slice(self.cell_offset(x, y), CELL_BITS))
            })
        })
    }

    /// Empties the field, including the virtual rows.
    pub fn clear(&mut self) {
        self.bits = BitField::ZERO;
    }

    /// Bit offset and value of the lowest-order empty cell with color bits,
    /// visible and virtual rows alike.
    fn first_inconsistent_cell(&self) -> Option<(usize, Cell)> {
        (0..self.bits.bit_len().div_ceil(CELL_BITS))
            .map(|i| i * CELL_BITS)
            .map(|offset| (offset, Cell::from_bits(self.bits.slice(offset, CELL_BITS))))
            .find(|(_, cell)| !cell.is_consistent())
    }

    fn debug_assert_consistent(&self) {
        if cfg!(debug_assertions)
            && let Some((offset, cell)) = self.first_inconsistent_cell()
        {
            panic!(
                "empty cell at bit {offset} carries color bits {:#x}",
                cell.bits()
            );
        }
    }

    /// Renders the visible rows as `#` (occupied) and `.` (empty).
    #[must_use]
    pub fn to_ascii(&self) -> Vec<String> {
        self.rows()
            .map(|row| {
                row.map(|cell| if cell.is_occupied() { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }

    /// Creates a field from ASCII art: `#` is an occupied (gray) cell, `.` is empty.
    ///
    /// Rows are given top to bottom and are aligned to the bottom of the field,
    /// so short pictures describe the lowest rows.
    ///
    /// # Panics
    ///
    /// Panics if the board is smaller than a piece box, a row has the wrong
    /// width or there are too many rows.
    #[must_use]
    pub fn from_ascii(width: usize, height: usize, art: &str) -> Self {
        let mut field = Self::new(width, height).unwrap_or_else(|err| panic!("{err}"));
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(
            lines.len() <= height,
            "expected at most {height} rows, got {}",
            lines.len()
        );
        let top = height - lines.len();
        let cell = BitField::from_u64(Cell::occupied(ASCII_COLOR).bits().into());
        for (i, line) in lines.iter().enumerate() {
            let chars: Vec<char> = line.chars().filter(|c| *c == '#' || *c == '.').collect();
            assert_eq!(
                chars.len(),
                width,
                "each row must have exactly {width} cells, got {} at row {i}",
                chars.len()
            );
            for (x, &ch) in chars.iter().enumerate() {
                if ch == '#' {
                    field.bits |= &cell << field.cell_offset(x, top + i);
                }
            }
        }
        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLUE: Rgb = Rgb::new(0x20, 0x40, 0xff);

    fn snapshot(field: &Field) -> Vec<Vec<Cell>> {
        field.rows().map(Iterator::collect).collect()
    }

    fn fill_row(field: &mut Field, y: usize) {
        let cell = BitField::from_u64(Cell::occupied(BLUE).bits().into());
        for x in 0..field.width() {
            field.bits |= &cell << field.cell_offset(x, y);
        }
    }

    #[test]
    fn test_new_rejects_tiny_boards() {
        assert!(Field::new(13, 20).is_ok());
        assert!(Field::new(4, 4).is_ok());
        let err = Field::new(3, 20).unwrap_err();
        assert_eq!(err, FieldSizeError { width: 3, height: 20 });
        assert!(Field::new(13, 2).is_err());
    }

    #[test]
    fn test_default_field_is_empty() {
        let field = Field::default();
        assert_eq!((field.width(), field.height()), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
        assert!(field.bits().is_zero());
        assert!(!field.is_over());
        assert!(field.rows().flatten().all(Cell::is_empty));
    }

    #[test]
    fn test_layout_corners() {
        let field = Field::default();
        assert_eq!(field.cell_offset(12, 19), 0);
        assert_eq!(field.cell_offset(0, 19), 12 * CELL_BITS);
        assert_eq!(field.cell_offset(0, 0), (20 * 13 - 1) * CELL_BITS);
        assert_eq!(field.visible_bits(), 6500);
    }

    #[test]
    fn test_is_valid_checks_side_walls() {
        let field = Field::default();
        let piece = Piece::new(crate::Shape::I, BLUE); // column 1 of the box
        assert!(field.is_valid(-1, 0, &piece));
        assert!(!field.is_valid(-2, 0, &piece));
        assert!(field.is_valid(11, 0, &piece));
        assert!(!field.is_valid(12, 0, &piece));
        // vertical position does not matter
        assert!(field.is_valid(0, 100, &piece));
    }

    #[test]
    fn test_put_and_get() {
        let mut field = Field::default();
        let piece = Piece::new(crate::Shape::T, BLUE);
        field.put(4, 10, &piece);
        for (col, row, cell) in piece.occupied_cells() {
            assert_eq!(field.get(4 + col, 10 + row), Some(cell));
        }
        assert_eq!(field.rows().flatten().filter(|c| c.is_occupied()).count(), 4);
        assert_eq!(field.get(13, 0), None);
        assert_eq!(field.get(0, 20), None);
    }

    #[test]
    fn test_collision_with_locked_cells() {
        let field = Field::from_ascii(
            13,
            20,
            r"
            ......#......
            ",
        );
        let piece = Piece::new(crate::Shape::I, BLUE);
        // I occupies column x + 1, rows y..y + 4
        assert!(field.is_collision(5, 16, &piece));
        assert!(!field.is_collision(5, 15, &piece));
        assert!(!field.is_collision(4, 16, &piece));
    }

    #[test]
    fn test_collision_with_floor() {
        let field = Field::default();
        let piece = Piece::new(crate::Shape::I, BLUE);
        assert!(!field.is_collision(0, 16, &piece));
        assert!(field.is_collision(0, 17, &piece));

        // T occupies rows 1 and 2 of its box
        let piece = Piece::new(crate::Shape::T, BLUE);
        assert!(!field.is_collision(0, 17, &piece));
        assert!(field.is_collision(0, 18, &piece));
    }

    #[test]
    fn test_no_collision_above_board() {
        let field = Field::default();
        let piece = Piece::new(crate::Shape::I, BLUE);
        assert!(!field.is_collision(5, -2, &piece));
        assert!(field.can_place(5, -2, &piece));
    }

    #[test]
    fn test_is_row_full_matches_cells() {
        let mut field = Field::from_ascii(
            13,
            20,
            r"
            ############.
            #############
            ",
        );
        assert!(field.is_row_full(19));
        assert!(!field.is_row_full(18));
        for y in 0..20 {
            let all_occupied = (0..13).all(|x| field.get(x, y).is_some_and(Cell::is_occupied));
            assert_eq!(field.is_row_full(y), all_occupied, "row {y}");
        }

        fill_row(&mut field, 3);
        assert!(field.is_row_full(3));
    }

    #[test]
    fn test_is_row_full_ignores_colors() {
        let mut field = Field::default();
        // color bits alone never count as occupied
        for x in 0..13 {
            field.bits |= BitField::from_u64(0b10) << field.cell_offset(x, 19);
        }
        assert!(!field.is_row_full(19));
    }

    #[test]
    fn test_clear_row_zeroes_exactly_one_row() {
        let mut field = Field::from_ascii(
            13,
            20,
            r"
            #............
            #############
            ............#
            ",
        );
        field.clear_row(18);
        assert_eq!(
            field.to_ascii()[17..],
            ["#............", ".............", "............#"]
        );
    }

    #[test]
    fn test_clear_and_shift_rows_down() {
        let mut field = Field::from_ascii(
            13,
            20,
            r"
            ..#..........
            .#.#.........
            #############
            ##.##########
            ",
        );
        let before = snapshot(&field);

        field.clear_row(18);
        field.shift_rows_down(18);
        let after = snapshot(&field);

        // the row above moved into the cleared slot
        assert_eq!(after[18], before[17]);
        assert_eq!(after[17], before[16]);
        // the top row is now empty
        assert!(after[0].iter().all(|c| c.is_empty()));
        // rows below are untouched
        assert_eq!(after[19], before[19]);
    }

    #[test]
    fn test_shift_rows_down_moves_virtual_rows() {
        let mut field = Field::default();
        let piece = Piece::new(crate::Shape::I, BLUE);
        field.put(5, -2, &piece);
        assert!(field.is_over());

        field.clear_row(1);
        field.shift_rows_down(1);
        // rows -2 and -1 fell by one: -1 and 0 remain occupied, row 1 was replaced by row 0
        assert!(field.is_over());
        assert_eq!(field.get(6, 0).map(Cell::is_occupied), Some(true));
        assert_eq!(field.get(6, 1).map(Cell::is_occupied), Some(true));
        assert_eq!(field.get(6, 2).map(Cell::is_occupied), Some(false));
    }

    #[test]
    fn test_resolve_lines_single() {
        let mut field = Field::from_ascii(
            13,
            20,
            r"
            ...#.........
            #############
            ",
        );
        assert_eq!(field.resolve_lines(), 1);
        assert_eq!(field.to_ascii()[19], "...#.........");
        assert!(field.to_ascii()[..19].iter().all(|row| row == "............."));
    }

    #[test]
    fn test_resolve_lines_cascade() {
        let mut field = Field::from_ascii(
            13,
            20,
            r"
            #............
            #############
            .##..........
            #############
            #############
            ",
        );
        assert_eq!(field.resolve_lines(), 3);
        let rows = field.to_ascii();
        assert_eq!(rows[19], ".##..........");
        assert_eq!(rows[18], "#............");
        assert_eq!(field.rows().flatten().filter(|c| c.is_occupied()).count(), 3);
    }

    #[test]
    fn test_resolve_lines_full_board() {
        let mut field = Field::default();
        for y in 0..20 {
            fill_row(&mut field, y);
        }
        assert_eq!(field.resolve_lines(), 20);
        assert!(field.bits().is_zero());
    }

    #[test]
    fn test_resolve_lines_keeps_colors() {
        let mut field = Field::default();
        fill_row(&mut field, 19);
        let piece = Piece::new(crate::Shape::O, BLUE);
        field.put(0, 15, &piece); // occupies rows 16 and 17
        assert_eq!(field.resolve_lines(), 1);
        assert_eq!(field.get(1, 17), Some(Cell::occupied(BLUE)));
        assert_eq!(field.get(2, 18), Some(Cell::occupied(BLUE)));
        assert_eq!(field.get(1, 19), Some(Cell::EMPTY));
    }

    #[test]
    fn test_is_over_only_for_spawn_row() {
        let mut field = Field::default();
        let piece = Piece::new(crate::Shape::O, BLUE);
        field.put(5, -1, &piece); // rows 0 and 1
        assert!(!field.is_over());
        field.put(0, -2, &piece); // rows -1 and 0
        assert!(field.is_over());
        field.clear();
        assert!(!field.is_over());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut field = Field::default();
        field.put(3, 12, &Piece::new(crate::Shape::S, BLUE));
        let serialized = serde_json::to_string(&field).unwrap();
        let deserialized: Field = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, field);

        let err = serde_json::from_str::<Field>(r#"{"width":2,"height":20,"bits":"0"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("field size"));
    }

    #[test]
    fn test_deserialize_rejects_color_without_occupancy() {
        let err = serde_json::from_str::<Field>(r#"{"width":13,"height":20,"bits":"2"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("empty cell at bit 0"), "{err}");

        let field = Field::try_from(FieldRepr {
            width: 13,
            height: 20,
            bits: BitField::from_u64(0b10) << (5 * CELL_BITS),
        });
        assert_eq!(
            field,
            Err(InvalidFieldError::InconsistentCell {
                offset: 5 * CELL_BITS,
                bits: 0b10
            })
        );
    }

    #[test]
    fn test_deserialize_limits_virtual_rows() {
        // occupancy bit of the rightmost cell of row -4, the highest virtual row
        let highest = format!(r#"{{"width":13,"height":20,"bits":"8{}"}}"#, "0".repeat(1868));
        let field: Field = serde_json::from_str(&highest).unwrap();
        assert_eq!(field.bits().bit_len(), 7476);
        assert!(!field.is_over());

        // first bit of row -5
        let above = format!(r#"{{"width":13,"height":20,"bits":"1{}"}}"#, "0".repeat(1950));
        let err = serde_json::from_str::<Field>(&above).unwrap_err();
        assert!(err.to_string().contains("beyond the 7800 bits"), "{err}");
    }

    #[test]
    fn test_from_ascii_smallest_board() {
        let field = Field::from_ascii(4, 4, "#...");
        assert_eq!(field.to_ascii()[3], "#...");
    }

    #[test]
    #[should_panic(expected = "cannot hold a 4x4 piece")]
    fn test_from_ascii_rejects_tiny_board() {
        let _ = Field::from_ascii(2, 2, "");
    }

    #[test]
    fn test_deserialized_field_stays_usable() {
        let mut field = Field::default();
        field.put(0, 18, &Piece::new(crate::Shape::O, BLUE));
        let json = serde_json::to_string(&field).unwrap();
        let mut field: Field = serde_json::from_str(&json).unwrap();
        field.put(4, 0, &Piece::new(crate::Shape::O, BLUE));
        assert_eq!(field.resolve_lines(), 0);
    }
}
