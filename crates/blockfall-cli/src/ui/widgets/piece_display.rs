use blockfall_engine::{PIECE_SIZE, Piece};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::ui::widgets::{CellDisplay, cells};

/// Preview of a piece, trimmed to its occupied cells and centered.
#[derive(Debug)]
pub struct PieceDisplay<'a> {
    piece: Option<&'a Piece>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> PieceDisplay<'a> {
    pub fn new() -> Self {
        Self {
            piece: None,
            block: None,
        }
    }

    pub fn piece(self, piece: &'a Piece) -> Self {
        Self {
            piece: Some(piece),
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        cells(PIECE_SIZE) * CellDisplay::width()
            + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        cells(PIECE_SIZE) * CellDisplay::height()
            + super::block_vertical_margin(self.block.as_ref())
    }
}

/// Bounding box `(min_col, min_row, cols, rows)` of the occupied cells.
fn bounds(piece: &Piece) -> (usize, usize, usize, usize) {
    let occupied = piece.occupied_cells();
    let cols = occupied.iter().map(|&(col, _, _)| col);
    let rows = occupied.iter().map(|&(_, row, _)| row);
    let (Some(min_col), Some(max_col)) = (cols.clone().min(), cols.max()) else {
        return (0, 0, 0, 0);
    };
    let (Some(min_row), Some(max_row)) = (rows.clone().min(), rows.max()) else {
        return (0, 0, 0, 0);
    };
    (min_col, min_row, max_col - min_col + 1, max_row - min_row + 1)
}

impl Widget for PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let Some(piece) = self.piece else {
            return;
        };
        let (min_col, min_row, cols, rows) = bounds(piece);
        let piece_area = area.centered(
            Constraint::Length(cells(cols) * CellDisplay::width()),
            Constraint::Length(cells(rows) * CellDisplay::height()),
        );

        let col_constraints = (0..cols).map(|_| Constraint::Length(CellDisplay::width()));
        let row_constraints = (0..rows).map(|_| Constraint::Length(CellDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);
        let grid_rows = piece_area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));

        for (row, grid_row) in grid_rows.enumerate() {
            for (col, grid_cell) in grid_row.into_iter().enumerate() {
                let cell = piece.get(min_col + col, min_row + row);
                CellDisplay::from_cell(cell).render(grid_cell, buf);
            }
        }
    }
}
