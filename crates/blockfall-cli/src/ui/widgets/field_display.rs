use std::iter;

use blockfall_engine::{Cell, Field};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt, Widget},
};

use crate::ui::widgets::{CellDisplay, cells};

/// The visible rows of a [`Field`] with the active piece and its ghost drawn on top.
#[derive(Debug)]
pub struct FieldDisplay<'a> {
    field: &'a Field,
    overlay: Vec<(i32, i32, CellDisplay)>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> FieldDisplay<'a> {
    pub fn new(field: &'a Field) -> Self {
        Self {
            field,
            overlay: vec![],
            block: None,
        }
    }

    /// Draws the landing preview; cells are in board coordinates.
    pub fn ghost(mut self, cells: impl IntoIterator<Item = (i32, i32, Cell)>) -> Self {
        self.overlay.extend(cells.into_iter().filter_map(|(x, y, cell)| {
            cell.color().map(|rgb| (x, y, CellDisplay::ghost(rgb)))
        }));
        self
    }

    /// Draws the active piece; cells are in board coordinates.
    pub fn piece(mut self, cells: impl IntoIterator<Item = (i32, i32, Cell)>) -> Self {
        self.overlay.extend(
            cells
                .into_iter()
                .map(|(x, y, cell)| (x, y, CellDisplay::from_cell(cell))),
        );
        self
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        cells(self.field.width()) * CellDisplay::width()
            + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        cells(self.field.height()) * CellDisplay::height()
            + super::block_vertical_margin(self.block.as_ref())
    }

    fn grid(&self) -> Vec<Vec<CellDisplay>> {
        let mut grid: Vec<Vec<CellDisplay>> = self
            .field
            .rows()
            .map(|row| {
                row.enumerate()
                    .map(|(x, cell)| CellDisplay::from_board_cell(cell, x))
                    .collect()
            })
            .collect();
        for &(x, y, display) in &self.overlay {
            // cells above the board (spawn area) are not drawn
            if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y))
                && let Some(slot) = grid.get_mut(y).and_then(|row| row.get_mut(x))
            {
                *slot = display;
            }
        }
        grid
    }
}

impl Widget for FieldDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &FieldDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints =
            (0..self.field.width()).map(|_| Constraint::Length(CellDisplay::width()));
        let row_constraints =
            (0..self.field.height()).map(|_| Constraint::Length(CellDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_cells = area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));

        for (grid_row, row) in iter::zip(grid_cells, self.grid()) {
            for (grid_cell, display) in iter::zip(grid_row, row) {
                display.render(grid_cell, buf);
            }
        }
    }
}
