use blockfall_engine::{Cell, Rgb};
use ratatui::{
    prelude::{Buffer, Rect},
    style::Style,
    widgets::{Paragraph, Widget},
};

use crate::ui::widgets::{color, style, terminal_color};

/// One board cell drawn as a two-column terminal block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellDisplay {
    style: Style,
    symbol: &'static str,
}

impl CellDisplay {
    pub const fn new(style: Style, symbol: &'static str) -> Self {
        Self { style, symbol }
    }

    pub fn width() -> u16 {
        2
    }

    pub fn height() -> u16 {
        1
    }

    pub const fn empty() -> Self {
        Self::new(style::EMPTY, "")
    }

    /// Empty board cell in column `x`.
    pub const fn board_background(x: usize) -> Self {
        Self::new(style::BOARD_COLUMNS[x % 2], "")
    }

    pub const fn filled(rgb: Rgb) -> Self {
        Self::new(style::bg_only(terminal_color(rgb)), "")
    }

    /// Landing preview of the active piece: brackets in the piece color.
    pub const fn ghost(rgb: Rgb) -> Self {
        Self::new(Style::new().fg(terminal_color(rgb)).bg(color::BLACK), "[]")
    }

    pub const fn from_cell(cell: Cell) -> Self {
        match cell.color() {
            Some(rgb) => Self::filled(rgb),
            None => Self::empty(),
        }
    }

    /// Like [`Self::from_cell`], but empty cells show the board background of column `x`.
    pub const fn from_board_cell(cell: Cell, x: usize) -> Self {
        match cell.color() {
            Some(rgb) => Self::filled(rgb),
            None => Self::board_background(x),
        }
    }
}

impl Widget for CellDisplay {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &CellDisplay {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        // Use a Paragraph to fill the whole area, not just the cells with the symbol
        Paragraph::new(self.symbol)
            .style(self.style)
            .centered()
            .render(area, buf);
    }
}
