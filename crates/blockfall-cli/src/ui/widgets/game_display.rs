use blockfall_engine::{GamePhase, GameState, PieceSupplier};
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use crate::ui::widgets::{FieldDisplay, PieceDisplay, StatsDisplay, color, style};

/// The whole play screen: stats, the field with its active and ghost piece,
/// and the next piece.
#[derive(Debug)]
pub struct GameDisplay<'a, S> {
    game: &'a GameState<S>,
    paused: bool,
}

impl<'a, S> GameDisplay<'a, S>
where
    S: PieceSupplier,
{
    pub fn new(game: &'a GameState<S>) -> Self {
        Self {
            game,
            paused: false,
        }
    }

    pub fn paused(self, paused: bool) -> Self {
        Self { paused, ..self }
    }

    /// Total height needed by the widget.
    pub fn height(&self) -> u16 {
        self.field_display(Color::Reset).height()
    }

    fn border_color(&self) -> Color {
        match self.game.phase() {
            GamePhase::GameOver => color::RED,
            GamePhase::Falling if self.paused => color::YELLOW,
            GamePhase::Falling => color::WHITE,
        }
    }

    fn field_display(&self, border_color: Color) -> FieldDisplay<'a> {
        let game = self.game;
        let dy = game.ghost_position().y - game.active_piece_position().y;
        FieldDisplay::new(game.field())
            .block(Block::bordered().border_style(border_color).style(style::DEFAULT))
            .ghost(
                game.active_piece_cells()
                    .into_iter()
                    .map(|(x, y, cell)| (x, y + dy, cell)),
            )
            .piece(game.active_piece_cells())
    }
}

impl<S> Widget for GameDisplay<'_, S>
where
    S: PieceSupplier,
{
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl<S> Widget for &GameDisplay<'_, S>
where
    S: PieceSupplier,
{
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let block_padding = Padding::symmetric(1, 0);
        let border_color = self.border_color();
        let panel = |title| {
            Block::bordered()
                .title(Line::from(title).centered())
                .padding(block_padding)
                .border_style(border_color)
                .style(style::DEFAULT)
        };

        let field = self.field_display(border_color);
        let next_panel = PieceDisplay::new()
            .piece(self.game.next_piece())
            .block(panel("NEXT"));
        let stats = StatsDisplay::new(self.game.stats()).block(panel("STATS"));

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(stats.width()),
            Constraint::Length(field.width()),
            Constraint::Length(next_panel.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [stats_area] = Layout::vertical([Constraint::Length(stats.height())]).areas(left_column);
        let [field_area] =
            Layout::vertical([Constraint::Length(field.height())]).areas(center_column);
        let [next_area] =
            Layout::vertical([Constraint::Length(next_panel.height())]).areas(right_column);

        let field_width = field.width();
        stats.render(stats_area, buf);
        field.render(field_area, buf);
        next_panel.render(next_area, buf);

        let popup = match self.game.phase() {
            GamePhase::GameOver => Some((
                "GAME OVER",
                Style::new().fg(color::WHITE).bg(color::RED),
            )),
            GamePhase::Falling if self.paused => Some((
                "PAUSED",
                Style::new().fg(color::BLACK).bg(color::YELLOW),
            )),
            GamePhase::Falling => None,
        };

        if let Some((text, style)) = popup {
            let block = Block::new().style(style);
            let text = Text::styled(text, style).centered();
            let area = field_area.centered(Constraint::Length(field_width), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}
