use std::mem;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{
    GameConfigError, PieceCollisionError,
    core::{Cell, Field, PIECE_SIZE, Piece},
};

use super::{GameConfig, GameStats, PieceSupplier};

/// Row of the piece box when a piece spawns, two rows above the board.
pub const SPAWN_Y: i32 = -2;

/// Board position of cell `(0, 0)` of the active piece box.
///
/// `y` grows downward and is negative while the box is above the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GamePhase {
    /// The active piece is descending.
    Falling,
    /// A locked piece reached the spawn row; the next tick wipes the board.
    GameOver,
}

/// Tick-driven game state: the field, the active and upcoming pieces, and the
/// drop countdown.
///
/// The state never halts. Once a locked piece occupies the spawn row the next
/// [`update`](Self::update) clears the board and play resumes with the piece
/// that was already queued.
#[derive(Debug, Clone)]
pub struct GameState<S> {
    config: GameConfig,
    field: Field,
    piece: Piece,
    next_piece: Piece,
    position: Position,
    delay: i32,
    stats: GameStats,
    supplier: S,
}

fn spawn_piece<S: PieceSupplier>(supplier: &mut S) -> Piece {
    let (shape, color) = supplier.next_piece();
    Piece::new(shape, color)
}

impl<S> GameState<S>
where
    S: PieceSupplier,
{
    /// Creates a game on a `width`×`height` board with the default drop timing.
    pub fn new(width: usize, height: usize, supplier: S) -> Result<Self, GameConfigError> {
        Self::with_config(
            GameConfig {
                width,
                height,
                ..GameConfig::default()
            },
            supplier,
        )
    }

    pub fn with_config(config: GameConfig, mut supplier: S) -> Result<Self, GameConfigError> {
        config.validate()?;
        let field = Field::new(config.width, config.height)?;
        let piece = spawn_piece(&mut supplier);
        let next_piece = spawn_piece(&mut supplier);
        let mut state = Self {
            config,
            field,
            piece,
            next_piece,
            position: Position::new(0, SPAWN_Y),
            delay: 0,
            stats: GameStats::new(),
            supplier,
        };
        state.setup();
        Ok(state)
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn field(&self) -> &Field {
        &self.field
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn active_piece(&self) -> &Piece {
        &self.piece
    }

    #[must_use]
    pub fn next_piece(&self) -> &Piece {
        &self.next_piece
    }

    #[must_use]
    pub fn active_piece_position(&self) -> Position {
        self.position
    }

    /// Returns `(x, y, cell)` in board coordinates for every cell of the active piece.
    ///
    /// Rows above the board come out with a negative `y`.
    #[must_use]
    pub fn active_piece_cells(&self) -> ArrayVec<(i32, i32, Cell), { PIECE_SIZE * PIECE_SIZE }> {
        let Position { x, y } = self.position;
        self.piece
            .occupied_cells()
            .into_iter()
            .map(|(col, row, cell)| (x + box_coord(col), y + box_coord(row), cell))
            .collect()
    }

    /// Returns the locked cell at `(x, y)`, or `None` outside the visible board.
    #[must_use]
    pub fn field_cell_at(&self, x: usize, y: usize) -> Option<Cell> {
        self.field.get(x, y)
    }

    /// Position the active piece would land at after a hard drop.
    #[must_use]
    pub fn ghost_position(&self) -> Position {
        let Position { x, mut y } = self.position;
        while self.check(x, y + 1) {
            y += 1;
        }
        Position::new(x, y)
    }

    /// Ticks left before the next automatic drop or lock.
    #[must_use]
    pub fn delay(&self) -> i32 {
        self.delay
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        if self.field.is_over() {
            GamePhase::GameOver
        } else {
            GamePhase::Falling
        }
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.phase().is_game_over()
    }

    fn spawn_x(&self) -> i32 {
        i32::try_from(self.config.width / 2).unwrap_or(i32::MAX) - 1
    }

    fn setup(&mut self) {
        self.delay = self.config.drop_delay;
        self.position = Position::new(self.spawn_x(), SPAWN_Y);
    }

    fn check(&self, x: i32, y: i32) -> bool {
        self.field.can_place(x, y, &self.piece)
    }

    /// Returns whether the active piece can fall one more row.
    #[must_use]
    pub fn check_down(&self) -> bool {
        self.check(self.position.x, self.position.y + 1)
    }

    fn try_move_to(&mut self, x: i32, y: i32) -> Result<(), PieceCollisionError> {
        if !self.check(x, y) {
            return Err(PieceCollisionError);
        }
        self.position = Position::new(x, y);
        Ok(())
    }

    /// Advances the game by one tick.
    ///
    /// 1. The delay counts down by one.
    /// 2. A board whose spawn row is occupied is wiped and the active piece
    ///    respawns.
    /// 3. A resting piece locks once the delay has run out; full rows are
    ///    cleared and the queued piece spawns.
    /// 4. Otherwise an expired delay drops the piece one row. A piece that
    ///    comes to rest this way gets `grace_factor` times the usual delay.
    pub fn update(&mut self) {
        self.delay -= 1;

        if self.field.is_over() {
            self.restart();
        } else if !self.check_down() {
            if self.delay < 0 {
                self.lock_piece();
            }
        } else if self.delay < 0 {
            self.position.y += 1;
            self.delay = if self.check_down() {
                self.config.drop_delay
            } else {
                self.config.grace_delay().unwrap_or(i32::MAX)
            };
        }
    }

    fn restart(&mut self) {
        self.field.clear();
        self.stats.restart();
        self.setup();
    }

    fn lock_piece(&mut self) {
        self.field.put(self.position.x, self.position.y, &self.piece);
        let cleared_lines = self.field.resolve_lines();
        self.stats.complete_piece_drop(cleared_lines);

        let next = spawn_piece(&mut self.supplier);
        self.piece = mem::replace(&mut self.next_piece, next);
        self.setup();
    }

    pub fn move_left(&mut self) -> Result<(), PieceCollisionError> {
        self.try_move_to(self.position.x - 1, self.position.y)
    }

    pub fn move_right(&mut self) -> Result<(), PieceCollisionError> {
        self.try_move_to(self.position.x + 1, self.position.y)
    }

    /// Drops the piece one row if possible.
    ///
    /// The drop delay is restored even when the piece cannot fall.
    pub fn soft_drop(&mut self) -> Result<(), PieceCollisionError> {
        self.delay = self.config.drop_delay;
        self.try_move_to(self.position.x, self.position.y + 1)
    }

    /// Drops the piece as far as it goes and returns the number of rows it fell.
    ///
    /// The delay is set to zero so the next [`update`](Self::update) locks the piece.
    pub fn hard_drop(&mut self) -> usize {
        let mut rows = 0;
        while self.check_down() {
            self.position.y += 1;
            rows += 1;
        }
        self.delay = 0;
        rows
    }

    /// Rotates the piece clockwise, turning further until an orientation fits.
    ///
    /// When no other orientation fits, the fourth turn restores the original
    /// one and an error is returned.
    pub fn rotate(&mut self) -> Result<(), PieceCollisionError> {
        let Position { x, y } = self.position;
        for _ in 1..PIECE_SIZE {
            self.piece.rotate();
            if self.check(x, y) {
                return Ok(());
            }
        }
        self.piece.rotate();
        Err(PieceCollisionError)
    }
}

fn box_coord(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
