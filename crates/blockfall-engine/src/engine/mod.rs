//! Game flow on top of the bit-packed core.
//!
//! - [`GameState`] - Active piece position, drop timing, locking, line clears, restarts
//! - [`GameConfig`] - Board size and drop timing constants
//! - [`GameStats`] - Locked pieces, cleared lines and restarts
//! - [`PieceSupplier`] - Source of the next shape and color
//! - [`RandomPieceSupplier`] - Seeded uniform shape/color selection
//!
//! # Game Flow
//!
//! 1. Create a [`GameState`] with a [`PieceSupplier`]
//! 2. Call [`GameState::update`] once per frame; the piece falls on its own
//! 3. Forward player intents (move, rotate, soft/hard drop) between frames
//! 4. A piece that cannot fall any further locks when its delay runs out,
//!    full rows are cleared and the next piece spawns above the board
//! 5. When a locked piece reaches the spawn row the board is wiped and play
//!    continues
//!
//! # Example
//!
//! ```
//! use blockfall_engine::{GameState, RandomPieceSupplier};
//!
//! let mut game = GameState::new(13, 20, RandomPieceSupplier::new()).unwrap();
//!
//! game.move_left().ok();
//! game.rotate().ok();
//! let rows = game.hard_drop();
//!
//! // the next tick locks the piece and spawns a new one
//! game.update();
//! assert_eq!(game.stats().completed_pieces(), 1);
//! # let _ = rows;
//! ```

pub use self::{game_config::*, game_state::*, game_stats::*, piece_supplier::*};

mod game_config;
mod game_state;
mod game_stats;
mod piece_supplier;
