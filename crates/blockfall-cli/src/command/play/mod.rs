use blockfall_engine::{GameState, PieceSeed, RandomPieceSupplier};

use crate::{command::BoardArg, tui::Runtime};

use self::app::PlayApp;

mod app;

const DEFAULT_FPS: u32 = 60;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    board: BoardArg,
    /// Game ticks per second; the piece falls one row every 30 ticks
    #[clap(long, default_value_t = DEFAULT_FPS, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,
    /// Seed for the piece sequence (32 hex digits); random when omitted
    #[clap(long)]
    seed: Option<PieceSeed>,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            board: BoardArg::default(),
            fps: DEFAULT_FPS,
            seed: None,
        }
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg { board, fps, seed } = arg;

    let supplier = seed.map_or_else(RandomPieceSupplier::new, RandomPieceSupplier::with_seed);
    let game = GameState::with_config(board.config(), supplier)?;
    let mut app = PlayApp::new(game, *fps);

    Runtime::new().run(&mut app)?;
    Ok(())
}
