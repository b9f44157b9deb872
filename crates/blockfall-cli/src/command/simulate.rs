use blockfall_engine::{GameState, GameStats, PieceSeed, RandomPieceSupplier};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::command::BoardArg;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    #[clap(flatten)]
    pub(super) board: BoardArg,
    /// Number of game ticks to run
    #[clap(long, default_value_t = 10_000)]
    pub(super) ticks: u64,
    /// Seed for the pieces and the player (32 hex digits); random when omitted
    #[clap(long)]
    pub(super) seed: Option<PieceSeed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct SimulationReport {
    seed: PieceSeed,
    width: usize,
    height: usize,
    ticks: u64,
    game_over: bool,
    stats: GameStats,
    /// Final board, top row first, `#` for occupied cells
    field: Vec<String>,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let report = simulate(arg.board, arg.ticks, seed)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Player generator seeded from the piece seed with its two halves swapped.
fn player_rng(seed: PieceSeed) -> Pcg32 {
    let bytes = u128::from_be_bytes(seed.to_bytes()).rotate_left(64);
    Pcg32::from_seed(bytes.to_be_bytes())
}

fn simulate(board: BoardArg, ticks: u64, seed: PieceSeed) -> anyhow::Result<SimulationReport> {
    let config = board.config();
    let mut game = GameState::with_config(config, RandomPieceSupplier::with_seed(seed))?;
    let mut player = player_rng(seed);

    for _ in 0..ticks {
        // roughly one intent every four ticks
        match player.random_range(0..32) {
            0..=2 => _ = game.move_left(),
            3..=5 => _ = game.move_right(),
            6 | 7 => _ = game.rotate(),
            8 => _ = game.soft_drop(),
            9 => _ = game.hard_drop(),
            _ => {}
        }
        game.update();
    }

    Ok(SimulationReport {
        seed,
        width: config.width,
        height: config.height,
        ticks,
        game_over: game.is_game_over(),
        stats: game.stats().clone(),
        field: game.field().to_ascii(),
    })
}
