use blockfall_engine::{DEFAULT_HEIGHT, DEFAULT_WIDTH, GameConfig};
use clap::{Parser, Subcommand};

use self::{play::PlayArg, simulate::SimulateArg};

mod play;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in (defaults to `play`)
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play in the terminal
    Play(#[clap(flatten)] PlayArg),
    /// Run the game headless with a random player and print a JSON report
    Simulate(#[clap(flatten)] SimulateArg),
}

/// Board size shared by every mode.
#[derive(Debug, Clone, Copy, clap::Args)]
pub(crate) struct BoardArg {
    /// Number of columns
    #[clap(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,
    /// Number of visible rows
    #[clap(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,
}

impl Default for BoardArg {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl BoardArg {
    fn config(self) -> GameConfig {
        GameConfig {
            width: self.width,
            height: self.height,
            ..GameConfig::default()
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Simulate(arg) => simulate::run(&arg)?,
    }
    Ok(())
}
