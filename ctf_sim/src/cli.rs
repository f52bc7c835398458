// ctf_sim/src/cli.rs

use bevy::prelude::Resource;
use clap::Parser;
use std::path::PathBuf;

/// Headless capture-the-flag arena.
///
/// This struct defines the command-line arguments accepted by the `ctf_sim`
/// binary. Values given here override the scenario file.
#[derive(Parser, Debug, Resource, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/skirmish.toml")]
    pub scenario: PathBuf,

    /// Root of the prefab catalog referenced by `from = "..."` entries.
    #[arg(long, default_value = "assets/catalog")]
    pub catalog: PathBuf,

    /// Seed for the simulation RNG. Overrides `[simulation] seed`.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of rounds to play. Overrides `[simulation] rounds`.
    #[arg(long)]
    pub rounds: Option<u32>,

    /// Where to write the TOML match report. Overrides `[report] path`.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Pace the match in wall-clock time instead of running ticks back to back.
    #[arg(long, default_value_t = false)]
    pub realtime: bool,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            scenario: PathBuf::from("assets/scenarios/skirmish.toml"),
            catalog: PathBuf::from("assets/catalog"),
            seed: None,
            rounds: None,
            report: None,
            realtime: false,
        }
    }
}
