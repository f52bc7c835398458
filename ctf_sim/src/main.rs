// ctf_sim/src/main.rs

//! Headless capture-the-flag arena.
//!
//! Loads a scenario, plays the configured number of rounds and optionally
//! writes a TOML match report.
//!
//! To run the bundled skirmish:
//! `cargo run --bin ctf_sim -- --scenario assets/scenarios/skirmish.toml`

use std::time::Duration;

use bevy::{app::ScheduleRunnerPlugin, log::LogPlugin, prelude::*, state::app::StatesPlugin};
use clap::Parser;
use ctf_sim::{cli::Cli, prelude::AppState, CtfSimulationPlugin};

fn main() -> AppExit {
    let cli = Cli::parse();

    let mut app = App::new();

    // --- 1. Core Bevy Plugins, no window ---
    app.add_plugins(
        // Loop without sleeping; the fixed tick paces the match.
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)),
    )
    .add_plugins(StatesPlugin)
    .add_plugins(LogPlugin {
        level: bevy::log::Level::INFO,
        // A good filter for focusing on our crates' logs during development.
        filter: "info,ctf_sim=debug,ctf_core=debug".to_string(),
        ..default()
    })
    .insert_resource(cli);

    app.init_state::<AppState>();

    // --- 2. Add the Main Simulation Plugin ---
    app.add_plugins(CtfSimulationPlugin);

    // --- 3. Run the App ---
    app.run()
}
