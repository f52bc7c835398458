// ctf_sim/src/lib.rs

use bevy::prelude::*;

// Import the plugins defined within the simulation crate.
use crate::simulation::config::ConfigPlugin;
use crate::simulation::core::simulation_setup::SimulationSetupPlugin;
use crate::simulation::plugins::arena::ArenaPlugin;
use crate::simulation::plugins::match_flow::MatchFlowPlugin;
use crate::simulation::plugins::player::PlayerScriptPlugin;

// This prelude is for convenience for other files WITHIN the ctf_sim crate.
pub mod prelude;

// This module contains all the simulation-specific logic.
pub mod cli;
pub mod simulation;

/// The main plugin that brings together all the simulation parts.
/// `main.rs` adds this one plugin plus the Bevy basics.
pub struct CtfSimulationPlugin;

impl Plugin for CtfSimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            // Reads the scenario and the prefab catalog.
            ConfigPlugin,
            // Builds the arena, seeds the RNG, spawns the mirror entities.
            SimulationSetupPlugin,
            // Steps the arena on FixedUpdate.
            ArenaPlugin,
            // Stands in for the keyboard.
            PlayerScriptPlugin,
            // Logs, pauses, rounds, report.
            MatchFlowPlugin,
        ));
    }
}
