// ctf_sim/src/simulation/core/app_state.rs

use bevy::{ecs::schedule::SystemSet, prelude::States};

/// Defines the major phases of the application's lifecycle.
#[derive(States, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    /// The initial state. The scenario and the prefab catalog are read here.
    #[default]
    Loading,

    /// Configuration is resolved. We are now building the arena and
    /// spawning the entities that mirror it.
    SceneBuilding,

    /// The arena ticks on `FixedUpdate`.
    Running,

    /// The match clock is frozen. Entered from a scripted pause.
    Paused,

    /// A round is over. Either the next round starts or the app exits.
    GameOver,
}

/// System sets to control the order of execution during the SceneBuilding state.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneBuildSet {
    /// Pass 1: Validate the config and build the pure arena.
    BuildArena,

    /// Pass 2: Seed the RNG and configure the fixed tick.
    Resources,

    /// Pass 3: Spawn one entity per agent and per flag.
    Spawn,

    /// Pass 4: Hand over to the running state.
    Finalize,
}

// =========================================================================
// == Main Simulation Sets (The "Data Flow Graph") ==
// =========================================================================

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Turns the player script into this tick's input.
    Input,
    /// Advances the arena by one fixed step. The only writer of arena state.
    Step,
    /// Reacts to the tick's events: scoring, round end, pause.
    Events,
    /// Copies arena state onto the mirror entities.
    StateSync,
}
