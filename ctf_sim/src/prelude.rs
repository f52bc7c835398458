// ctf_sim/src/prelude.rs

// Re-export the entire Bevy prelude for convenience.
pub use bevy::prelude::*;

// Re-export the entire ctf_core prelude so you can easily access
// pure types like `Arena`, `AgentHandle`, `GameEvent`, etc.
pub use ctf_core::prelude::*;

// Both preludes export a `Vec2`. Inside the simulation, `Vec2` means the
// arena's f64 vector; use `bevy::math::Vec2` for the render-side one.
pub use ctf_core::prelude::Vec2;

// Re-export common simulation-specific types for easy access in other plugins.
pub use crate::simulation::config::structs::*;
pub use crate::simulation::core::app_state::{AppState, SceneBuildSet, SimulationSet};
pub use crate::simulation::core::components::{AgentStatus, ArenaWorld, BrainLabel, FlagState};
pub use crate::simulation::core::events::BevyGameEvent;
pub use crate::simulation::core::prng::SimulationRng;
