// ctf_sim/src/simulation/core/mod.rs

use crate::simulation::core::{
    components::{AgentStatus, ArenaWorld, FlagState},
    transforms::follow_arena_point,
};
use bevy::prelude::*;
use ctf_core::prelude::{AgentHandle, FlagHandle};

/// Copies the arena's agent and flag state onto their mirror entities.
pub fn mirror_sync_system(
    arena: Res<ArenaWorld>,
    mut agents: Query<(&AgentHandle, &mut AgentStatus, &mut Transform), Without<FlagHandle>>,
    mut flags: Query<(&FlagHandle, &mut FlagState, &mut Transform), Without<AgentHandle>>,
) {
    for (handle, mut status, mut transform) in &mut agents {
        let Some(agent) = arena.0.agent(*handle) else {
            continue;
        };
        follow_arena_point(&mut transform, &agent.position);

        // Only touch the component when it changed, so `Changed<AgentStatus>` means something.
        let next = AgentStatus::from(agent);
        if *status != next {
            *status = next;
        }
    }

    for (handle, mut state, mut transform) in &mut flags {
        let Some(flag) = arena.0.flag(*handle) else {
            continue;
        };
        follow_arena_point(&mut transform, &flag.position);
        let next = FlagState::from(flag);
        if *state != next {
            *state = next;
        }
    }
}

pub mod app_state;
pub mod components;
pub mod events;
pub mod prng;
pub mod simulation_setup;
pub mod transforms;
