// ctf_sim/src/simulation/core/components.rs

use bevy::prelude::{Component, Resource};
use ctf_core::prelude::{Agent, AgentState, Arena, Control, Flag, FlagHandle, FlagStatus};

// --- Wrapper Resource for the Core World ---

/// The pure arena, owned by the ECS. Only the step system mutates it; every
/// other system reads it or the mirror components below.
#[derive(Resource, Debug)]
pub struct ArenaWorld(pub Arena);

// --- Mirror Components ---
// Agent entities carry `AgentHandle` + `Team` (both components via the core
// `bevy` feature) plus these; flag entities carry `FlagHandle` + `Team`.

/// The parts of an agent's state other systems care about.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct AgentStatus {
    pub state: AgentState,
    pub control: Control,
    pub carrying: Option<FlagHandle>,
}

impl From<&Agent> for AgentStatus {
    fn from(agent: &Agent) -> Self {
        Self {
            state: agent.state,
            control: agent.control,
            carrying: agent.carrying,
        }
    }
}

/// Which brain drives the agent, for logs and reports.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrainLabel(pub &'static str);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagState(pub FlagStatus);

impl From<&Flag> for FlagState {
    fn from(flag: &Flag) -> Self {
        Self(flag.status)
    }
}
