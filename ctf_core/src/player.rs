// ctf_core/src/player.rs

//! Manual control over one agent of the player's roster at a time.

use crate::agent::{Agent, AgentState, Control};
use crate::events::GameEvent;
use crate::types::{AgentHandle, Vec2};

/// The player's commands for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Roster slot to take control of.
    pub select: Option<usize>,
    /// Give the current agent back to its brain.
    pub deselect: bool,
    /// Analog stick / arrow keys, each axis in [-1, 1].
    pub axis: Vec2,
}

impl PlayerInput {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn moving(axis: Vec2) -> Self {
        Self {
            axis,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlayerController {
    roster: Vec<AgentHandle>,
    selected: Option<AgentHandle>,
}

impl PlayerController {
    pub fn new(roster: Vec<AgentHandle>) -> Self {
        Self {
            roster,
            selected: None,
        }
    }

    pub fn roster(&self) -> &[AgentHandle] {
        &self.roster
    }

    pub fn selected(&self) -> Option<AgentHandle> {
        self.selected
    }

    /// Takes control of roster slot `index`.
    ///
    /// The current agent is released first. Agents that are confined or
    /// being rescued cannot be picked; the player then controls nobody.
    /// Out-of-range slots are ignored entirely.
    pub fn select(&mut self, index: usize, agents: &mut [Agent], events: &mut Vec<GameEvent>) {
        let Some(&handle) = self.roster.get(index) else {
            return;
        };
        self.deselect(agents, events);

        let Some(agent) = agents.iter_mut().find(|a| a.handle == handle) else {
            return;
        };
        if !agent.is_free() {
            tracing::debug!("{} cannot be selected while {}", agent.name, agent.state);
            return;
        }
        agent.control = Control::Player;
        agent.transition(AgentState::Controlled);
        self.selected = Some(handle);
        events.push(GameEvent::AgentSelected { agent: handle });
    }

    /// Hands the selected agent back to its brain.
    pub fn deselect(&mut self, agents: &mut [Agent], events: &mut Vec<GameEvent>) {
        let Some(handle) = self.selected.take() else {
            return;
        };
        if let Some(agent) = agents.iter_mut().find(|a| a.handle == handle) {
            release(agent);
        }
        events.push(GameEvent::ControlReleased { agent: handle });
    }

    /// Drops the selection if the selected agent can no longer be steered.
    pub fn enforce(&mut self, agents: &mut [Agent], events: &mut Vec<GameEvent>) {
        let Some(handle) = self.selected else {
            return;
        };
        let still_usable = agents
            .iter()
            .find(|a| a.handle == handle)
            .is_some_and(|a| a.is_free() && a.is_player_controlled());
        if !still_usable {
            self.deselect(agents, events);
        }
    }

    /// Applies selection changes from this tick's input.
    pub fn apply(&mut self, input: &PlayerInput, agents: &mut [Agent], events: &mut Vec<GameEvent>) {
        if input.deselect {
            self.deselect(agents, events);
        }
        if let Some(index) = input.select {
            self.select(index, agents, events);
        }
        self.enforce(agents, events);
    }

    /// Forgets the selection without touching the agents. Used on reset.
    pub fn clear(&mut self) {
        self.selected = None;
    }
}

/// Returns an agent to AI control. Unconfined agents fall back to `Idle`
/// unless they are busy with a flag or an escort.
pub(crate) fn release(agent: &mut Agent) {
    agent.control = Control::Ai;
    if agent.state.is_locked() {
        return;
    }
    let next = if agent.carrying.is_some() {
        AgentState::ReturningFlag
    } else if agent.escorting.is_some() {
        AgentState::Escorting
    } else {
        AgentState::Idle
    };
    agent.transition(next);
}
