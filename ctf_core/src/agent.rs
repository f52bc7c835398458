// ctf_core/src/agent.rs

use std::fmt;

use crate::brain::Brain;
use crate::types::{AgentHandle, FlagHandle, Point2, Team};

/// Who is steering an agent this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Control {
    #[default]
    Ai,
    Player,
}

/// The agent's state machine.
///
/// The first group of states is chosen freely by a `Brain` (or set by the
/// player controller). The last three are "locked": they are entered through
/// game rules only (tagging, arrival, rescue) and neither brains nor player
/// input can leave them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AgentState {
    #[default]
    Idle,
    Patrolling,
    Chasing(AgentHandle),
    /// Fleeing a nearby defender while inside enemy territory.
    Avoiding,
    /// Heading for an enemy flag.
    Raiding,
    /// Carrying an enemy flag back home.
    ReturningFlag,
    /// Heading to an imprisoned teammate.
    Rescuing,
    /// Leading a freed teammate back home.
    Escorting,
    /// Steered by the player.
    Controlled,
    /// Following the given rescuer out of prison.
    UnderRescue(AgentHandle),
    /// Tagged, walking to the given spot inside the team's prison.
    MovingToPrison(Point2),
    InPrison,
}

impl AgentState {
    pub fn is_locked(&self) -> bool {
        matches!(
            self,
            AgentState::UnderRescue(_) | AgentState::MovingToPrison(_) | AgentState::InPrison
        )
    }

    pub fn is_confined(&self) -> bool {
        matches!(self, AgentState::MovingToPrison(_) | AgentState::InPrison)
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentState::Idle => write!(f, "Idle"),
            AgentState::Patrolling => write!(f, "Patrolling"),
            AgentState::Chasing(target) => write!(f, "Chasing({target})"),
            AgentState::Avoiding => write!(f, "Avoiding"),
            AgentState::Raiding => write!(f, "Raiding"),
            AgentState::ReturningFlag => write!(f, "ReturningFlag"),
            AgentState::Rescuing => write!(f, "Rescuing"),
            AgentState::Escorting => write!(f, "Escorting"),
            AgentState::Controlled => write!(f, "Controlled"),
            AgentState::UnderRescue(rescuer) => write!(f, "UnderRescue({rescuer})"),
            AgentState::MovingToPrison(spot) => {
                write!(f, "MovingToPrison({:.2}, {:.2})", spot.x, spot.y)
            }
            AgentState::InPrison => write!(f, "InPrison"),
        }
    }
}

/// A team-affiliated character, either AI-driven or steered by the player.
#[derive(Debug, Clone)]
pub struct Agent {
    pub handle: AgentHandle,
    pub name: String,
    pub team: Team,
    pub position: Point2,
    /// Units per second.
    pub speed: f64,
    pub control: Control,
    pub state: AgentState,
    pub carrying: Option<FlagHandle>,
    pub escorting: Option<AgentHandle>,
    pub brain: Box<dyn Brain>,
}

impl Agent {
    pub fn new(
        handle: AgentHandle,
        name: impl Into<String>,
        team: Team,
        position: Point2,
        speed: f64,
        brain: Box<dyn Brain>,
    ) -> Self {
        Self {
            handle,
            name: name.into(),
            team,
            position,
            speed,
            control: Control::Ai,
            state: AgentState::Idle,
            carrying: None,
            escorting: None,
            brain,
        }
    }

    pub fn is_confined(&self) -> bool {
        self.state.is_confined()
    }

    /// Agents walking to or sitting in prison cannot be tagged again.
    pub fn is_taggable(&self) -> bool {
        !self.is_confined()
    }

    /// Not confined and not being led out of prison.
    pub fn is_free(&self) -> bool {
        !self.state.is_locked()
    }

    /// Free to pick up a flag or start a rescue.
    pub fn can_take_objective(&self) -> bool {
        self.is_free() && self.carrying.is_none() && self.escorting.is_none()
    }

    pub fn is_player_controlled(&self) -> bool {
        self.control == Control::Player
    }

    /// Moves the state machine, logging the transition.
    pub fn transition(&mut self, next: AgentState) {
        if self.state != next {
            tracing::debug!("{} ({}): {} -> {}", self.name, self.team, self.state, next);
            self.state = next;
        }
    }

    /// Returns to `Idle` unless the player is steering, in which case the
    /// agent stays `Controlled`.
    pub fn settle(&mut self) {
        let next = if self.is_player_controlled() {
            AgentState::Controlled
        } else {
            AgentState::Idle
        };
        self.transition(next);
    }
}
