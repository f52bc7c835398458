// ctf_core/src/events.rs

use crate::rules::{MatchOutcome, Scoreboard};
use crate::types::{AgentHandle, FlagHandle, Point2, Team};

/// Everything noteworthy that happened during a tick, in order.
/// The simulation layer turns these into Bevy events and log lines.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    AgentSelected {
        agent: AgentHandle,
    },
    /// The player lost (or gave up) control of an agent.
    ControlReleased {
        agent: AgentHandle,
    },
    FlagPickedUp {
        agent: AgentHandle,
        flag: FlagHandle,
    },
    /// A carrier was tagged; the flag went back to its base.
    FlagDropped {
        agent: AgentHandle,
        flag: FlagHandle,
    },
    FlagCaptured {
        agent: AgentHandle,
        flag: FlagHandle,
        team: Team,
        score: Scoreboard,
    },
    Tagged {
        tagger: Option<AgentHandle>,
        tagged: AgentHandle,
        prison_spot: Point2,
    },
    Imprisoned {
        agent: AgentHandle,
    },
    RescueStarted {
        rescuer: AgentHandle,
        prisoner: AgentHandle,
    },
    Freed {
        agent: AgentHandle,
        rescuer: Option<AgentHandle>,
    },
    MatchEnded {
        outcome: MatchOutcome,
        score: Scoreboard,
        clock: f64,
    },
}
