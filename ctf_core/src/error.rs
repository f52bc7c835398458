// ctf_core/src/error.rs

use thiserror::Error;

use crate::types::Team;

/// Everything that can be wrong with an arena before the first tick.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SetupError {
    #[error("bounds min {min:?} must not exceed max {max:?}")]
    InvalidBounds { min: [f64; 2], max: [f64; 2] },

    #[error("centre line x = {0} must lie strictly inside the field")]
    CenterLineOutside(f64),

    #[error("team {0} has no agents")]
    EmptyTeam(Team),

    #[error("team {0} has no prison")]
    MissingPrison(Team),

    #[error("team {0} has more than one prison")]
    DuplicatePrison(Team),

    #[error("duplicate agent name '{0}'")]
    DuplicateAgent(String),

    #[error("{what} '{name}' lies outside the field")]
    OutsideField { what: &'static str, name: String },

    #[error("flag '{name}' of team {team} must start in its own territory")]
    FlagOutsideTerritory { name: String, team: Team },

    #[error("agent '{name}' needs a positive speed, got {speed}")]
    InvalidSpeed { name: String, speed: f64 },

    #[error("rule '{0}' must be positive")]
    InvalidRule(&'static str),

    #[error("roster agent '{0}' does not exist")]
    UnknownRosterAgent(String),

    #[error("roster mixes teams: '{0}' is not on team {1}")]
    MixedRoster(String, Team),
}
