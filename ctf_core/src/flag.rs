// ctf_core/src/flag.rs

use crate::types::{AgentHandle, FlagHandle, Point2, Team};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagStatus {
    /// Sitting at its home position, free to be picked up by the enemy.
    AtBase,
    /// Being carried back by an enemy agent.
    Carried(AgentHandle),
    /// Brought home by the enemy. Out of play for the rest of the match.
    Captured,
}

/// A capturable objective belonging to a team.
#[derive(Debug, Clone)]
pub struct Flag {
    pub handle: FlagHandle,
    pub name: String,
    pub team: Team,
    pub home: Point2,
    pub position: Point2,
    pub status: FlagStatus,
}

impl Flag {
    pub fn new(handle: FlagHandle, name: impl Into<String>, team: Team, home: Point2) -> Self {
        Self {
            handle,
            name: name.into(),
            team,
            home,
            position: home,
            status: FlagStatus::AtBase,
        }
    }

    pub fn is_at_base(&self) -> bool {
        self.status == FlagStatus::AtBase
    }

    pub fn carrier(&self) -> Option<AgentHandle> {
        match self.status {
            FlagStatus::Carried(agent) => Some(agent),
            _ => None,
        }
    }

    pub fn attach(&mut self, agent: AgentHandle, at: Point2) {
        self.status = FlagStatus::Carried(agent);
        self.position = at;
    }

    /// Keeps a carried flag glued to its carrier.
    pub fn follow(&mut self, carrier_position: Point2) {
        if self.carrier().is_some() {
            self.position = carrier_position;
        }
    }

    /// Detaches the flag and puts it back where it started.
    pub fn reset(&mut self) {
        self.status = FlagStatus::AtBase;
        self.position = self.home;
    }

    pub fn mark_captured(&mut self) {
        self.status = FlagStatus::Captured;
    }
}
