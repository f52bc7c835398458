// ctf_core/src/rules.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::agent::{Agent, AgentState};
use crate::error::SetupError;
use crate::types::Team;

/// Tunable match parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    /// Captures needed to win outright.
    pub flags_to_win: u32,
    /// Match length in seconds. `None` plays until a team wins.
    pub time_limit: Option<f64>,
    /// Contact distance between two agents.
    pub tag_radius: f64,
    /// Contact distance between an agent and a flag.
    pub pickup_radius: f64,
    /// How close to its prison spot a tagged agent must get to count as jailed.
    pub arrival_tolerance: f64,
    /// How far past the centre line returning agents aim for.
    pub home_depth: f64,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            flags_to_win: 4,
            time_limit: None,
            tag_radius: 0.5,
            pickup_radius: 0.5,
            arrival_tolerance: 0.1,
            home_depth: 1.0,
        }
    }
}

impl MatchRules {
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.flags_to_win == 0 {
            return Err(SetupError::InvalidRule("flags_to_win"));
        }
        if self.time_limit.is_some_and(|t| t <= 0.0 || !t.is_finite()) {
            return Err(SetupError::InvalidRule("time_limit"));
        }
        for (name, value) in [
            ("tag_radius", self.tag_radius),
            ("pickup_radius", self.pickup_radius),
            ("arrival_tolerance", self.arrival_tolerance),
            ("home_depth", self.home_depth),
        ] {
            if value <= 0.0 || !value.is_finite() {
                return Err(SetupError::InvalidRule(name));
            }
        }
        Ok(())
    }

    /// Decides whether the match is over.
    ///
    /// Captures are checked first, then full imprisonment, then the clock.
    pub fn evaluate(&self, score: &Scoreboard, agents: &[Agent], clock: f64) -> Option<MatchOutcome> {
        let red_done = score.red >= self.flags_to_win;
        let blue_done = score.blue >= self.flags_to_win;
        match (red_done, blue_done) {
            (true, true) => return Some(MatchOutcome::Draw),
            (true, false) => return Some(MatchOutcome::winner(Team::Red, WinReason::FlagCaptures)),
            (false, true) => return Some(MatchOutcome::winner(Team::Blue, WinReason::FlagCaptures)),
            (false, false) => {}
        }

        let red_jailed = all_in_prison(agents, Team::Red);
        let blue_jailed = all_in_prison(agents, Team::Blue);
        match (red_jailed, blue_jailed) {
            (true, true) => return Some(MatchOutcome::Draw),
            (false, true) => {
                return Some(MatchOutcome::winner(Team::Red, WinReason::AllOpponentsImprisoned))
            }
            (true, false) => {
                return Some(MatchOutcome::winner(Team::Blue, WinReason::AllOpponentsImprisoned))
            }
            (false, false) => {}
        }

        let limit = self.time_limit?;
        if clock < limit {
            return None;
        }
        if score.red != score.blue {
            let leader = if score.red > score.blue { Team::Red } else { Team::Blue };
            return Some(MatchOutcome::winner(leader, WinReason::TimeLimit));
        }
        // Tie on captures: the team with fewer agents locked up wins.
        let red_confined = confined_count(agents, Team::Red);
        let blue_confined = confined_count(agents, Team::Blue);
        Some(match red_confined.cmp(&blue_confined) {
            std::cmp::Ordering::Less => MatchOutcome::winner(Team::Red, WinReason::TimeLimit),
            std::cmp::Ordering::Greater => MatchOutcome::winner(Team::Blue, WinReason::TimeLimit),
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
        })
    }
}

fn all_in_prison(agents: &[Agent], team: Team) -> bool {
    let mut members = agents.iter().filter(|a| a.team == team).peekable();
    members.peek().is_some() && members.all(|a| a.state == AgentState::InPrison)
}

fn confined_count(agents: &[Agent], team: Team) -> usize {
    agents
        .iter()
        .filter(|a| a.team == team && a.is_confined())
        .count()
}

/// Captured flags per team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub red: u32,
    pub blue: u32,
}

impl Scoreboard {
    pub fn get(&self, team: Team) -> u32 {
        match team {
            Team::Red => self.red,
            Team::Blue => self.blue,
        }
    }

    /// Adds a capture and returns the team's new total.
    pub fn award(&mut self, team: Team) -> u32 {
        let slot = match team {
            Team::Red => &mut self.red,
            Team::Blue => &mut self.blue,
        };
        *slot += 1;
        *slot
    }
}

impl fmt::Display for Scoreboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Red {} - {} Blue", self.red, self.blue)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinReason {
    FlagCaptures,
    AllOpponentsImprisoned,
    TimeLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Winner { team: Team, reason: WinReason },
    Draw,
}

impl MatchOutcome {
    pub fn winner(team: Team, reason: WinReason) -> Self {
        MatchOutcome::Winner { team, reason }
    }

    pub fn winning_team(&self) -> Option<Team> {
        match self {
            MatchOutcome::Winner { team, .. } => Some(*team),
            MatchOutcome::Draw => None,
        }
    }
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOutcome::Winner { team, reason } => {
                let why = match reason {
                    WinReason::FlagCaptures => "captured enough flags",
                    WinReason::AllOpponentsImprisoned => "imprisoned every opponent",
                    WinReason::TimeLimit => "led when time ran out",
                };
                write!(f, "{team} wins ({why})")
            }
            MatchOutcome::Draw => write!(f, "Draw"),
        }
    }
}
