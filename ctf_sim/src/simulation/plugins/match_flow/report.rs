// ctf_sim/src/simulation/plugins/match_flow/report.rs

use bevy::prelude::Resource;
use ctf_core::prelude::{GameEvent, MatchOutcome, Team, WinReason};
use serde::Serialize;
use std::{fs, path::Path};

use crate::simulation::config::ConfigError;

/// Event tallies for the round in progress.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundStats {
    pub tags: u32,
    pub captures: u32,
    pub pickups: u32,
    pub drops: u32,
    pub rescues: u32,
    pub selections: u32,
}

impl RoundStats {
    pub fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Tagged { .. } => self.tags += 1,
            GameEvent::FlagCaptured { .. } => self.captures += 1,
            GameEvent::FlagPickedUp { .. } => self.pickups += 1,
            GameEvent::FlagDropped { .. } => self.drops += 1,
            GameEvent::Freed { .. } => self.rescues += 1,
            GameEvent::AgentSelected { .. } => self.selections += 1,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundReport {
    pub round: u32,
    /// Human-readable result, "unfinished" when the round hit the duration cap.
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Team>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<WinReason>,
    pub red_score: u32,
    pub blue_score: u32,
    pub duration_seconds: f64,
    pub stats: RoundStats,
}

impl RoundReport {
    pub fn is_unfinished(&self) -> bool {
        self.result == UNFINISHED
    }
}

const UNFINISHED: &str = "unfinished";

pub fn describe_outcome(outcome: Option<MatchOutcome>) -> String {
    match outcome {
        Some(outcome) => outcome.to_string(),
        None => UNFINISHED.to_string(),
    }
}

pub fn reason_of(outcome: Option<MatchOutcome>) -> Option<WinReason> {
    match outcome {
        Some(MatchOutcome::Winner { reason, .. }) => Some(reason),
        _ => None,
    }
}

/// Every round played so far.
#[derive(Resource, Debug, Default, Clone)]
pub struct MatchLog {
    pub rounds: Vec<RoundReport>,
}

/// What gets written to `[report] path` once the last round is over.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub tick_rate_hz: f64,
    pub rounds_played: u32,
    pub red_wins: u32,
    pub blue_wins: u32,
    pub draws: u32,
    pub unfinished: u32,
    // Arrays of tables go last in TOML.
    pub rounds: Vec<RoundReport>,
}

impl MatchReport {
    pub fn new(seed: Option<u64>, tick_rate_hz: f64, rounds: Vec<RoundReport>) -> Self {
        let wins = |team| rounds.iter().filter(|r| r.winner == Some(team)).count() as u32;
        let unfinished = rounds.iter().filter(|r| r.is_unfinished()).count() as u32;
        let decided = rounds.iter().filter(|r| r.winner.is_some()).count() as u32;
        Self {
            seed,
            tick_rate_hz,
            rounds_played: rounds.len() as u32,
            red_wins: wins(Team::Red),
            blue_wins: wins(Team::Blue),
            draws: rounds.len() as u32 - decided - unfinished,
            unfinished,
            rounds,
        }
    }
}

pub fn write_report(path: &Path, report: &MatchReport) -> Result<(), ConfigError> {
    let text = toml::to_string_pretty(report)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, text).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
