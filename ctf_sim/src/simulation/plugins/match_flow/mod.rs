// ctf_sim/src/simulation/plugins/match_flow/mod.rs

//! Everything around the match itself: event logs, pausing, the end of a
//! round, the next round, and the final report.

use crate::prelude::*;
use crate::simulation::config::{positive_duration, ConfigError};

// --- Sub-modules for organization ---
mod report;
mod systems;

pub use report::{write_report, MatchLog, MatchReport, RoundReport, RoundStats};

use systems::{
    detect_round_end, finish_round, freeze_match_time, log_game_events, resume_match_time,
    tick_pause_timer,
};

pub struct MatchFlowPlugin;

impl Plugin for MatchFlowPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RoundStats>()
            .init_resource::<MatchLog>()
            // --- RUNTIME ---
            .add_systems(
                FixedUpdate,
                (log_game_events, detect_round_end)
                    .chain()
                    .in_set(SimulationSet::Events),
            )
            // --- PAUSE ---
            .add_systems(OnEnter(AppState::Paused), freeze_match_time)
            .add_systems(
                Update,
                tick_pause_timer.run_if(in_state(AppState::Paused)),
            )
            .add_systems(OnExit(AppState::Paused), resume_match_time)
            // --- ROUND END ---
            .add_systems(OnEnter(AppState::GameOver), finish_round);
    }
}

/// How much longer a scripted pause lasts, in wall-clock (or manual) time.
#[derive(Resource, Debug, Clone)]
pub struct PauseTimer(pub Timer);

impl PauseTimer {
    pub fn new(seconds: f64) -> Result<Self, ConfigError> {
        let duration = positive_duration("pause.seconds", seconds)?;
        Ok(Self(Timer::new(duration, TimerMode::Once)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pause_timers_need_a_representable_length() {
        let timer = PauseTimer::new(0.5).unwrap();
        assert_eq!(timer.0.duration().as_millis(), 500);
        assert!(PauseTimer::new(1e300).is_err());
        assert!(PauseTimer::new(f64::NAN).is_err());
        assert!(PauseTimer::new(0.0).is_err());
    }
}
