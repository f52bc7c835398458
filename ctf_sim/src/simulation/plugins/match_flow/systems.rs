// ctf_sim/src/simulation/plugins/match_flow/systems.rs

use crate::prelude::*;
use crate::simulation::plugins::player::{PlayerInputBuffer, PlayerScript};

use super::report::{describe_outcome, reason_of, write_report, MatchLog, MatchReport, RoundReport, RoundStats};
use super::PauseTimer;

fn agent_name(arena: &Arena, handle: AgentHandle) -> &str {
    arena.agent(handle).map(|a| a.name.as_str()).unwrap_or("?")
}

fn flag_name(arena: &Arena, handle: FlagHandle) -> &str {
    arena.flag(handle).map(|f| f.name.as_str()).unwrap_or("?")
}

// =========================================================================
// == Running ==
// =========================================================================

/// Turns the tick's game events into log lines and round statistics.
pub(super) fn log_game_events(
    mut events: EventReader<BevyGameEvent>,
    arena: Res<ArenaWorld>,
    mut stats: ResMut<RoundStats>,
) {
    let arena = &arena.0;
    let t = arena.clock();
    for BevyGameEvent(event) in events.read() {
        stats.record(event);
        match event {
            GameEvent::AgentSelected { agent } => {
                info!("[PLAYER] t={:.2} controlling '{}'", t, agent_name(arena, *agent));
            }
            GameEvent::ControlReleased { agent } => {
                info!("[PLAYER] t={:.2} released '{}'", t, agent_name(arena, *agent));
            }
            GameEvent::FlagPickedUp { agent, flag } => {
                info!(
                    "[FLAG] t={:.2} '{}' grabbed '{}'",
                    t,
                    agent_name(arena, *agent),
                    flag_name(arena, *flag)
                );
            }
            GameEvent::FlagDropped { agent, flag } => {
                info!(
                    "[FLAG] t={:.2} '{}' lost '{}', back to base",
                    t,
                    agent_name(arena, *agent),
                    flag_name(arena, *flag)
                );
            }
            GameEvent::FlagCaptured {
                agent,
                flag,
                team,
                score,
            } => {
                info!(
                    "[CAPTURE] t={:.2} '{}' brought '{}' home for {}. {}",
                    t,
                    agent_name(arena, *agent),
                    flag_name(arena, *flag),
                    team,
                    score
                );
            }
            GameEvent::Tagged {
                tagger, tagged, ..
            } => match tagger {
                Some(tagger) => info!(
                    "[TAG] t={:.2} '{}' tagged '{}'",
                    t,
                    agent_name(arena, *tagger),
                    agent_name(arena, *tagged)
                ),
                None => info!(
                    "[TAG] t={:.2} '{}' sent back with its rescuer",
                    t,
                    agent_name(arena, *tagged)
                ),
            },
            GameEvent::Imprisoned { agent } => {
                debug!("[PRISON] t={:.2} '{}' is locked up", t, agent_name(arena, *agent));
            }
            GameEvent::RescueStarted { rescuer, prisoner } => {
                info!(
                    "[RESCUE] t={:.2} '{}' is breaking out '{}'",
                    t,
                    agent_name(arena, *rescuer),
                    agent_name(arena, *prisoner)
                );
            }
            GameEvent::Freed { agent, .. } => {
                info!("[RESCUE] t={:.2} '{}' is free", t, agent_name(arena, *agent));
            }
            GameEvent::MatchEnded { outcome, score, clock } => {
                info!("[MATCH] t={:.2} {}. {}", clock, outcome, score);
            }
        }
    }
}

/// Ends the round once the arena has an outcome or the duration cap is hit.
pub(super) fn detect_round_end(
    arena: Res<ArenaWorld>,
    config: Res<ScenarioConfig>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if arena.0.is_over() {
        next_state.set(AppState::GameOver);
    } else if arena.0.clock() >= config.simulation.max_duration_seconds {
        warn!(
            "[ROUND] No result after {:.0}s, stopping the round.",
            config.simulation.max_duration_seconds
        );
        next_state.set(AppState::GameOver);
    }
}

// =========================================================================
// == Paused ==
// =========================================================================

pub(super) fn freeze_match_time(mut time: ResMut<Time<Virtual>>) {
    // Fixed ticks are driven by virtual time; none accumulate while paused.
    time.pause();
}

pub(super) fn tick_pause_timer(
    real_time: Res<Time<Real>>,
    timer: Option<ResMut<PauseTimer>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(mut timer) = timer else {
        next_state.set(AppState::Running);
        return;
    };
    timer.0.tick(real_time.delta());
    if timer.0.finished() {
        next_state.set(AppState::Running);
    }
}

pub(super) fn resume_match_time(mut commands: Commands, mut time: ResMut<Time<Virtual>>) {
    time.unpause();
    commands.remove_resource::<PauseTimer>();
    info!("[PAUSE] Resuming.");
}

// =========================================================================
// == Game Over ==
// =========================================================================

/// Records the finished round, then either restarts the arena for the next
/// one or writes the report and exits.
#[allow(clippy::too_many_arguments)]
pub(super) fn finish_round(
    mut arena: ResMut<ArenaWorld>,
    config: Res<ScenarioConfig>,
    mut stats: ResMut<RoundStats>,
    mut log: ResMut<MatchLog>,
    mut script: ResMut<PlayerScript>,
    mut input: ResMut<PlayerInputBuffer>,
    mut next_state: ResMut<NextState<AppState>>,
    mut exit: EventWriter<AppExit>,
) {
    let outcome = arena.0.outcome();
    let score = arena.0.score();
    let round = RoundReport {
        round: log.rounds.len() as u32 + 1,
        result: describe_outcome(outcome),
        winner: outcome.and_then(|o| o.winning_team()),
        reason: reason_of(outcome),
        red_score: score.red,
        blue_score: score.blue,
        duration_seconds: arena.0.clock(),
        stats: *stats,
    };
    info!(
        "[GAME OVER] Round {}: {} ({}) after {:.1}s",
        round.round, round.result, score, round.duration_seconds
    );
    log.rounds.push(round);
    *stats = RoundStats::default();

    let total = config.simulation.rounds;
    if (log.rounds.len() as u32) < total {
        // The "Retry" button.
        arena.0.restart();
        script.rewind();
        input.clear();
        info!("[ROUND] Starting round {} of {}", log.rounds.len() + 1, total);
        next_state.set(AppState::Running);
        return;
    }

    let report = MatchReport::new(
        config.simulation.seed,
        config.simulation.tick_rate_hz,
        log.rounds.clone(),
    );
    info!(
        "[MATCH] {} round(s): Red {} / Blue {} / draws {} / unfinished {}",
        report.rounds_played, report.red_wins, report.blue_wins, report.draws, report.unfinished
    );

    if let Some(path) = &config.report.path {
        match write_report(path, &report) {
            Ok(()) => info!("[REPORT] Wrote {:?}", path),
            Err(e) => {
                error!("[REPORT] {}", e);
                exit.write(AppExit::error());
                return;
            }
        }
    }
    exit.write(AppExit::Success);
}
