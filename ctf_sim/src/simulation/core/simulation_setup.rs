// ctf_sim/src/simulation/core/simulation_setup.rs

use std::time::Duration;

use bevy::time::TimeUpdateStrategy;

use crate::cli::Cli;
use crate::prelude::*;
use crate::simulation::config::structs::to_point;
use crate::simulation::config::{positive_duration, ConfigError, ResolvedAgents};
use crate::simulation::core::components::{AgentStatus, ArenaWorld, BrainLabel, FlagState};
use crate::simulation::core::events::BevyGameEvent;
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::core::transforms::arena_transform;

pub struct SimulationSetupPlugin;

impl Plugin for SimulationSetupPlugin {
    fn build(&self, app: &mut App) {
        // Registers the pure GameEvent wrapper with Bevy's event system.
        app.add_event::<BevyGameEvent>();

        // --- CONFIGURE THE SCENE BUILDING PIPELINE ---
        // This chain of SystemSets guarantees the correct build order.
        app.configure_sets(
            OnEnter(AppState::SceneBuilding),
            (
                SceneBuildSet::BuildArena,
                SceneBuildSet::Resources,
                SceneBuildSet::Spawn,
                SceneBuildSet::Finalize,
            )
                .chain(),
        );

        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            (
                build_arena_system.in_set(SceneBuildSet::BuildArena),
                setup_simulation_resources.in_set(SceneBuildSet::Resources),
                spawn_arena_entities.in_set(SceneBuildSet::Spawn),
                transition_to_running.in_set(SceneBuildSet::Finalize),
            ),
        );

        // Configure the runtime schedule graph. Nothing ticks unless Running.
        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Input,
                SimulationSet::Step,
                SimulationSet::Events,
                SimulationSet::StateSync,
            )
                .chain()
                .run_if(in_state(AppState::Running)),
        );
    }
}

/// The length of one fixed step at `hz` ticks per second.
pub fn tick_duration(hz: f64) -> Result<Duration, ConfigError> {
    let invalid = ConfigError::InvalidValue {
        field: "tick_rate_hz",
        value: hz,
    };
    if hz <= 0.0 || !hz.is_finite() {
        return Err(invalid);
    }
    positive_duration("tick_rate_hz", 1.0 / hz).map_err(|_| invalid)
}

/// Validates the resolved configuration and builds the pure arena from it.
pub fn build_arena(config: &ScenarioConfig, agents: &[AgentConfig]) -> Result<Arena, ConfigError> {
    let sim = &config.simulation;
    tick_duration(sim.tick_rate_hz)?;
    if sim.max_duration_seconds <= 0.0 || !sim.max_duration_seconds.is_finite() {
        return Err(ConfigError::InvalidValue {
            field: "max_duration_seconds",
            value: sim.max_duration_seconds,
        });
    }
    if sim.rounds == 0 {
        return Err(ConfigError::InvalidValue {
            field: "rounds",
            value: 0.0,
        });
    }
    for command in &config.player.commands {
        if let PlayerCommand::Pause { seconds, .. } = command {
            positive_duration("pause.seconds", *seconds)?;
        }
    }

    let mut builder = ArenaBuilder::new(config.field.to_field()?).rules(config.rules);
    for prison in &config.prisons {
        builder = builder.prison(prison.team, prison.to_bounds()?);
    }
    for flag in &config.flags {
        builder = builder.flag(flag.name.clone(), flag.team, to_point(flag.position));
    }
    for agent in agents {
        builder = builder.agent(agent.to_spec()?);
    }
    let arena = builder.roster(config.player.roster.clone()).build()?;
    Ok(arena)
}

fn build_arena_system(
    mut commands: Commands,
    config: Res<ScenarioConfig>,
    resolved_agents: Res<ResolvedAgents>,
    mut exit: EventWriter<AppExit>,
) {
    match build_arena(&config, &resolved_agents.0) {
        Ok(arena) => {
            info!(
                "[SETUP] Arena built: {} agents, {} flags, first to {} captures.",
                arena.agents().len(),
                arena.flags().len(),
                arena.rules().flags_to_win
            );
            commands.insert_resource(ArenaWorld(arena));
        }
        Err(e) => {
            error!("[SETUP] {}", e);
            exit.write(AppExit::error());
        }
    }
}

fn setup_simulation_resources(
    mut commands: Commands,
    config: Res<ScenarioConfig>,
    cli: Res<Cli>,
    arena: Option<Res<ArenaWorld>>,
) {
    if arena.is_none() {
        return;
    }

    // --- 1. Add the Deterministic PRNG Resource ---
    match config.simulation.seed {
        Some(seed) => info!("[SETUP] Seeding simulation RNG with {}", seed),
        None => info!("[SETUP] No seed given, using OS entropy."),
    }
    commands.insert_resource(SimulationRng::from_seed_option(config.simulation.seed));

    // --- 2. Fixed tick ---
    let hz = config.simulation.tick_rate_hz;
    let step = match tick_duration(hz) {
        Ok(step) => step,
        Err(e) => {
            error!("[SETUP] {}", e);
            return;
        }
    };
    commands.insert_resource(Time::<Fixed>::from_duration(step));
    if !cli.realtime {
        // Every app update advances exactly one tick, as fast as the CPU allows.
        commands.insert_resource(TimeUpdateStrategy::ManualDuration(step));
    }
    info!(
        "[SETUP] Ticking at {} Hz ({}).",
        hz,
        if cli.realtime { "realtime" } else { "fast-forward" }
    );
}

fn spawn_arena_entities(mut commands: Commands, arena: Option<Res<ArenaWorld>>) {
    let Some(arena) = arena else {
        return;
    };

    for agent in arena.0.agents() {
        info!(
            "[SPAWN] Agent '{}' ({}, {}) at ({:.1}, {:.1})",
            agent.name,
            agent.team,
            agent.brain.label(),
            agent.position.x,
            agent.position.y
        );
        commands.spawn((
            Name::new(agent.name.clone()),
            agent.handle,
            agent.team,
            AgentStatus::from(agent),
            BrainLabel(agent.brain.label()),
            arena_transform(&agent.position),
        ));
    }

    for flag in arena.0.flags() {
        debug!("[SPAWN] Flag '{}' of {}", flag.name, flag.team);
        commands.spawn((
            Name::new(flag.name.clone()),
            flag.handle,
            flag.team,
            FlagState::from(flag),
            arena_transform(&flag.position),
        ));
    }
}

/// Runs once at the end of the `OnEnter(SceneBuilding)` chain.
fn transition_to_running(
    arena: Option<Res<ArenaWorld>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if arena.is_some() {
        info!("Scene building complete. Transitioning to Running state.");
        next_state.set(AppState::Running);
    }
}
