// ctf_sim/src/simulation/plugins/arena.rs

use crate::prelude::*;
use crate::simulation::core::mirror_sync_system;
use crate::simulation::plugins::player::PlayerInputBuffer;

/// Drives the pure arena from `FixedUpdate` and mirrors it onto entities.
pub struct ArenaPlugin;

impl Plugin for ArenaPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                step_arena_system.in_set(SimulationSet::Step),
                mirror_sync_system.in_set(SimulationSet::StateSync),
            ),
        );
    }
}

/// The single writer of arena state: one fixed step per call.
fn step_arena_system(
    time: Res<Time>,
    config: Res<ScenarioConfig>,
    mut arena: ResMut<ArenaWorld>,
    mut rng: ResMut<SimulationRng>,
    mut input: ResMut<PlayerInputBuffer>,
    mut game_events: EventWriter<BevyGameEvent>,
) {
    // Inside FixedUpdate, `Time` is the fixed clock.
    let dt = time.delta_secs_f64();
    if dt <= 0.0 || arena.0.is_over() {
        return;
    }
    // Extra fixed steps in the same frame must not run past the round cap.
    if arena.0.clock() >= config.simulation.max_duration_seconds {
        return;
    }

    let tick_input = input.take();
    let events = arena.0.step(dt, &tick_input, &mut rng.0);
    for event in events {
        game_events.write(BevyGameEvent(event));
    }
}
