// ctf_sim/src/simulation/plugins/player.rs

//! Replays the scenario's `[player]` commands as if someone were at the
//! keyboard: number keys pick a roster slot, the arrow keys steer, `P` pauses.

use crate::prelude::*;
use crate::simulation::core::components::ArenaWorld;
use crate::simulation::plugins::match_flow::PauseTimer;

pub struct PlayerScriptPlugin;

impl Plugin for PlayerScriptPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerInputBuffer>()
            .add_systems(
                OnEnter(AppState::SceneBuilding),
                load_player_script.in_set(SceneBuildSet::Resources),
            )
            .add_systems(
                FixedUpdate,
                run_player_script.in_set(SimulationSet::Input),
            );
    }
}

// --- Resources ---

/// The scripted commands, in firing order.
#[derive(Resource, Debug, Default, Clone)]
pub struct PlayerScript {
    commands: Vec<PlayerCommand>,
    next: usize,
}

impl PlayerScript {
    pub fn new(mut commands: Vec<PlayerCommand>) -> Self {
        // Stable, so commands sharing a time keep their file order.
        commands.sort_by(|a, b| a.at().total_cmp(&b.at()));
        Self { commands, next: 0 }
    }

    /// The scenario's script, opening with a slot 0 press when
    /// `auto_select` is on.
    pub fn from_config(config: &PlayerConfig) -> Self {
        let mut commands = Vec::with_capacity(config.commands.len() + 1);
        if config.auto_select {
            commands.push(PlayerCommand::Select { at: 0.0, slot: 0 });
        }
        commands.extend_from_slice(&config.commands);
        Self::new(commands)
    }

    /// Pops every command due at match time `clock`.
    pub fn due(&mut self, clock: f64) -> Vec<PlayerCommand> {
        let start = self.next;
        while self.next < self.commands.len() && self.commands[self.next].at() <= clock {
            self.next += 1;
        }
        self.commands[start..self.next].to_vec()
    }

    /// Starts the script over for a new round.
    pub fn rewind(&mut self) {
        self.next = 0;
    }

    pub fn remaining(&self) -> usize {
        self.commands.len() - self.next
    }
}

/// What the "keyboard" says this tick. Slot and release presses are
/// consumed by one step; the movement axis is held until changed.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct PlayerInputBuffer {
    select: Option<usize>,
    deselect: bool,
    axis: Vec2,
}

impl PlayerInputBuffer {
    pub fn press_slot(&mut self, slot: usize) {
        self.select = Some(slot);
    }

    pub fn press_release(&mut self) {
        self.deselect = true;
    }

    pub fn hold_axis(&mut self, axis: Vec2) {
        self.axis = axis;
    }

    /// Hands this tick's input to the arena.
    pub fn take(&mut self) -> PlayerInput {
        PlayerInput {
            select: self.select.take(),
            deselect: std::mem::take(&mut self.deselect),
            axis: self.axis,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// --- Systems ---

fn load_player_script(mut commands: Commands, config: Res<ScenarioConfig>) {
    let script = PlayerScript::from_config(&config.player);
    debug!("[PLAYER] {} scripted command(s).", script.remaining());
    commands.insert_resource(script);
}

fn run_player_script(
    mut commands: Commands,
    arena: Res<ArenaWorld>,
    mut script: ResMut<PlayerScript>,
    mut buffer: ResMut<PlayerInputBuffer>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let clock = arena.0.clock();
    for command in script.due(clock) {
        match command {
            PlayerCommand::Select { slot, .. } => {
                debug!("[PLAYER] t={:.2} select slot {}", clock, slot);
                buffer.press_slot(slot);
            }
            PlayerCommand::Deselect { .. } => {
                debug!("[PLAYER] t={:.2} release", clock);
                buffer.press_release();
            }
            PlayerCommand::Move { axis, .. } => {
                buffer.hold_axis(Vec2::new(axis[0], axis[1]));
            }
            PlayerCommand::Pause { seconds, .. } => match PauseTimer::new(seconds) {
                Ok(timer) => {
                    info!("[PAUSE] t={:.2} pausing for {:.1}s", clock, seconds);
                    commands.insert_resource(timer);
                    next_state.set(AppState::Paused);
                }
                Err(e) => warn!("[PLAYER] Ignoring pause: {}", e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_fire_in_time_order() {
        let mut script = PlayerScript::new(vec![
            PlayerCommand::Deselect { at: 2.0 },
            PlayerCommand::Select { at: 0.5, slot: 1 },
            PlayerCommand::Move {
                at: 0.5,
                axis: [1.0, 0.0],
            },
        ]);

        assert!(script.due(0.0).is_empty());
        let first = script.due(0.5);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0], PlayerCommand::Select { at: 0.5, slot: 1 });
        assert!(script.due(1.0).is_empty());
        assert_eq!(script.due(5.0), vec![PlayerCommand::Deselect { at: 2.0 }]);
        assert_eq!(script.remaining(), 0);

        script.rewind();
        assert_eq!(script.remaining(), 3);
    }

    #[test]
    fn auto_select_takes_slot_zero_every_round() {
        let config = PlayerConfig {
            roster: vec!["red_guard".into()],
            auto_select: true,
            commands: vec![PlayerCommand::Select { at: 0.0, slot: 1 }],
        };
        let mut script = PlayerScript::from_config(&config);
        let opening = script.due(0.0);
        assert_eq!(
            opening,
            vec![
                PlayerCommand::Select { at: 0.0, slot: 0 },
                PlayerCommand::Select { at: 0.0, slot: 1 },
            ]
        );

        script.rewind();
        assert_eq!(script.due(0.0)[0], PlayerCommand::Select { at: 0.0, slot: 0 });

        let manual = PlayerScript::from_config(&PlayerConfig::default());
        assert_eq!(manual.remaining(), 0);
    }

    #[test]
    fn presses_are_one_shot_but_the_axis_is_held() {
        let mut buffer = PlayerInputBuffer::default();
        buffer.press_slot(2);
        buffer.hold_axis(Vec2::new(0.0, -1.0));

        let first = buffer.take();
        assert_eq!(first.select, Some(2));
        assert_eq!(first.axis, Vec2::new(0.0, -1.0));

        let second = buffer.take();
        assert_eq!(second.select, None);
        assert!(!second.deselect);
        assert_eq!(second.axis, Vec2::new(0.0, -1.0));

        buffer.clear();
        assert_eq!(buffer.take(), PlayerInput::idle());
    }
}
