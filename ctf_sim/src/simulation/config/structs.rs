// ctf_sim/src/simulation/config/structs.rs

use bevy::prelude::Resource;
use ctf_core::prelude::*;
use figment::value::Value;
use serde::Deserialize;
use std::path::PathBuf;

use super::ConfigError;

// =========================================================================
// == Top-Level Configuration Resource ==
// =========================================================================

/// # ScenarioConfig
/// The Bevy resource holding everything parsed from a `scenario.toml` file.
/// Agents stay as raw values until they are resolved against the prefab catalog.
#[derive(Resource, Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: Simulation,

    #[serde(default)]
    pub field: FieldConfig,

    #[serde(default)]
    pub rules: MatchRules,

    #[serde(default)]
    pub prisons: Vec<PrisonConfig>,

    #[serde(default)]
    pub flags: Vec<FlagConfig>,

    // `[[agents]]` entries, possibly `{ from = "agents.raider", ... }` references.
    #[serde(default)]
    pub agents: Vec<Value>,

    #[serde(default)]
    pub player: PlayerConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Simulation {
    /// Optional seed for the pseudo-random number generator for determinism.
    pub seed: Option<u64>,
    /// Fixed tick rate of the arena, in Hz.
    #[serde(default = "default_tick_rate")]
    pub tick_rate_hz: f64,
    /// Hard cap on a single round, in match seconds. Rounds that hit it end
    /// without an outcome.
    #[serde(default = "default_max_duration")]
    pub max_duration_seconds: f64,
    /// How many rounds to play back to back.
    #[serde(default = "default_rounds")]
    pub rounds: u32,
}

fn default_tick_rate() -> f64 {
    30.0
}

fn default_max_duration() -> f64 {
    600.0
}

fn default_rounds() -> u32 {
    1
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            seed: None,
            tick_rate_hz: default_tick_rate(),
            max_duration_seconds: default_max_duration(),
            rounds: default_rounds(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct FieldConfig {
    pub min: [f64; 2],
    pub max: [f64; 2],
    /// X coordinate of the centre line. Defaults to the middle of the field.
    pub center_x: Option<f64>,
    #[serde(default = "default_red_side")]
    pub red_side: Side,
}

fn default_red_side() -> Side {
    Side::East
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            min: [-20.0, -10.0],
            max: [20.0, 10.0],
            center_x: None,
            red_side: default_red_side(),
        }
    }
}

impl FieldConfig {
    pub fn to_field(&self) -> Result<Field, SetupError> {
        let bounds = Bounds::new(to_point(self.min), to_point(self.max))?;
        let center_x = self.center_x.unwrap_or_else(|| bounds.center().x);
        Ok(Field::new(bounds, center_x, self.red_side))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct PrisonConfig {
    /// The team whose tagged agents are held here.
    pub team: Team,
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl PrisonConfig {
    pub fn to_bounds(&self) -> Result<Bounds, SetupError> {
        Bounds::new(to_point(self.min), to_point(self.max))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct FlagConfig {
    pub name: String,
    pub team: Team,
    pub position: [f64; 2],
}

/// A fully resolved agent, after catalog references have been merged in.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    pub name: String,
    pub team: Team,
    pub position: [f64; 2],
    /// Units per second.
    pub speed: f64,
    pub brain: BrainConfig,
}

impl AgentConfig {
    pub fn to_spec(&self) -> Result<AgentSpec, ConfigError> {
        Ok(AgentSpec::new(
            self.name.clone(),
            self.team,
            to_point(self.position),
            self.speed,
            self.brain.to_brain()?,
        ))
    }
}

// =========================================================================
// == Brains ==
// =========================================================================

/// Which behaviour drives an agent. The `type` field picks the variant.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "PascalCase")] // "Raider" in TOML maps to the Raider variant
pub enum BrainConfig {
    Defender {
        /// Where to stand when nobody is invading. Holds position if absent.
        #[serde(default)]
        post: Option<[f64; 2]>,
    },
    Patroller {
        #[serde(default)]
        area: Option<AreaConfig>,
        #[serde(default = "default_decision_interval")]
        decision_interval: f64,
    },
    Sentry {
        #[serde(default)]
        area: Option<AreaConfig>,
        #[serde(default = "default_decision_interval")]
        decision_interval: f64,
        #[serde(default = "default_detection_range")]
        detection_range: f64,
    },
    Raider {
        #[serde(default = "default_avoid_radius")]
        avoid_radius: f64,
        #[serde(default = "default_rescue")]
        rescue: bool,
    },
}

fn default_decision_interval() -> f64 {
    2.0
}

fn default_detection_range() -> f64 {
    5.0
}

fn default_avoid_radius() -> f64 {
    2.0
}

fn default_rescue() -> bool {
    true
}

/// A rectangular patrol area.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AreaConfig {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl AreaConfig {
    fn to_bounds(self) -> Result<Bounds, SetupError> {
        Bounds::new(to_point(self.min), to_point(self.max))
    }
}

impl BrainConfig {
    pub fn get_type_str(&self) -> &str {
        match self {
            BrainConfig::Defender { .. } => "Defender",
            BrainConfig::Patroller { .. } => "Patroller",
            BrainConfig::Sentry { .. } => "Sentry",
            BrainConfig::Raider { .. } => "Raider",
        }
    }

    /// Builds the pure brain this config describes.
    pub fn to_brain(&self) -> Result<Box<dyn Brain>, ConfigError> {
        let brain: Box<dyn Brain> = match self {
            BrainConfig::Defender { post } => match post {
                Some(p) => Box::new(Defender::with_post(to_point(*p))),
                None => Box::new(Defender::default()),
            },
            BrainConfig::Patroller {
                area,
                decision_interval,
            } => Box::new(patroller(*area, *decision_interval)?),
            BrainConfig::Sentry {
                area,
                decision_interval,
                detection_range,
            } => {
                if *detection_range <= 0.0 {
                    return Err(ConfigError::InvalidValue {
                        field: "detection_range",
                        value: *detection_range,
                    });
                }
                Box::new(Sentry {
                    patrol: patroller(*area, *decision_interval)?,
                    detection_range: *detection_range,
                })
            }
            BrainConfig::Raider {
                avoid_radius,
                rescue,
            } => Box::new(Raider {
                avoid_radius: *avoid_radius,
                rescue: *rescue,
            }),
        };
        Ok(brain)
    }
}

fn patroller(area: Option<AreaConfig>, decision_interval: f64) -> Result<Patroller, ConfigError> {
    if decision_interval < 0.0 {
        return Err(ConfigError::InvalidValue {
            field: "decision_interval",
            value: decision_interval,
        });
    }
    let area = area.map(AreaConfig::to_bounds).transpose()?;
    Ok(Patroller::new(area, decision_interval))
}

// =========================================================================
// == Player Script & Report ==
// =========================================================================

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct PlayerConfig {
    /// Agent names the player can take over, in slot order.
    #[serde(default)]
    pub roster: Vec<String>,
    /// Take over roster slot 0 as soon as each round starts.
    #[serde(default)]
    pub auto_select: bool,
    /// Inputs replayed at fixed match times, standing in for the keyboard.
    #[serde(default)]
    pub commands: Vec<PlayerCommand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "action")]
#[serde(rename_all = "snake_case")]
pub enum PlayerCommand {
    /// Take over roster slot `slot` (the number keys).
    Select { at: f64, slot: usize },
    /// Hand the current agent back to its brain.
    Deselect { at: f64 },
    /// Hold the movement axis from now on. `[0, 0]` stops.
    Move { at: f64, axis: [f64; 2] },
    /// Freeze the match for `seconds` of app time, then resume.
    Pause { at: f64, seconds: f64 },
}

impl PlayerCommand {
    /// Match time at which the command fires.
    pub fn at(&self) -> f64 {
        match self {
            PlayerCommand::Select { at, .. }
            | PlayerCommand::Deselect { at }
            | PlayerCommand::Move { at, .. }
            | PlayerCommand::Pause { at, .. } => *at,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Where to write the TOML match report. No report if unset.
    pub path: Option<PathBuf>,
}

pub fn to_point(xy: [f64; 2]) -> Point2 {
    Point2::new(xy[0], xy[1])
}
