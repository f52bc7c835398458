// ctf_sim/src/simulation/config/mod.rs

//! This module handles loading, resolving, and validating all simulation
//! configuration from disk, including the prefab catalog system.

mod catalog;
mod resolver;

pub mod structs;

use bevy::prelude::*;
use ctf_core::SetupError;
use figment::{
    providers::{Format, Toml},
    Figment,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::cli::Cli;
use crate::prelude::AppState;
pub use catalog::{load_catalog, PrefabCatalog};
pub use resolver::resolve_agent_value;
pub use structs::{AgentConfig, BrainConfig, PlayerCommand, ScenarioConfig};

/// Everything that can go wrong between the command line and a built arena.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("scenario file not found at {0:?}")]
    MissingFile(PathBuf),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] figment::Error),

    #[error("prefab '{0}' not found in catalog")]
    UnknownPrefab(String),

    #[error("prefab '{0}' must resolve to a table to be merged")]
    PrefabNotTable(String),

    #[error("prefab chain starting at '{0}' is too deep (cycle?)")]
    PrefabCycle(String),

    #[error("invalid value for '{field}': {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("invalid arena: {0}")]
    Setup(#[from] SetupError),

    #[error("failed to serialize the match report: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app
            // A resource to hold the final, resolved agent configurations.
            .init_resource::<ResolvedAgents>()
            // The resource for the raw, unresolved catalog data.
            .init_resource::<PrefabCatalog>()
            // The resource for the top-level scenario config.
            .init_resource::<ScenarioConfig>()
            .add_systems(
                OnEnter(AppState::Loading),
                (catalog::load_catalog_from_disk, load_and_resolve_scenario).chain(),
            );
    }
}

#[derive(Resource, Default, Debug, Clone)]
pub struct ResolvedAgents(pub Vec<AgentConfig>);

/// Reads and parses a scenario file. Agents are left unresolved.
pub fn load_scenario_file(path: &Path) -> Result<ScenarioConfig, ConfigError> {
    // Figment treats a missing file as an empty source; we want a hard error.
    if !path.is_file() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }
    let config = Figment::new().merge(Toml::file(path)).extract()?;
    Ok(config)
}

/// Command-line values win over the scenario file.
pub fn apply_cli_overrides(config: &mut ScenarioConfig, cli: &Cli) {
    if let Some(seed) = cli.seed {
        config.simulation.seed = Some(seed);
    }
    if let Some(rounds) = cli.rounds {
        config.simulation.rounds = rounds;
    }
    if let Some(report) = &cli.report {
        config.report.path = Some(report.clone());
    }
}

/// Turns a configured number of seconds into a `Duration`, rejecting
/// values that are not positive, not finite, or too large to represent.
pub fn positive_duration(field: &'static str, seconds: f64) -> Result<Duration, ConfigError> {
    let invalid = ConfigError::InvalidValue {
        field,
        value: seconds,
    };
    if seconds <= 0.0 || !seconds.is_finite() {
        return Err(invalid);
    }
    match Duration::try_from_secs_f64(seconds) {
        Ok(duration) if !duration.is_zero() => Ok(duration),
        _ => Err(invalid),
    }
}

/// Resolves every `[[agents]]` entry against the catalog.
/// Entries that fail are logged and skipped.
pub fn resolve_agents(config: &ScenarioConfig, catalog: &PrefabCatalog) -> Vec<AgentConfig> {
    let mut resolved = Vec::with_capacity(config.agents.len());
    for agent_value in &config.agents {
        let agent_config = resolve_agent_value(agent_value, catalog)
            .and_then(|value| value.deserialize::<AgentConfig>().map_err(ConfigError::from));
        match agent_config {
            Ok(agent_config) => {
                debug!(
                    "Resolved agent '{}' ({} {})",
                    agent_config.name,
                    agent_config.team,
                    agent_config.brain.get_type_str()
                );
                resolved.push(agent_config);
            }
            Err(e) => {
                error!("Failed to resolve agent config: {}. Skipping agent.", e);
            }
        }
    }
    resolved
}

fn load_and_resolve_scenario(
    cli: Res<Cli>,
    catalog: Res<PrefabCatalog>,
    mut scenario_config: ResMut<ScenarioConfig>,
    mut resolved_agents: ResMut<ResolvedAgents>,
    mut next_state: ResMut<NextState<AppState>>,
    mut exit: EventWriter<AppExit>,
) {
    info!("Loading scenario from: {:?}", cli.scenario);

    let mut loaded = match load_scenario_file(&cli.scenario) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            exit.write(AppExit::error());
            return;
        }
    };
    apply_cli_overrides(&mut loaded, &cli);

    resolved_agents.0 = resolve_agents(&loaded, &catalog);
    info!(
        "Resolved {} of {} agent(s).",
        resolved_agents.0.len(),
        loaded.agents.len()
    );
    *scenario_config = loaded;

    info!("Configuration loading and resolution complete. Transitioning to SceneBuilding state.");
    next_state.set(AppState::SceneBuilding);
}
