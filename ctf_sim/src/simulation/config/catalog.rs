// ctf_sim/src/simulation/config/catalog.rs

//! The `PrefabCatalog` resource and the startup system that fills it from disk.

use bevy::prelude::*;
use figment::{
    providers::{Format, Toml},
    value::Value,
    Figment,
};
use std::{collections::HashMap, path::Path};
use walkdir::WalkDir;

use crate::cli::Cli;

/// A Bevy resource that holds the entire parsed catalog of prefabs.
/// The key is a namespace string (e.g., "agents.raider") and the value is
/// the raw, parsed TOML data for that prefab.
#[derive(Resource, Default, Debug, Clone)]
pub struct PrefabCatalog(pub HashMap<String, Value>);

impl PrefabCatalog {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A startup system that walks the catalog directory named on the command
/// line and populates the `PrefabCatalog` resource.
pub fn load_catalog_from_disk(cli: Res<Cli>, mut catalog: ResMut<PrefabCatalog>) {
    *catalog = load_catalog(&cli.catalog);
}

/// Parses every `.toml` file below `catalog_path`. A file at
/// `agents/raider.toml` becomes the key `"agents.raider"`.
/// Unreadable files are logged and skipped.
pub fn load_catalog(catalog_path: &Path) -> PrefabCatalog {
    let mut catalog = PrefabCatalog::default();
    if !catalog_path.exists() {
        warn!(
            "Catalog directory not found at {:?}, no prefabs will be loaded.",
            catalog_path
        );
        return catalog;
    }

    info!("Loading prefab catalog from: {:?}", catalog_path);

    for entry in WalkDir::new(catalog_path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| !e.file_type().is_dir() && e.path().extension().is_some_and(|ext| ext == "toml"))
    {
        let path = entry.path();
        let Ok(relative) = path.strip_prefix(catalog_path) else {
            continue;
        };
        let key = relative
            .with_extension("")
            .to_string_lossy()
            .replace(std::path::MAIN_SEPARATOR, ".");

        match Figment::new().merge(Toml::file(path)).extract::<Value>() {
            Ok(data) => {
                debug!("Loaded catalog item: '{}'", key);
                catalog.0.insert(key, data);
            }
            Err(e) => {
                error!("Failed to load catalog item from {:?}: {}", path, e);
            }
        }
    }
    info!("Prefab catalog ready with {} item(s).", catalog.len());
    catalog
}
