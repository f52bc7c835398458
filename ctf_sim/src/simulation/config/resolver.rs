// ctf_sim/src/simulation/config/resolver.rs

//! Resolves `{ from = "agents.raider", ... }` references against the catalog.
//! Keys next to `from` override the prefab's, tables are merged recursively.

use super::catalog::PrefabCatalog;
use super::ConfigError;
use figment::value::{Dict, Tag, Value};

/// Prefabs may reference each other; deeper chains are treated as a cycle.
const MAX_DEPTH: usize = 16;

pub fn resolve_agent_value(agent_value: &Value, catalog: &PrefabCatalog) -> Result<Value, ConfigError> {
    resolve_value_recursively(agent_value, catalog, 0)
}

/// Recursive deep merge: the contents of `override_dict` win over `base`.
fn deep_merge(base: &mut Dict, override_dict: &Dict) {
    for (key, override_val) in override_dict {
        if key == "from" {
            continue;
        }

        // A nested table with its own `from` is a full replacement, not a merge.
        if let Some(d) = override_val.as_dict() {
            if d.contains_key("from") {
                base.insert(key.clone(), override_val.clone());
                continue;
            }
        }

        if let Some(base_val) = base.get_mut(key) {
            if let (Some(base_sub_dict), Some(override_sub_dict)) =
                (base_val.as_dict(), override_val.as_dict())
            {
                let mut new_sub_dict = base_sub_dict.clone();
                deep_merge(&mut new_sub_dict, override_sub_dict);
                *base_val = Value::Dict(Tag::Default, new_sub_dict);
                continue;
            }
        }
        base.insert(key.clone(), override_val.clone());
    }
}

fn resolve_value_recursively(
    value: &Value,
    catalog: &PrefabCatalog,
    depth: usize,
) -> Result<Value, ConfigError> {
    if depth > MAX_DEPTH {
        return Err(ConfigError::PrefabCycle(describe(value)));
    }

    // --- STEP 1: Resolve the current node if it's a 'from' reference. ---
    let current_node = match value.as_dict() {
        Some(dict) => match dict.get("from").and_then(|v| v.as_str()) {
            Some(from_key) => {
                let base_prefab_data = catalog
                    .get(from_key)
                    .ok_or_else(|| ConfigError::UnknownPrefab(from_key.to_string()))?;

                // Fully resolve the base first so chained prefabs compose.
                let resolved_base = resolve_value_recursively(base_prefab_data, catalog, depth + 1)?;
                let mut final_dict = resolved_base
                    .into_dict()
                    .ok_or_else(|| ConfigError::PrefabNotTable(from_key.to_string()))?;

                deep_merge(&mut final_dict, dict);
                Value::Dict(Tag::Default, final_dict)
            }
            None => value.clone(),
        },
        None => value.clone(),
    };

    // --- STEP 2: Resolve the children of the result. ---
    match &current_node {
        Value::Dict(tag, dict) => {
            let mut new_dict = Dict::new();
            for (key, val) in dict.iter() {
                if key == "from" {
                    continue;
                }
                new_dict.insert(key.clone(), resolve_value_recursively(val, catalog, depth + 1)?);
            }
            Ok(Value::Dict(tag.clone(), new_dict))
        }
        Value::Array(tag, arr) => {
            let mut resolved_arr = Vec::with_capacity(arr.len());
            for item in arr {
                resolved_arr.push(resolve_value_recursively(item, catalog, depth + 1)?);
            }
            Ok(Value::Array(tag.clone(), resolved_arr))
        }
        _ => Ok(current_node),
    }
}

fn describe(value: &Value) -> String {
    value
        .as_dict()
        .and_then(|d| d.get("from"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| "<inline>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::structs::{AgentConfig, BrainConfig};
    use figment::{
        providers::{Format, Toml},
        Figment,
    };

    fn parse(toml: &str) -> Value {
        Figment::new().merge(Toml::string(toml)).extract::<Value>().unwrap()
    }

    fn catalog() -> PrefabCatalog {
        let mut catalog = PrefabCatalog::default();
        catalog.0.insert(
            "agents.raider".into(),
            parse(
                r#"
                speed = 4.0
                [brain]
                type = "Raider"
                avoid_radius = 2.0
                "#,
            ),
        );
        catalog.0.insert(
            "agents.fast_raider".into(),
            parse(
                r#"
                from = "agents.raider"
                speed = 6.0
                "#,
            ),
        );
        catalog.0.insert(
            "brains.sentry".into(),
            parse(
                r#"
                type = "Sentry"
                detection_range = 6.0
                "#,
            ),
        );
        catalog
    }

    #[test]
    fn overrides_merge_into_nested_tables() {
        let agent = parse(
            r#"
            from = "agents.raider"
            name = "red_raider"
            team = "Red"
            position = [3.0, 1.0]
            [brain]
            rescue = false
            "#,
        );
        let resolved = resolve_agent_value(&agent, &catalog()).unwrap();
        let config: AgentConfig = resolved.deserialize().unwrap();

        assert_eq!(config.name, "red_raider");
        assert_eq!(config.speed, 4.0);
        match config.brain {
            BrainConfig::Raider {
                avoid_radius,
                rescue,
            } => {
                assert_eq!(avoid_radius, 2.0);
                assert!(!rescue);
            }
            other => panic!("expected a raider, got {}", other.get_type_str()),
        }
    }

    #[test]
    fn chained_prefabs_compose() {
        let agent = parse(
            r#"
            from = "agents.fast_raider"
            name = "blue_raider"
            team = "Blue"
            position = [-3.0, 0.0]
            "#,
        );
        let resolved = resolve_agent_value(&agent, &catalog()).unwrap();
        let config: AgentConfig = resolved.deserialize().unwrap();
        assert_eq!(config.speed, 6.0);
        assert_eq!(config.brain.get_type_str(), "Raider");
    }

    #[test]
    fn nested_from_replaces_the_table() {
        let agent = parse(
            r#"
            from = "agents.raider"
            name = "turncoat"
            team = "Red"
            position = [1.0, 0.0]
            brain = { from = "brains.sentry" }
            "#,
        );
        let resolved = resolve_agent_value(&agent, &catalog()).unwrap();
        // The sentry prefab replaced the raider's brain wholesale.
        let config: AgentConfig = resolved.deserialize().unwrap();
        match config.brain {
            BrainConfig::Sentry {
                detection_range, ..
            } => assert_eq!(detection_range, 6.0),
            other => panic!("expected a sentry, got {}", other.get_type_str()),
        }
    }

    #[test]
    fn unknown_prefab_is_an_error() {
        let agent = parse(r#"from = "agents.ghost""#);
        let err = resolve_agent_value(&agent, &catalog()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPrefab(key) if key == "agents.ghost"));
    }

    #[test]
    fn self_reference_is_caught() {
        let mut catalog = catalog();
        catalog
            .0
            .insert("agents.loop".into(), parse(r#"from = "agents.loop""#));
        let err = resolve_agent_value(&parse(r#"from = "agents.loop""#), &catalog).unwrap_err();
        assert!(matches!(err, ConfigError::PrefabCycle(_)));
    }
}
