// powertrain_sim/src/simulation/config/resolver.rs

use super::catalog::PrefabCatalog;
use super::ScenarioError;
use figment::value::{Dict, Tag, Value};

/// Resolves every `from = "..."` reference inside a raw vehicle entry.
///
/// A table with a `from` key starts as a copy of the named prefab; its sibling
/// keys are then deep-merged on top. Prefabs may themselves use `from`.
pub fn resolve_vehicle_value(
    vehicle_value: &Value,
    catalog: &PrefabCatalog,
) -> Result<Value, ScenarioError> {
    resolve_value_recursively(vehicle_value, catalog, &mut Vec::new())
}

/// Merges `override_dict` into `base`, recursing through nested tables.
fn deep_merge(base: &mut Dict, override_dict: &Dict) {
    for (key, override_val) in override_dict {
        // A nested table with its own `from` replaces the base entry outright.
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
    chain: &mut Vec<String>,
) -> Result<Value, ScenarioError> {
    // --- STEP 1: Resolve the current node if it's a 'from' reference. ---
    let current_node = match value.as_dict() {
        Some(dict) => match dict.get("from") {
            Some(from) => {
                let from_key = from
                    .as_str()
                    .ok_or_else(|| ScenarioError::Malformed("'from' must be a string".into()))?;
                if chain.iter().any(|k| k == from_key) {
                    return Err(ScenarioError::PrefabCycle(from_key.to_string()));
                }
                let base_prefab_data = catalog
                    .0
                    .get(from_key)
                    .ok_or_else(|| ScenarioError::UnknownPrefab(from_key.to_string()))?;

                chain.push(from_key.to_string());
                let resolved_base = resolve_value_recursively(base_prefab_data, catalog, chain)?;
                chain.pop();

                let mut final_dict = resolved_base
                    .into_dict()
                    .ok_or_else(|| ScenarioError::PrefabNotATable(from_key.to_string()))?;
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
                new_dict.insert(key.clone(), resolve_value_recursively(val, catalog, chain)?);
            }
            Ok(Value::Dict(tag.clone(), new_dict))
        }
        Value::Array(tag, arr) => {
            let resolved_arr = arr
                .iter()
                .map(|item| resolve_value_recursively(item, catalog, chain))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(tag.clone(), resolved_arr))
        }
        _ => Ok(current_node),
    }
}
