// powertrain_sim/src/simulation/config/catalog.rs

//! The `PrefabCatalog` resource: every reusable vehicle or component
//! description found on disk, keyed by its dotted path.

use bevy::prelude::*;
use figment::{
    providers::{Format, Toml},
    value::Value,
    Figment,
};
use std::{collections::HashMap, path::Path};
use walkdir::WalkDir;

use crate::cli::Cli;

/// The key is a namespace string (e.g. "vehicles.pickup") and the value is the
/// raw, parsed TOML data for that prefab.
#[derive(Resource, Default, Debug)]
pub struct PrefabCatalog(pub HashMap<String, Value>);

impl PrefabCatalog {
    /// Walks `root` and parses every `.toml` file below it. Files that fail to
    /// parse are logged and left out.
    pub fn load(root: &Path) -> Self {
        let mut catalog = PrefabCatalog::default();
        if !root.exists() {
            warn!(
                "Catalog directory not found at {:?}, no prefabs will be loaded.",
                root
            );
            return catalog;
        }

        info!("Loading prefab catalog from: {:?}", root);

        for entry in WalkDir::new(root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file() && e.path().extension().is_some_and(|ext| ext == "toml"))
        {
            let path = entry.path();
            let Some(key) = catalog_key(root, path) else {
                continue;
            };

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
        catalog
    }
}

/// "vehicles/pickup.toml" under the root becomes "vehicles.pickup".
fn catalog_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("."))
}

/// Startup system that fills the `PrefabCatalog` resource from the CLI's catalog directory.
pub fn load_catalog_from_disk(cli: Res<Cli>, mut catalog: ResMut<PrefabCatalog>) {
    *catalog = PrefabCatalog::load(&cli.catalog);
    info!("Prefab catalog holds {} item(s).", catalog.0.len());
}
