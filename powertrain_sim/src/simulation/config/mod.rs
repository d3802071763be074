// powertrain_sim/src/simulation/config/mod.rs

//! This module handles loading, resolving, and validating all simulation
//! configuration from disk, including the prefab catalog system.

mod catalog;
mod resolver;

pub mod structs;

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use figment::{
    providers::{Format, Toml},
    value::Value,
    Figment,
};
use powertrain_core::error::ConfigError;
use powertrain_core::types::VehiclePose;
use powertrain_core::vehicle::VehicleSim;
use thiserror::Error;

use crate::cli::Cli;
use crate::prelude::AppState;
use catalog::load_catalog_from_disk;
pub use catalog::PrefabCatalog;
pub use resolver::resolve_vehicle_value;
pub use structs::{Control, Pose, ScenarioConfig, ScriptStep, SimulationSection, VehicleConfig};

/// Everything that can go wrong between a scenario file on disk and an
/// assembled vehicle.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario file not found: {0:?}")]
    MissingFile(PathBuf),

    #[error("failed to load scenario: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("prefab '{0}' not found in catalog")]
    UnknownPrefab(String),

    #[error("prefab '{0}' must resolve to a table to be merged")]
    PrefabNotATable(String),

    #[error("prefab '{0}' refers back to itself")]
    PrefabCycle(String),

    #[error("malformed vehicle entry: {0}")]
    Malformed(String),

    #[error("vehicle '{name}' is invalid: {source}")]
    InvalidVehicle {
        name: String,
        #[source]
        source: ConfigError,
    },

    #[error("tick rate must be positive and finite (got {0} Hz)")]
    InvalidTickRate(f64),

    #[error("scenario has no usable vehicles")]
    NoVehicles,
}

impl From<figment::Error> for ScenarioError {
    fn from(e: figment::Error) -> Self {
        ScenarioError::Load(Box::new(e))
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app
            // A resource to hold the final, resolved vehicle configurations.
            .init_resource::<ResolvedVehicles>()
            // The resource for the raw, unresolved catalog data.
            .init_resource::<PrefabCatalog>()
            // The resource for the top-level scenario config.
            .init_resource::<ScenarioConfig>()
            .add_systems(
                OnEnter(AppState::AssetLoading),
                (
                    load_catalog_from_disk,
                    load_and_resolve_scenario,
                    transition_to_scene_building,
                )
                    .chain(),
            );
    }
}

#[derive(Resource, Default, Debug)]
pub struct ResolvedVehicles(pub Vec<VehicleConfig>);

// =========================================================================
// == Pure Loading Functions ==
// =========================================================================

/// Reads and parses a scenario file. Vehicle entries are left unresolved.
pub fn load_scenario_file(path: &Path) -> Result<ScenarioConfig, ScenarioError> {
    // figment treats a missing file as empty, which would silently load defaults.
    if !path.is_file() {
        return Err(ScenarioError::MissingFile(path.to_path_buf()));
    }
    let scenario: ScenarioConfig = Figment::new().merge(Toml::file(path)).extract()?;
    let tick_rate_hz = scenario.simulation.tick_rate_hz;
    if !(tick_rate_hz > 0.0 && tick_rate_hz.is_finite()) {
        return Err(ScenarioError::InvalidTickRate(tick_rate_hz));
    }
    Ok(scenario)
}

/// Resolves one raw `[[vehicles]]` entry against the catalog and checks that
/// it assembles into a working vehicle.
pub fn resolve_vehicle(
    vehicle_value: &Value,
    catalog: &PrefabCatalog,
) -> Result<VehicleConfig, ScenarioError> {
    let resolved_value = resolver::resolve_vehicle_value(vehicle_value, catalog)?;
    let config: VehicleConfig = Value::deserialize(&resolved_value)?;

    let pose = VehiclePose::from_isometry(&config.starting_pose.to_isometry());
    VehicleSim::assemble(&config.vehicle, &pose).map_err(|source| {
        ScenarioError::InvalidVehicle {
            name: config.name.clone(),
            source,
        }
    })?;
    Ok(config)
}

// =========================================================================
// == Systems ==
// =========================================================================

fn load_and_resolve_scenario(
    mut commands: Commands,
    cli: Res<Cli>,
    catalog: Res<PrefabCatalog>,
    mut scenario_config: ResMut<ScenarioConfig>,
    mut resolved_vehicles: ResMut<ResolvedVehicles>,
) {
    info!("Loading scenario from: {:?}", cli.scenario);

    let loaded_config = match load_scenario_file(&cli.scenario) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to load scenario file at {:?}: {}", cli.scenario, e);
            return;
        }
    };

    // Each vehicle is resolved on its own; a bad one is skipped, not fatal.
    for vehicle_value in &loaded_config.vehicles {
        match resolve_vehicle(vehicle_value, &catalog) {
            Ok(vehicle_config) => {
                info!(
                    "Successfully resolved and validated vehicle: '{}'",
                    &vehicle_config.name
                );
                resolved_vehicles.0.push(vehicle_config);
            }
            Err(e) => {
                error!("Failed to resolve vehicle config: {}. Skipping vehicle.", e);
            }
        }
    }

    scenario_config.simulation = loaded_config.simulation;
    if let Some(duration) = cli.duration {
        scenario_config.simulation.duration_seconds = Some(duration);
    }

    commands.insert_resource(Time::<Fixed>::from_hz(scenario_config.simulation.tick_rate_hz));
    info!(
        "Powertrain tick rate set to {} Hz.",
        scenario_config.simulation.tick_rate_hz
    );
}

fn transition_to_scene_building(
    resolved_vehicles: Res<ResolvedVehicles>,
    mut next_state: ResMut<NextState<AppState>>,
    mut exit: EventWriter<AppExit>,
) {
    if resolved_vehicles.0.is_empty() {
        error!("{}", ScenarioError::NoVehicles);
        exit.write(AppExit::error());
        return;
    }
    info!("Configuration loading and resolution complete. Transitioning to SceneBuilding state.");
    next_state.set(AppState::SceneBuilding);
}

#[cfg(test)]
mod tests {
    use super::*;

    const PICKUP: &str = r#"
        name = "pickup"
        [starting_pose]
        translation = [10.0, 0.0, 0.0]
        rotation = [0.0, 0.0, 90.0]
        [vehicle]
        fuel_tank = { capacity = 20.0, fluid = "Fuel" }
        [vehicle.engine]
        torque_curve = [180.0, 200.0, 220.0, 240.0, 250.0, 255.0, 250.0, 240.0, 220.0, 190.0]
        min_rpm = 800.0
        max_rpm = 5000.0
        peak_rpm = 4000.0
        mileage = 18.0
        oil_mileage = 3000.0
        coolant_mileage = 5000.0
        oil = { capacity = 1.5, fluid = "Oil" }
        [vehicle.transmission]
        gear_ratios = [3.4, 0.0, 3.6, 2.2, 1.5, 1.1, 0.85]
        top_speeds = [18.0, 25.0, 25.0, 42.0, 60.0, 80.0, 105.0]
        [vehicle.chassis]
        max_steering_angle = 35.0
        axles = [{ steering = true }, { motor = true }]
    "#;

    fn parse(toml: &str) -> Value {
        Figment::new()
            .merge(Toml::string(toml))
            .extract::<Value>()
            .unwrap()
    }

    #[test]
    fn resolves_and_validates_a_literal_vehicle() {
        let config = resolve_vehicle(&parse(PICKUP), &PrefabCatalog::default()).unwrap();
        assert_eq!(config.name, "pickup");
        assert!(!config.keyboard);
        assert!(config.script.is_empty());
        assert_eq!(config.vehicle.chassis.driven_wheels(), 2);
        assert_eq!(config.starting_pose.translation.x, 10.0);
    }

    #[test]
    fn resolves_a_vehicle_from_the_catalog_with_overrides() {
        let mut catalog = PrefabCatalog::default();
        let mut prefab = parse(PICKUP);
        if let Value::Dict(_, dict) = &mut prefab {
            dict.remove("name");
        }
        catalog.0.insert("vehicles.pickup".into(), prefab);

        let raw = parse(
            r#"
            from = "vehicles.pickup"
            name = "hot pickup"
            [vehicle]
            ambient_temperature = 110.0
            "#,
        );
        let config = resolve_vehicle(&raw, &catalog).unwrap();
        assert_eq!(config.name, "hot pickup");
        assert_eq!(config.vehicle.ambient_temperature, 110.0);
        assert_eq!(config.vehicle.engine.max_rpm, 5000.0);
    }

    #[test]
    fn vehicle_that_fails_assembly_is_rejected_with_its_name() {
        let broken = PICKUP.replace(
            "axles = [{ steering = true }, { motor = true }]",
            "axles = [{ steering = true }]",
        );
        let err = resolve_vehicle(&parse(&broken), &PrefabCatalog::default());
        assert!(matches!(
            err,
            Err(ScenarioError::InvalidVehicle { name, source: ConfigError::NoDrivenWheels }) if name == "pickup"
        ));
    }

    #[test]
    fn unknown_fields_are_a_deserialization_error() {
        let raw = parse(&format!("{PICKUP}\nturbo = true"));
        // Appended after the [vehicle.chassis] table, so it lands there.
        assert!(matches!(
            resolve_vehicle(&raw, &PrefabCatalog::default()),
            Err(ScenarioError::Load(_))
        ));
    }

    #[test]
    fn tick_rate_must_be_positive_and_finite() {
        let dir = std::env::temp_dir().join(format!("powertrain_tick_rate_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for (file, rate) in [("zero", "0.0"), ("negative", "-50.0"), ("nan", "nan"), ("inf", "inf")] {
            let path = dir.join(format!("{file}.toml"));
            std::fs::write(&path, format!("[simulation]\ntick_rate_hz = {rate}\n")).unwrap();
            let err = load_scenario_file(&path);
            assert!(
                matches!(err, Err(ScenarioError::InvalidTickRate(_))),
                "{rate} Hz was accepted"
            );
        }

        let path = dir.join("ok.toml");
        std::fs::write(&path, "[simulation]\ntick_rate_hz = 60.0\n").unwrap();
        assert_eq!(load_scenario_file(&path).unwrap().simulation.tick_rate_hz, 60.0);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_scenario_file_is_reported() {
        let err = load_scenario_file(Path::new("no/such/scenario.toml"));
        assert!(matches!(err, Err(ScenarioError::MissingFile(_))));
    }
}
