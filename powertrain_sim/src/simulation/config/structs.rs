// powertrain_sim/src/simulation/config/structs.rs

use bevy::prelude::Resource;
use figment::value::Value;
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use powertrain_core::config::VehicleSpec;
use serde::Deserialize;

use crate::simulation::utils::serde_helpers;

// =========================================================================
// == Top-Level Scenario Resource ==
// =========================================================================

/// The root of a `scenario.toml` file.
///
/// Vehicles stay as raw values until they are resolved against the prefab catalog.
#[derive(Resource, Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: SimulationSection,

    #[serde(default)]
    pub vehicles: Vec<Value>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SimulationSection {
    /// Fixed tick rate of the powertrain, in Hz.
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: f64,
    /// Stop after this many simulated seconds. Runs forever when absent.
    #[serde(default)]
    pub duration_seconds: Option<f64>,
}

fn default_tick_rate_hz() -> f64 {
    50.0
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            tick_rate_hz: default_tick_rate_hz(),
            duration_seconds: None,
        }
    }
}

// =========================================================================
// == Vehicle Entries ==
// =========================================================================

/// One fully resolved `[[vehicles]]` entry.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct VehicleConfig {
    pub name: String,
    #[serde(default)]
    pub starting_pose: Pose,
    pub vehicle: VehicleSpec,
    /// Drive this vehicle from the keyboard (windowed mode only).
    #[serde(default)]
    pub keyboard: bool,
    /// Timed driver inputs.
    #[serde(default)]
    pub script: Vec<ScriptStep>,
}

/// A world pose in ENU: translation in meters, rotation as `[roll, pitch, yaw]` degrees.
#[derive(Deserialize, Debug, Clone, Copy, Default)]
#[serde(deny_unknown_fields)]
pub struct Pose {
    #[serde(with = "serde_helpers::vec3_f64_from_array", default)]
    pub translation: Vector3<f64>,

    #[serde(with = "serde_helpers::quat_from_euler_deg", default)]
    pub rotation: UnitQuaternion<f64>,
}

impl Pose {
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation)
    }
}

/// A driver button, as named in scripts.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Ignition,
    Handbrake,
    Lights,
}

/// Driver inputs that take effect at a given simulated time.
///
/// Axes that are left out keep their previous value.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScriptStep {
    /// Seconds since the simulation started running.
    pub at: f64,
    #[serde(default)]
    pub throttle: Option<f64>,
    #[serde(default)]
    pub steering: Option<f64>,
    #[serde(default)]
    pub press: Vec<Control>,
}
