// powertrain_core/src/vehicle/state.rs

use nalgebra::Vector3;

use crate::models::transmission::Gear;
use crate::types::{MovementDirection, VehiclePose};
use crate::vehicle::lighting::LightingState;

/// Brake torque applied to every wheel while the handbrake is engaged, N·m.
pub const HANDBRAKE_TORQUE: f64 = 1000.0;

/// Mutable per-vehicle simulation state. Only [`super::VehicleSim::tick`] writes it.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSimState {
    pub engine_rpm: f64,
    /// RPM after the overheat derate; this is what drives the torque lookup.
    pub true_engine_rpm: f64,
    /// N·m at the crankshaft.
    pub engine_torque: f64,
    /// N·m after the gearbox, before it is split across the driven wheels.
    pub gearbox_torque: f64,
    pub engine_load: f64,
    /// mph.
    pub current_speed: f64,
    pub prev_speed: f64,
    /// °F.
    pub engine_temperature: f64,
    pub ambient_temperature: f64,
    /// Temperature ceiling from the last running tick, °F.
    pub thermal_ceiling: Option<f64>,
    pub current_gear: Gear,
    pub engine_running: bool,
    pub handbrake_engaged: bool,
    /// Per-wheel brake torque, N·m. Held until something changes it.
    pub brake_torque: f64,
    pub movement: MovementDirection,
    pub forward_vector: Vector3<f64>,
    pub prev_position: Vector3<f64>,
    /// Miles.
    pub odometer: f64,
    pub lighting: LightingState,
}

impl VehicleSimState {
    /// A parked vehicle: engine off, handbrake on, in neutral.
    pub fn parked(pose: &VehiclePose, ambient_temperature: f64, engine_temperature: f64) -> Self {
        Self {
            engine_rpm: 0.0,
            true_engine_rpm: 0.0,
            engine_torque: 0.0,
            gearbox_torque: 0.0,
            engine_load: 0.0,
            current_speed: 0.0,
            prev_speed: 0.0,
            engine_temperature,
            ambient_temperature,
            thermal_ceiling: None,
            current_gear: Gear::Neutral,
            engine_running: false,
            handbrake_engaged: true,
            brake_torque: HANDBRAKE_TORQUE,
            movement: MovementDirection::Stationary,
            forward_vector: pose.forward,
            prev_position: pose.position,
            odometer: 0.0,
            lighting: LightingState::default(),
        }
    }
}
