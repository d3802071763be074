// powertrain_core/src/config.rs

//! Serializable descriptions of a vehicle, as authored in scenario and catalog
//! files. Nothing here is validated until the vehicle is assembled with
//! [`crate::vehicle::VehicleSim::assemble`].

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::fluid::{FluidKind, FluidReservoir};

// =========================================================================
// == Top-Level Vehicle Description ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VehicleSpec {
    pub engine: EngineSpec,
    pub transmission: TransmissionSpec,
    pub fuel_tank: ReservoirSpec,
    /// Vehicles without a radiator are valid; they overheat much faster.
    #[serde(default)]
    pub radiator: Option<RadiatorSpec>,
    pub chassis: ChassisSpec,
    #[serde(default)]
    pub instruments: InstrumentSpec,
    /// Outside air temperature, °F.
    #[serde(default = "default_temperature")]
    pub ambient_temperature: f64,
    /// Engine temperature at assembly, °F.
    #[serde(default = "default_temperature")]
    pub initial_engine_temperature: f64,
}

fn default_temperature() -> f64 {
    90.0
}

fn default_top_temperature() -> f64 {
    200.0
}

fn default_size_factor() -> f64 {
    1.0
}

// =========================================================================
// == Sub-Component Descriptions ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReservoirSpec {
    /// Gallons.
    pub capacity: f64,
    /// Gallons at assembly. Missing means full.
    #[serde(default)]
    pub level: Option<f64>,
    pub fluid: FluidKind,
}

impl ReservoirSpec {
    pub fn full(fluid: FluidKind, capacity: f64) -> Self {
        Self {
            capacity,
            level: None,
            fluid,
        }
    }

    pub fn build(&self, name: &'static str) -> Result<FluidReservoir, ConfigError> {
        FluidReservoir::new(
            name,
            self.capacity,
            self.level.unwrap_or(self.capacity),
            self.fluid,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSpec {
    /// Torque in ft-lb from 1200 to 4800 RPM in 400 RPM steps.
    pub torque_curve: Vec<f64>,
    pub min_rpm: f64,
    pub max_rpm: f64,
    pub peak_rpm: f64,
    /// Miles per gallon of fuel.
    pub mileage: f64,
    /// Miles per gallon of oil.
    pub oil_mileage: f64,
    /// Miles per gallon of coolant.
    pub coolant_mileage: f64,
    pub oil: ReservoirSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransmissionSpec {
    /// Reverse magnitude, neutral (unused), then forward gears ascending.
    pub gear_ratios: Vec<f64>,
    /// Top speed per gear in mph, same layout as `gear_ratios`.
    pub top_speeds: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RadiatorSpec {
    /// Top operating temperature of a reference-size radiator, °F.
    #[serde(default = "default_top_temperature")]
    pub top_temperature: f64,
    /// Core area times thickness relative to the reference radiator.
    #[serde(default = "default_size_factor")]
    pub size_factor: f64,
    pub coolant: ReservoirSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChassisSpec {
    /// Degrees.
    pub max_steering_angle: f64,
    /// Meters. Used by the physics collaborator to turn torque into force.
    #[serde(default = "default_wheel_radius")]
    pub wheel_radius: f64,
    /// Kilograms.
    #[serde(default = "default_mass")]
    pub mass: f64,
    /// Meters between front and rear axle. Used by the physics collaborator for yaw rate.
    #[serde(default = "default_wheelbase")]
    pub wheelbase: f64,
    pub axles: Vec<AxleSpec>,
}

fn default_wheel_radius() -> f64 {
    0.35
}

fn default_mass() -> f64 {
    1500.0
}

fn default_wheelbase() -> f64 {
    2.8
}

impl ChassisSpec {
    /// Number of wheels receiving engine torque (two per motor axle).
    pub fn driven_wheels(&self) -> usize {
        self.axles.iter().filter(|a| a.motor).count() * 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("wheel radius", self.wheel_radius),
            ("mass", self.mass),
            ("wheelbase", self.wheelbase),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositiveChassisDimension { name, value });
            }
        }
        if self.driven_wheels() == 0 {
            return Err(ConfigError::NoDrivenWheels);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxleSpec {
    #[serde(default)]
    pub motor: bool,
    #[serde(default)]
    pub steering: bool,
}

/// Full-scale values of the dashboard gauges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstrumentSpec {
    pub tachometer_max: f64,
    pub speedometer_max: f64,
    pub thermometer_max: f64,
}

impl Default for InstrumentSpec {
    fn default() -> Self {
        Self {
            tachometer_max: 6000.0,
            speedometer_max: 120.0,
            thermometer_max: 300.0,
        }
    }
}

impl InstrumentSpec {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("tachometer", self.tachometer_max),
            ("speedometer", self.speedometer_max),
            ("thermometer", self.thermometer_max),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositiveGaugeMax { name, value });
            }
        }
        Ok(())
    }
}

// =========================================================================
// == Reference Vehicle ==
// =========================================================================

impl Default for VehicleSpec {
    /// A rear-wheel-drive pickup with a five-speed gearbox.
    fn default() -> Self {
        Self {
            engine: EngineSpec {
                torque_curve: vec![
                    180.0, 200.0, 220.0, 240.0, 250.0, 255.0, 250.0, 240.0, 220.0, 190.0,
                ],
                min_rpm: 800.0,
                max_rpm: 5000.0,
                peak_rpm: 4000.0,
                mileage: 18.0,
                oil_mileage: 3000.0,
                coolant_mileage: 5000.0,
                oil: ReservoirSpec::full(FluidKind::Oil, 1.5),
            },
            transmission: TransmissionSpec {
                gear_ratios: vec![3.4, 0.0, 3.6, 2.2, 1.5, 1.1, 0.85],
                top_speeds: vec![18.0, 25.0, 25.0, 42.0, 60.0, 80.0, 105.0],
            },
            fuel_tank: ReservoirSpec::full(FluidKind::Fuel, 20.0),
            radiator: Some(RadiatorSpec {
                top_temperature: default_top_temperature(),
                size_factor: default_size_factor(),
                coolant: ReservoirSpec::full(FluidKind::Water, 2.5),
            }),
            chassis: ChassisSpec {
                max_steering_angle: 35.0,
                wheel_radius: default_wheel_radius(),
                mass: default_mass(),
                wheelbase: default_wheelbase(),
                axles: vec![
                    AxleSpec {
                        motor: false,
                        steering: true,
                    },
                    AxleSpec {
                        motor: true,
                        steering: false,
                    },
                ],
            },
            instruments: InstrumentSpec::default(),
            ambient_temperature: default_temperature(),
            initial_engine_temperature: default_temperature(),
        }
    }
}
