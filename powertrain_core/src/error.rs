// powertrain_core/src/error.rs

use thiserror::Error;

/// Everything that can be wrong with a vehicle description.
///
/// All of these are caught when a vehicle is assembled. The per-tick path never
/// returns an error, so a value of this type means the configuration has to be
/// fixed, not that the simulation hit an unusual operating condition.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("reservoir '{name}' must have a strictly positive capacity (got {capacity})")]
    NonPositiveCapacity { name: &'static str, capacity: f64 },

    #[error("torque curve must have exactly {expected} samples (got {actual})")]
    TorqueCurveLength { expected: usize, actual: usize },

    #[error("engine max RPM ({max_rpm}) must be greater than min RPM ({min_rpm})")]
    InvalidRpmRange { min_rpm: f64, max_rpm: f64 },

    #[error("engine {name} must be strictly positive (got {value})")]
    NonPositiveMileage { name: &'static str, value: f64 },

    #[error("gear ratio table has {ratios} entries but top speed table has {top_speeds}")]
    GearTableMismatch { ratios: usize, top_speeds: usize },

    #[error("transmission needs reverse, neutral and at least one forward gear (got {0} entries)")]
    TooFewGears(usize),

    #[error("gear {index} must have a strictly positive top speed (got {top_speed})")]
    NonPositiveTopSpeed { index: usize, top_speed: f64 },

    #[error("forward gear {index} must have a strictly positive ratio (got {ratio})")]
    NonPositiveForwardRatio { index: usize, ratio: f64 },

    #[error("radiator size factor must be strictly positive (got {0})")]
    NonPositiveRadiatorSize(f64),

    #[error("chassis {name} must be strictly positive (got {value})")]
    NonPositiveChassisDimension { name: &'static str, value: f64 },

    #[error("chassis must have at least one driven axle")]
    NoDrivenWheels,

    #[error("ambient temperature must be strictly positive (got {0})")]
    NonPositiveAmbientTemperature(f64),

    #[error("{name} gauge maximum must be strictly positive (got {value})")]
    NonPositiveGaugeMax { name: &'static str, value: f64 },
}
