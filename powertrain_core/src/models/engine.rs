// powertrain_core/src/models/engine.rs

use crate::config::EngineSpec;
use crate::error::ConfigError;
use crate::models::fluid::{FluidKind, FluidReservoir};

/// Number of authored torque samples.
pub const TORQUE_SAMPLES: usize = 10;
/// RPM of the first torque sample.
pub const TORQUE_CURVE_START_RPM: f64 = 1200.0;
/// RPM spacing between torque samples.
pub const TORQUE_CURVE_STEP_RPM: f64 = 400.0;
/// Foot-pounds per newton-meter.
pub const FT_LB_PER_NEWTON_METER: f64 = 0.73756;

/// Converts a value read off the lookup table into newton-meters.
pub fn lookup_to_newton_meters(lookup: f64) -> f64 {
    lookup / FT_LB_PER_NEWTON_METER
}

/// Torque curve, operating range and consumption constants of an engine.
///
/// The engine also owns its oil sump. Torque is authored in foot-pounds; each
/// sample is scaled by [`FT_LB_PER_NEWTON_METER`] into the lookup table, and a
/// lookup turns back into newton-meters through [`lookup_to_newton_meters`].
/// At a sample boundary that yields the authored figure.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineModel {
    torque_table: [f64; TORQUE_SAMPLES],
    pub min_rpm: f64,
    pub max_rpm: f64,
    /// RPM of maximum usable torque; also the upshift point.
    pub peak_rpm: f64,
    /// Miles per gallon of fuel at `peak_rpm`.
    pub mileage: f64,
    /// Miles per gallon of oil at `max_rpm`.
    pub oil_mileage: f64,
    /// Miles per gallon of coolant at `max_rpm`.
    pub coolant_mileage: f64,
    oil: FluidReservoir,
}

impl EngineModel {
    pub fn new(spec: &EngineSpec) -> Result<Self, ConfigError> {
        let torque_table: [f64; TORQUE_SAMPLES] = spec
            .torque_curve
            .iter()
            .map(|ft_lb| ft_lb * FT_LB_PER_NEWTON_METER)
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|_| ConfigError::TorqueCurveLength {
                expected: TORQUE_SAMPLES,
                actual: spec.torque_curve.len(),
            })?;

        if !(spec.max_rpm > spec.min_rpm) {
            return Err(ConfigError::InvalidRpmRange {
                min_rpm: spec.min_rpm,
                max_rpm: spec.max_rpm,
            });
        }

        for (name, value) in [
            ("peak RPM", spec.peak_rpm),
            ("mileage", spec.mileage),
            ("oil mileage", spec.oil_mileage),
            ("coolant mileage", spec.coolant_mileage),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositiveMileage { name, value });
            }
        }

        let oil = spec.oil.build("engine oil")?;

        Ok(Self {
            torque_table,
            min_rpm: spec.min_rpm,
            max_rpm: spec.max_rpm,
            peak_rpm: spec.peak_rpm,
            mileage: spec.mileage,
            oil_mileage: spec.oil_mileage,
            coolant_mileage: spec.coolant_mileage,
            oil,
        })
    }

    /// Table lookup at the given RPM, in table units. Pass the result through
    /// [`lookup_to_newton_meters`] (or use [`EngineModel::torque_nm`]) for newton-meters.
    ///
    /// Above the first sample the result is the lower sample plus a fixed span of
    /// `fraction * 400`, not an interpolation toward the next sample.
    pub fn torque(&self, rpm: f64) -> f64 {
        if rpm < TORQUE_CURVE_START_RPM {
            let fraction = rpm / TORQUE_CURVE_START_RPM;
            return fraction * self.torque_table[0];
        }

        let index = (((rpm - TORQUE_CURVE_START_RPM) / TORQUE_CURVE_STEP_RPM).floor() as usize)
            .min(TORQUE_SAMPLES - 1);
        let lower_bound = self.torque_table[index];
        let sample_rpm = index as f64 * TORQUE_CURVE_STEP_RPM + TORQUE_CURVE_START_RPM;
        let fraction = (rpm - sample_rpm) / TORQUE_CURVE_STEP_RPM;
        lower_bound + fraction * TORQUE_CURVE_STEP_RPM
    }

    /// Engine torque in newton-meters at the given RPM.
    pub fn torque_nm(&self, rpm: f64) -> f64 {
        lookup_to_newton_meters(self.torque(rpm))
    }

    pub fn torque_table(&self) -> &[f64; TORQUE_SAMPLES] {
        &self.torque_table
    }

    /// The engine is lubricated: the sump holds some oil.
    pub fn is_lubricated(&self) -> bool {
        self.oil.holds(FluidKind::Oil)
    }

    pub fn oil(&self) -> &FluidReservoir {
        &self.oil
    }

    pub fn oil_mut(&mut self) -> &mut FluidReservoir {
        &mut self.oil
    }
}
