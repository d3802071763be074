// powertrain_core/src/models/radiator.rs

use tracing::debug;

use crate::config::RadiatorSpec;
use crate::error::ConfigError;
use crate::models::fluid::FluidReservoir;

/// How much hotter an empty radiator runs than a full one, as a fraction of the top temperature.
pub const EMPTY_RESERVOIR_PENALTY: f64 = 0.25;
/// Minimum temperature reported when the reservoir holds no fluid at all.
pub const UNFILLED_MIN_TEMPERATURE: f64 = 900.0;

/// Signal state handed to the external overheat visual effect (steam, glow).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RadiatorSignal {
    pub active: bool,
    /// Effect strength in `[0, 1]`.
    pub intensity: f64,
}

/// Cooling capacity of a radiator and its coolant reservoir.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiatorModel {
    coolant: FluidReservoir,
    /// Top operating temperature (°F) after the size adjustment made at assembly.
    base_top_temperature: f64,
    effect: RadiatorSignal,
}

impl RadiatorModel {
    pub fn new(spec: &RadiatorSpec) -> Result<Self, ConfigError> {
        if !(spec.size_factor > 0.0) {
            return Err(ConfigError::NonPositiveRadiatorSize(spec.size_factor));
        }
        let coolant = spec.coolant.build("radiator coolant")?;
        Ok(Self {
            coolant,
            // A larger core (area x thickness) holds the engine at a lower temperature.
            base_top_temperature: spec.top_temperature / spec.size_factor,
            effect: RadiatorSignal::default(),
        })
    }

    pub fn base_top_temperature(&self) -> f64 {
        self.base_top_temperature
    }

    /// The lowest temperature this radiator can hold the engine at.
    ///
    /// Depends on how full the reservoir is and on what it is filled with. Less
    /// coolant, or a poorer conductor than water, means a higher floor.
    pub fn min_temperature(&self) -> f64 {
        let Some(conductivity) = self.coolant.kind().relative_thermal_conductivity() else {
            return UNFILLED_MIN_TEMPERATURE;
        };
        let missing = 1.0 - self.coolant.fill_ratio();
        self.base_top_temperature * (1.0 + missing * EMPTY_RESERVOIR_PENALTY) / conductivity
    }

    pub fn coolant(&self) -> &FluidReservoir {
        &self.coolant
    }

    pub fn coolant_mut(&mut self) -> &mut FluidReservoir {
        &mut self.coolant
    }

    // --- Overheat effect hooks ---

    pub fn effect(&self) -> RadiatorSignal {
        self.effect
    }

    /// Sets the effect strength, clamped to `[0, 1]`. Returns true if it changed.
    pub fn set_intensity(&mut self, intensity: f64) -> bool {
        let intensity = intensity.clamp(0.0, 1.0);
        let changed = self.effect.intensity != intensity;
        self.effect.intensity = intensity;
        changed
    }

    /// Returns true if the effect was not already active.
    pub fn activate_overheat_effect(&mut self) -> bool {
        if self.effect.active {
            return false;
        }
        debug!("radiator overheat effect on");
        self.effect.active = true;
        true
    }

    /// Returns true if the effect was active.
    pub fn deactivate_overheat_effect(&mut self) -> bool {
        if !self.effect.active {
            return false;
        }
        debug!("radiator overheat effect off");
        self.effect = RadiatorSignal::default();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReservoirSpec;
    use crate::models::fluid::{FluidKind, HYDROCARBON_THERMAL_CONDUCTIVITY};
    use approx::assert_abs_diff_eq;

    fn radiator(kind: FluidKind, level: f64) -> RadiatorModel {
        RadiatorModel::new(&RadiatorSpec {
            top_temperature: 200.0,
            size_factor: 1.0,
            coolant: ReservoirSpec {
                capacity: 2.0,
                level: Some(level),
                fluid: kind,
            },
        })
        .unwrap()
    }

    #[test]
    fn full_water_radiator_holds_top_temperature() {
        assert_abs_diff_eq!(radiator(FluidKind::Water, 2.0).min_temperature(), 200.0);
    }

    #[test]
    fn emptier_reservoir_raises_the_floor() {
        assert_abs_diff_eq!(radiator(FluidKind::Water, 1.0).min_temperature(), 225.0);
        assert_abs_diff_eq!(radiator(FluidKind::Water, 0.0).min_temperature(), 250.0);
    }

    #[test]
    fn hydrocarbon_coolant_divides_by_conductivity() {
        for kind in [FluidKind::Oil, FluidKind::Fuel] {
            assert_abs_diff_eq!(
                radiator(kind, 2.0).min_temperature(),
                200.0 / HYDROCARBON_THERMAL_CONDUCTIVITY,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn unfilled_radiator_uses_fallback() {
        assert_abs_diff_eq!(
            radiator(FluidKind::None, 2.0).min_temperature(),
            UNFILLED_MIN_TEMPERATURE
        );
    }

    #[test]
    fn size_factor_scales_top_temperature() {
        let r = RadiatorModel::new(&RadiatorSpec {
            top_temperature: 200.0,
            size_factor: 1.25,
            coolant: ReservoirSpec::full(FluidKind::Water, 2.0),
        })
        .unwrap();
        assert_abs_diff_eq!(r.base_top_temperature(), 160.0);
        assert_abs_diff_eq!(r.min_temperature(), 160.0);
    }

    #[test]
    fn rejects_non_positive_size_factor() {
        let err = RadiatorModel::new(&RadiatorSpec {
            top_temperature: 200.0,
            size_factor: 0.0,
            coolant: ReservoirSpec::full(FluidKind::Water, 2.0),
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::NonPositiveRadiatorSize(0.0));
    }

    #[test]
    fn effect_hooks_are_idempotent() {
        let mut r = radiator(FluidKind::Water, 2.0);
        assert!(r.activate_overheat_effect());
        assert!(!r.activate_overheat_effect());
        assert!(r.set_intensity(2.0));
        assert_abs_diff_eq!(r.effect().intensity, 1.0);
        assert!(!r.set_intensity(1.5));
        assert!(r.deactivate_overheat_effect());
        assert!(!r.deactivate_overheat_effect());
        assert_eq!(r.effect(), RadiatorSignal::default());
    }
}
