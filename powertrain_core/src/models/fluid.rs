// powertrain_core/src/models/fluid.rs

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The fluid a reservoir is filled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum FluidKind {
    #[default]
    None,
    Fuel,
    Oil,
    #[serde(alias = "Coolant")]
    Water,
}

/// Thermal conductivity of gasoline and oil (0.15) relative to water (0.606).
pub const HYDROCARBON_THERMAL_CONDUCTIVITY: f64 = 0.248;

impl FluidKind {
    /// Thermal conductivity relative to water, or `None` for an unfilled reservoir.
    pub fn relative_thermal_conductivity(self) -> Option<f64> {
        match self {
            FluidKind::Water => Some(1.0),
            FluidKind::Fuel | FluidKind::Oil => Some(HYDROCARBON_THERMAL_CONDUCTIVITY),
            FluidKind::None => None,
        }
    }
}

/// A capacity-bounded fluid store (fuel tank, engine sump, coolant reservoir).
///
/// Capacity and level are in gallons. The level is kept inside `[0, capacity]`
/// by saturating `add`/`remove`; nothing else mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct FluidReservoir {
    capacity: f64,
    level: f64,
    kind: FluidKind,
}

impl FluidReservoir {
    /// Creates a reservoir. `name` only labels the error.
    ///
    /// The initial level is clamped into `[0, capacity]`.
    pub fn new(
        name: &'static str,
        capacity: f64,
        level: f64,
        kind: FluidKind,
    ) -> Result<Self, ConfigError> {
        if !(capacity > 0.0 && capacity.is_finite()) {
            return Err(ConfigError::NonPositiveCapacity { name, capacity });
        }
        Ok(Self {
            capacity,
            level: level.clamp(0.0, capacity),
            kind,
        })
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn kind(&self) -> FluidKind {
        self.kind
    }

    pub fn fill_ratio(&self) -> f64 {
        self.level / self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.level <= 0.0
    }

    /// True when the reservoir holds some of the given fluid.
    pub fn holds(&self, kind: FluidKind) -> bool {
        !self.is_empty() && self.kind == kind
    }

    /// Adds fluid, saturating at capacity. Negative amounts drain, saturating at zero.
    pub fn add(&mut self, amount: f64) {
        self.level = (self.level + amount).clamp(0.0, self.capacity);
    }

    /// Removes fluid, saturating at zero. Negative amounts fill, saturating at capacity.
    pub fn remove(&mut self, amount: f64) {
        self.level = (self.level - amount).clamp(0.0, self.capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn tank(level: f64) -> FluidReservoir {
        FluidReservoir::new("tank", 5.0, level, FluidKind::Fuel).unwrap()
    }

    #[test]
    fn add_saturates_at_capacity() {
        let mut r = tank(4.0);
        r.add(0.5);
        assert_abs_diff_eq!(r.level(), 4.5);
        r.add(100.0);
        assert_abs_diff_eq!(r.level(), 5.0);
        r.add(f64::MAX);
        assert!(r.level() <= r.capacity());
    }

    #[test]
    fn remove_saturates_at_zero() {
        let mut r = tank(1.0);
        r.remove(0.25);
        assert_abs_diff_eq!(r.level(), 0.75);
        r.remove(10.0);
        assert_abs_diff_eq!(r.level(), 0.0);
        assert!(r.is_empty());
    }

    #[test]
    fn negative_amounts_still_respect_bounds() {
        let mut r = tank(2.0);
        r.remove(-100.0);
        assert_abs_diff_eq!(r.level(), 5.0);
        r.add(-100.0);
        assert_abs_diff_eq!(r.level(), 0.0);
    }

    #[test]
    fn initial_level_is_clamped() {
        assert_abs_diff_eq!(tank(9.0).level(), 5.0);
        assert_abs_diff_eq!(tank(-1.0).level(), 0.0);
    }

    #[test]
    fn rejects_non_positive_capacity() {
        for capacity in [0.0, -1.0, f64::NAN] {
            let err = FluidReservoir::new("sump", capacity, 0.0, FluidKind::Oil).unwrap_err();
            assert!(matches!(err, ConfigError::NonPositiveCapacity { name: "sump", .. }));
        }
    }

    #[test]
    fn holds_requires_level_and_kind() {
        let r = tank(1.0);
        assert!(r.holds(FluidKind::Fuel));
        assert!(!r.holds(FluidKind::Oil));
        assert!(!tank(0.0).holds(FluidKind::Fuel));
    }

    #[test]
    fn fill_ratio_tracks_level() {
        assert_abs_diff_eq!(tank(1.25).fill_ratio(), 0.25);
    }
}
