// powertrain_core/src/models/transmission.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::TransmissionSpec;
use crate::error::ConfigError;

/// Table index of the reverse gear.
pub const REVERSE_INDEX: usize = 0;
/// Table index of neutral.
pub const NEUTRAL_INDEX: usize = 1;

/// The selected gear.
///
/// `Forward(n)` counts from 1. Values above the top gear are never produced by
/// the transmission's stepping methods. A hand-built `Forward(0)` is read as
/// first, and a forward gear past the top is read as the top gear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Gear {
    Reverse,
    #[default]
    Neutral,
    Forward(u8),
}

impl Gear {
    pub const FIRST: Gear = Gear::Forward(1);

    /// Index into the ratio and top-speed tables.
    pub fn index(self) -> usize {
        match self {
            Gear::Reverse => REVERSE_INDEX,
            Gear::Neutral => NEUTRAL_INDEX,
            Gear::Forward(n) => NEUTRAL_INDEX + n.max(1) as usize,
        }
    }

    pub fn is_forward(self) -> bool {
        matches!(self, Gear::Forward(_))
    }
}

impl fmt::Display for Gear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gear::Reverse => write!(f, "R"),
            Gear::Neutral => write!(f, "N"),
            Gear::Forward(n) => write!(f, "{}", n),
        }
    }
}

/// Gear ratio and top speed tables. Immutable after assembly.
///
/// Index 0 is reverse (stored negative), index 1 is neutral (ratio unused) and
/// the remaining entries are the forward gears in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct TransmissionModel {
    gear_ratios: Vec<f64>,
    /// Top speed of each gear, mph.
    top_speeds: Vec<f64>,
    top_gear: Gear,
}

impl TransmissionModel {
    pub fn new(spec: &TransmissionSpec) -> Result<Self, ConfigError> {
        let len = spec.gear_ratios.len();
        if len != spec.top_speeds.len() {
            return Err(ConfigError::GearTableMismatch {
                ratios: len,
                top_speeds: spec.top_speeds.len(),
            });
        }
        if len <= NEUTRAL_INDEX + 1 || len > NEUTRAL_INDEX + 1 + u8::MAX as usize {
            return Err(ConfigError::TooFewGears(len));
        }
        if let Some((index, &top_speed)) = spec
            .top_speeds
            .iter()
            .enumerate()
            .find(|(_, s)| !(**s > 0.0))
        {
            return Err(ConfigError::NonPositiveTopSpeed { index, top_speed });
        }
        if let Some((index, &ratio)) = spec
            .gear_ratios
            .iter()
            .enumerate()
            .skip(NEUTRAL_INDEX + 1)
            .find(|(_, r)| !(**r > 0.0))
        {
            return Err(ConfigError::NonPositiveForwardRatio { index, ratio });
        }

        let mut gear_ratios = spec.gear_ratios.clone();
        // Reverse is authored as a magnitude.
        gear_ratios[REVERSE_INDEX] = -gear_ratios[REVERSE_INDEX].abs();

        Ok(Self {
            gear_ratios,
            top_speeds: spec.top_speeds.clone(),
            top_gear: Gear::Forward((len - 1 - NEUTRAL_INDEX) as u8),
        })
    }

    pub fn top_gear(&self) -> Gear {
        self.top_gear
    }

    /// Number of forward gears.
    pub fn forward_gears(&self) -> u8 {
        (self.gear_ratios.len() - 1 - NEUTRAL_INDEX) as u8
    }

    /// Table slot of `gear`, saturated at the top gear.
    fn slot(&self, gear: Gear) -> usize {
        gear.index().min(self.top_gear.index())
    }

    pub fn ratio(&self, gear: Gear) -> f64 {
        self.gear_ratios[self.slot(gear)]
    }

    pub fn top_speed(&self, gear: Gear) -> f64 {
        self.top_speeds[self.slot(gear)]
    }

    pub fn top_speed_of_top_gear(&self) -> f64 {
        self.top_speed(self.top_gear)
    }

    pub fn gear_ratios(&self) -> &[f64] {
        &self.gear_ratios
    }

    pub fn top_speeds(&self) -> &[f64] {
        &self.top_speeds
    }

    /// The next forward gear, or `None` in top gear, neutral or reverse.
    pub fn next_gear(&self, gear: Gear) -> Option<Gear> {
        match gear {
            Gear::Forward(n) if n < self.forward_gears() => Some(Gear::Forward(n.max(1) + 1)),
            _ => None,
        }
    }

    /// The previous forward gear, or `None` in first, neutral or reverse.
    pub fn previous_gear(&self, gear: Gear) -> Option<Gear> {
        match gear {
            Gear::Forward(n) if n > 1 => Some(Gear::Forward(n.min(self.forward_gears()) - 1)),
            _ => None,
        }
    }
}
