// powertrain_core/src/vehicle/lighting.rs

use crate::messages::LightSignals;

/// Headlamp switch position. The light button cycles through these in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadlampMode {
    #[default]
    Off,
    LowBeam,
    HighBeam,
}

impl HeadlampMode {
    pub fn next(self) -> Self {
        match self {
            HeadlampMode::Off => HeadlampMode::LowBeam,
            HeadlampMode::LowBeam => HeadlampMode::HighBeam,
            HeadlampMode::HighBeam => HeadlampMode::Off,
        }
    }
}

/// Lamp state of one vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightingState {
    pub headlamps: HeadlampMode,
    pub reverse: bool,
    pub brake: bool,
}

impl LightingState {
    pub fn toggle_headlamps(&mut self) {
        self.headlamps = self.headlamps.next();
    }

    /// Gauge backlights follow the running lights.
    pub fn backlight(&self) -> bool {
        self.headlamps != HeadlampMode::Off
    }

    pub fn signals(&self) -> LightSignals {
        let on = self.headlamps != HeadlampMode::Off;
        LightSignals {
            headlight_primary: on,
            headlight_secondary: self.headlamps == HeadlampMode::HighBeam,
            taillight_primary: on,
            taillight_secondary: self.reverse,
            taillight_tertiary: self.brake,
        }
    }
}
