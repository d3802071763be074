// powertrain_core/src/messages.rs

use crate::models::radiator::RadiatorSignal;

// =========================================================================
// == Inputs ==
// =========================================================================

/// One tick's worth of driver controls.
///
/// Axes are clamped to `[-1, 1]` when read. The `*_pressed` flags are edges:
/// true for exactly the tick in which the button was released.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "bevy", derive(bevy_ecs::component::Component))]
pub struct DriverInput {
    /// Forward positive.
    pub throttle: f64,
    /// Right positive.
    pub steering: f64,
    pub ignition_pressed: bool,
    pub handbrake_pressed: bool,
    pub lights_pressed: bool,
}

impl DriverInput {
    pub fn throttle(&self) -> f64 {
        self.throttle.clamp(-1.0, 1.0)
    }

    pub fn steering(&self) -> f64 {
        self.steering.clamp(-1.0, 1.0)
    }

    /// Clears the edge flags once a tick has consumed them. Axes are held.
    pub fn clear_edges(&mut self) {
        self.ignition_pressed = false;
        self.handbrake_pressed = false;
        self.lights_pressed = false;
    }
}

// =========================================================================
// == Outputs ==
// =========================================================================

/// Gauge needle positions, each in `[0, 1]` of full scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GaugeReadings {
    pub tachometer: f64,
    pub speedometer: f64,
    pub fuel: f64,
    pub thermometer: f64,
    pub backlight: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WheelSide {
    Left,
    Right,
}

/// What the physics solver should apply to one wheel this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelCommand {
    pub axle: usize,
    pub side: WheelSide,
    /// Degrees, right positive.
    pub steer_angle: f64,
    /// Newton-meters.
    pub motor_torque: f64,
    /// Newton-meters.
    pub brake_torque: f64,
}

/// On/off states for the lamp collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightSignals {
    /// Low beams.
    pub headlight_primary: bool,
    /// High beams.
    pub headlight_secondary: bool,
    /// Running lights.
    pub taillight_primary: bool,
    /// Reverse lamps.
    pub taillight_secondary: bool,
    /// Brake lamps.
    pub taillight_tertiary: bool,
}

/// Everything a tick hands to the outside world.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "bevy", derive(bevy_ecs::component::Component))]
pub struct TickOutput {
    pub gauges: GaugeReadings,
    /// Miles travelled this tick.
    pub odometer_delta: f64,
    pub wheels: Vec<WheelCommand>,
    pub lights: LightSignals,
    /// `None` when the vehicle has no radiator.
    pub radiator: Option<RadiatorSignal>,
}

impl TickOutput {
    /// Sum of motor torque over all wheels.
    pub fn total_motor_torque(&self) -> f64 {
        self.wheels.iter().map(|w| w.motor_torque).sum()
    }

    /// Sum of brake torque over all wheels.
    pub fn total_brake_torque(&self) -> f64 {
        self.wheels.iter().map(|w| w.brake_torque).sum()
    }

    /// Mean steer angle over the steered wheels, or 0 if none are steered.
    pub fn steer_angle(&self) -> f64 {
        let (sum, n) = self
            .wheels
            .iter()
            .filter(|w| w.steer_angle != 0.0)
            .fold((0.0, 0usize), |(s, n), w| (s + w.steer_angle, n + 1));
        if n == 0 {
            0.0
        } else {
            sum / n as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_are_clamped_on_read() {
        let input = DriverInput {
            throttle: 3.0,
            steering: -2.0,
            ..DriverInput::default()
        };
        assert_eq!(input.throttle(), 1.0);
        assert_eq!(input.steering(), -1.0);
    }

    #[test]
    fn clearing_edges_keeps_axes() {
        let mut input = DriverInput {
            throttle: 0.5,
            ignition_pressed: true,
            lights_pressed: true,
            ..DriverInput::default()
        };
        input.clear_edges();
        assert_eq!(input.throttle, 0.5);
        assert!(!input.ignition_pressed && !input.lights_pressed);
    }
}
