// powertrain_core/src/types.rs

use nalgebra::{Isometry3, Vector3};

// --- Unit Conversions ---
/// Meters per second to miles per hour.
pub const MPS_TO_MPH: f64 = 2.236_936_292_054_4;
pub const SECONDS_PER_HOUR: f64 = 3600.0;

// --- Motion ---
/// Direction of travel along the vehicle's own forward axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementDirection {
    Forward,
    Backward,
    #[default]
    Stationary,
}

impl MovementDirection {
    /// Displacement along the forward axis (meters) below which the vehicle counts as at rest.
    pub const DEADBAND: f64 = 0.01;

    /// Classifies a displacement projected onto the forward axis.
    pub fn classify(projected: f64) -> Self {
        if projected < -Self::DEADBAND {
            MovementDirection::Backward
        } else if projected > Self::DEADBAND {
            MovementDirection::Forward
        } else {
            MovementDirection::Stationary
        }
    }
}

// --- Pose ---
/// Where the vehicle body is this tick, in world ENU coordinates (x east, y north, z up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehiclePose {
    /// Meters.
    pub position: Vector3<f64>,
    /// Unit vector along the body's forward axis.
    pub forward: Vector3<f64>,
    /// Raw pitch Euler angle in degrees, any range.
    pub pitch_degrees: f64,
}

impl Default for VehiclePose {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            forward: Vector3::x(),
            pitch_degrees: 0.0,
        }
    }
}

impl VehiclePose {
    /// Builds a pose from a body-to-world isometry whose body x axis points forward.
    pub fn from_isometry(iso: &Isometry3<f64>) -> Self {
        let (_, pitch, _) = iso.rotation.euler_angles();
        Self {
            position: iso.translation.vector,
            forward: iso.rotation * Vector3::x(),
            pitch_degrees: pitch.to_degrees(),
        }
    }

    /// Pitch folded into `[0, 180]`, so nose-up and nose-down count the same.
    pub fn tilt_degrees(&self) -> f64 {
        let t = self.pitch_degrees.rem_euclid(360.0);
        if t > 180.0 {
            360.0 - t
        } else {
            t
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::{Translation3, UnitQuaternion};

    #[test]
    fn deadband_suppresses_noise() {
        assert_eq!(MovementDirection::classify(0.005), MovementDirection::Stationary);
        assert_eq!(MovementDirection::classify(-0.01), MovementDirection::Stationary);
        assert_eq!(MovementDirection::classify(0.02), MovementDirection::Forward);
        assert_eq!(MovementDirection::classify(-0.02), MovementDirection::Backward);
    }

    #[test]
    fn tilt_is_folded_into_half_turn() {
        let pose = |pitch_degrees| VehiclePose {
            pitch_degrees,
            ..VehiclePose::default()
        };
        assert_abs_diff_eq!(pose(10.0).tilt_degrees(), 10.0);
        assert_abs_diff_eq!(pose(350.0).tilt_degrees(), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose(-10.0).tilt_degrees(), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose(540.0).tilt_degrees(), 180.0, epsilon = 1e-9);
    }

    #[test]
    fn pose_from_isometry() {
        // Yawed 90 degrees to face north, nose pitched down 15 degrees.
        let rotation = UnitQuaternion::from_euler_angles(0.0, 15f64.to_radians(), 90f64.to_radians());
        let iso = Isometry3::from_parts(Translation3::new(1.0, 2.0, 3.0), rotation);
        let pose = VehiclePose::from_isometry(&iso);
        assert_abs_diff_eq!(pose.position, Vector3::new(1.0, 2.0, 3.0));
        assert_abs_diff_eq!(pose.forward.norm(), 1.0, epsilon = 1e-12);
        assert!(pose.forward.y > 0.9);
        assert_abs_diff_eq!(pose.tilt_degrees(), 15.0, epsilon = 1e-9);
    }

    #[test]
    fn one_meter_per_fiftieth_second_in_mph() {
        assert_abs_diff_eq!(MPS_TO_MPH * 50.0, 111.846_814_602_72, epsilon = 1e-9);
    }
}
