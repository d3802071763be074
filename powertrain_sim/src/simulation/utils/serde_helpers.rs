// powertrain_sim/src/simulation/utils/serde_helpers.rs

pub mod vec3_f64_from_array {
    use nalgebra::Vector3;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vector3<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let arr: [f64; 3] = Deserialize::deserialize(deserializer)?;
        Ok(Vector3::from(arr))
    }
}

pub mod quat_from_euler_deg {
    use nalgebra::UnitQuaternion;
    use serde::{Deserialize, Deserializer};

    /// Reads `[roll, pitch, yaw]` in degrees.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<UnitQuaternion<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let arr: [f64; 3] = Deserialize::deserialize(deserializer)?;
        Ok(UnitQuaternion::from_euler_angles(
            arr[0].to_radians(),
            arr[1].to_radians(),
            arr[2].to_radians(),
        ))
    }
}
