// powertrain_sim/src/simulation/core/transforms.rs

//! Conversions between the world frame the powertrain reasons in (ENU: x east,
//! y north, z up) and Bevy's render/physics frame (x right, y up, z toward the viewer).

use bevy::prelude::{Quat as BevyQuat, Transform as BevyTransform, Vec3 as BevyVec3};
use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion, Vector3};
use powertrain_core::types::VehiclePose;
use std::f64::consts::FRAC_PI_2;

/// Rotation taking ENU basis vectors into Bevy coordinates.
/// ENU x stays Bevy x, ENU y (north) becomes Bevy -z, ENU z (up) becomes Bevy y.
fn q_enu_frame_to_bevy_frame() -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2)
}

/// Converts a 3D coordinate vector from ENU to Bevy world.
pub fn enu_vector_to_bevy_vector(enu_vec: &Vector3<f64>) -> BevyVec3 {
    BevyVec3::new(
        enu_vec.x as f32,  // East -> Bevy X
        enu_vec.z as f32,  // ENU Up -> Bevy Y
        -enu_vec.y as f32, // ENU North -> Bevy -Z
    )
}

/// Converts a 3D coordinate vector from Bevy world to ENU.
pub fn bevy_vector_to_enu_vector(bevy_vec: &BevyVec3) -> Vector3<f64> {
    Vector3::new(
        bevy_vec.x as f64,  // Bevy X -> ENU East
        -bevy_vec.z as f64, // Bevy -Z -> ENU North
        bevy_vec.y as f64,  // Bevy Y -> ENU Up
    )
}

/// Converts an object's orientation from ENU frame to Bevy world frame.
pub fn enu_quat_to_bevy_quat(enu_obj_quat: &UnitQuaternion<f64>) -> BevyQuat {
    let q = q_enu_frame_to_bevy_frame();
    let final_rot_f64 = q * enu_obj_quat * q.inverse();

    BevyQuat::from_xyzw(
        final_rot_f64.coords.x as f32,
        final_rot_f64.coords.y as f32,
        final_rot_f64.coords.z as f32,
        final_rot_f64.coords.w as f32,
    )
}

/// Converts an object's orientation from Bevy world frame to ENU frame.
pub fn bevy_quat_to_enu_quat(bevy_obj_quat: &BevyQuat) -> UnitQuaternion<f64> {
    // nalgebra's Quaternion::new is w, x, y, z
    let bevy_q_f64 = UnitQuaternion::from_quaternion(Quaternion::new(
        bevy_obj_quat.w as f64,
        bevy_obj_quat.x as f64,
        bevy_obj_quat.y as f64,
        bevy_obj_quat.z as f64,
    ));

    let q = q_enu_frame_to_bevy_frame();
    q.inverse() * bevy_q_f64 * q
}

/// Converts a full pose (Isometry3) from ENU frame to Bevy Transform.
pub fn enu_iso_to_bevy_transform(enu_pose: &Isometry3<f64>) -> BevyTransform {
    BevyTransform {
        translation: enu_vector_to_bevy_vector(&enu_pose.translation.vector),
        rotation: enu_quat_to_bevy_quat(&enu_pose.rotation),
        scale: BevyVec3::ONE,
    }
}

/// Converts a Bevy Transform to a full pose (Isometry3) in the ENU frame.
pub fn bevy_transform_to_enu_iso(bevy_transform: &BevyTransform) -> Isometry3<f64> {
    let enu_translation_vector = bevy_vector_to_enu_vector(&bevy_transform.translation);
    let enu_rotation = bevy_quat_to_enu_quat(&bevy_transform.rotation);

    Isometry3::from_parts(Translation3::from(enu_translation_vector), enu_rotation)
}

/// The powertrain's view of where a Bevy body is.
pub fn bevy_transform_to_vehicle_pose(bevy_transform: &BevyTransform) -> VehiclePose {
    VehiclePose::from_isometry(&bevy_transform_to_enu_iso(bevy_transform))
}
