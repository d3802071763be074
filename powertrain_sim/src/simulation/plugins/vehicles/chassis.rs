// powertrain_sim/src/simulation/plugins/vehicles/chassis.rs

//! The physical body a powertrain pushes against.
//!
//! Windowed runs hand the body to avian3d and apply the wheel commands as an
//! external force and yaw torque. Headless runs integrate a point mass along
//! the body's forward axis instead, so no renderer or physics world is needed.

use crate::{
    prelude::*,
    simulation::core::{
        components::BodyPose,
        transforms::{bevy_transform_to_enu_iso, enu_iso_to_bevy_transform},
    },
};
use avian3d::prelude::*;
use nalgebra::{Isometry3, UnitQuaternion, Vector3};

/// m/s².
pub const GRAVITY: f64 = 9.81;
/// Fraction of the vehicle's weight lost to rolling resistance.
pub const ROLLING_RESISTANCE: f64 = 0.015;
/// Below this forward speed (m/s) a body with no net push is held at rest.
pub const STOP_SPEED: f64 = 0.05;
/// Gain on the yaw-rate error when steering a rigid body.
const MAX_YAW_TORQUE: f32 = 2500.0;
/// Body-to-ground friction. Low, because wheel forces already model grip.
const GROUND_FRICTION: f32 = 0.05;

// --- BEVY COMPONENTS ---

/// Chassis parameters the body integration needs. Added by `attach_*_chassis`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ChassisParameters {
    /// kg.
    pub mass: f64,
    /// m.
    pub wheel_radius: f64,
    /// m.
    pub wheelbase: f64,
}

impl From<&ChassisSpec> for ChassisParameters {
    fn from(spec: &ChassisSpec) -> Self {
        Self {
            mass: spec.mass,
            wheel_radius: spec.wheel_radius,
            wheelbase: spec.wheelbase,
        }
    }
}

/// Headless body state. The pose itself lives in `BodyPose`.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct PointMassChassis {
    /// m/s along the body's forward axis.
    pub speed: f64,
}

#[derive(Resource)]
struct ChassisAssets {
    body_mesh: Handle<Mesh>,
    body_material: Handle<StandardMaterial>,
    wheel_mesh: Handle<Mesh>,
    wheel_material: Handle<StandardMaterial>,
}

// =========================================================================
// == Longitudinal and Lateral Model ==
// =========================================================================

/// Wheel torque turned into a push at the contact patch, N.
pub fn drive_force(output: &TickOutput, params: &ChassisParameters) -> f64 {
    output.total_motor_torque() / params.wheel_radius
}

/// Brakes plus rolling resistance, N. Always non-negative; opposes motion.
pub fn resistive_force(output: &TickOutput, params: &ChassisParameters) -> f64 {
    output.total_brake_torque() / params.wheel_radius + ROLLING_RESISTANCE * params.mass * GRAVITY
}

/// Net force along the forward axis. Resistance can hold a body still but
/// never pushes it.
pub fn net_longitudinal_force(speed: f64, push: f64, resist: f64) -> f64 {
    if speed.abs() < STOP_SPEED {
        if push.abs() <= resist {
            0.0
        } else {
            push - push.signum() * resist
        }
    } else {
        push - speed.signum() * resist
    }
}

/// Forward speed after one step of `dt` seconds.
pub fn step_speed(speed: f64, push: f64, resist: f64, mass: f64, dt: f64) -> f64 {
    let net = net_longitudinal_force(speed, push, resist);
    if speed.abs() < STOP_SPEED && net == 0.0 {
        return 0.0;
    }
    let next = speed + net / mass * dt;
    // Resistance alone stops the body at zero instead of reversing it.
    if speed.abs() >= STOP_SPEED && next * speed < 0.0 && push.abs() <= resist {
        0.0
    } else {
        next
    }
}

/// Kinematic bicycle yaw rate in rad/s, ENU sense (counter-clockwise positive).
/// Steering angles are degrees, right positive.
pub fn yaw_rate(speed: f64, steer_degrees: f64, wheelbase: f64) -> f64 {
    -(speed / wheelbase) * steer_degrees.to_radians().tan()
}

impl PointMassChassis {
    /// Advances the body one step under this tick's wheel commands.
    pub fn integrate(
        &mut self,
        pose: &mut Isometry3<f64>,
        output: &TickOutput,
        params: &ChassisParameters,
        dt: f64,
    ) {
        let forward = pose.rotation * Vector3::x();
        let grade_force = -params.mass * GRAVITY * forward.z;
        let push = drive_force(output, params) + grade_force;
        let resist = resistive_force(output, params);

        self.speed = step_speed(self.speed, push, resist, params.mass, dt);

        let yaw = yaw_rate(self.speed, output.steer_angle(), params.wheelbase) * dt;
        pose.rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), yaw) * pose.rotation;
        let forward = pose.rotation * Vector3::x();
        pose.translation.vector += forward * self.speed * dt;
    }
}

// --- THE PLUGIN ---
pub struct ChassisPlugin {
    pub headless: bool,
}

impl Plugin for ChassisPlugin {
    fn build(&self, app: &mut App) {
        if self.headless {
            app.add_systems(
                OnEnter(AppState::SceneBuilding),
                attach_point_mass_chassis.in_set(SceneBuildSet::Physics),
            )
            .add_systems(
                FixedUpdate,
                integrate_point_mass_chassis.in_set(SimulationSet::Actuation),
            );
        } else {
            app.add_systems(
                OnEnter(AppState::SceneBuilding),
                (
                    setup_chassis_assets,
                    attach_rigid_body_chassis
                        .in_set(SceneBuildSet::Physics)
                        .after(setup_chassis_assets),
                ),
            )
            .add_systems(
                FixedUpdate,
                (
                    sync_body_pose_from_physics.in_set(SimulationSet::Precomputation),
                    actuate_rigid_bodies.in_set(SimulationSet::Actuation),
                ),
            );
        }
    }
}

// --- SYSTEMS (HEADLESS) ---

fn attach_point_mass_chassis(
    mut commands: Commands,
    query: Query<(Entity, &SpawnVehicleRequest), Without<PointMassChassis>>,
) {
    for (entity, request) in &query {
        commands.entity(entity).insert((
            ChassisParameters::from(&request.0.vehicle.chassis),
            PointMassChassis::default(),
        ));
    }
}

fn integrate_point_mass_chassis(
    time: Res<Time>,
    mut query: Query<(
        &ChassisParameters,
        &TickOutput,
        &mut PointMassChassis,
        &mut BodyPose,
        &mut Transform,
    )>,
) {
    let dt = time.delta_secs_f64();
    for (params, output, mut chassis, mut body_pose, mut transform) in &mut query {
        chassis.integrate(&mut body_pose.0, output, params, dt);
        *transform = enu_iso_to_bevy_transform(&body_pose.0);
    }
}

// --- SYSTEMS (WINDOWED) ---

fn setup_chassis_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(ChassisAssets {
        // Body x is forward, so the long side runs along Bevy X.
        body_mesh: meshes.add(Cuboid::new(4.0, 0.8, 1.8)),
        body_material: materials.add(Color::srgb(0.7, 0.2, 0.2)),
        wheel_mesh: meshes.add(Cylinder::new(0.35, 0.25)),
        wheel_material: materials.add(Color::srgb(0.1, 0.1, 0.1)),
    });
}

fn attach_rigid_body_chassis(
    mut commands: Commands,
    query: Query<(Entity, &Name, &SpawnVehicleRequest), Without<RigidBody>>,
    assets: Res<ChassisAssets>,
) {
    for (entity, name, request) in &query {
        let params = ChassisParameters::from(&request.0.vehicle.chassis);

        commands
            .entity(entity)
            .insert((
                params,
                RigidBody::Dynamic,
                Collider::cuboid(4.0, 0.8, 1.8),
                Mass(params.mass as f32),
                Friction::new(GROUND_FRICTION),
                // Sleeping bodies ignore external forces.
                SleepingDisabled,
                LinearVelocity::default(),
                AngularVelocity::default(),
                InheritedVisibility::VISIBLE,
            ))
            .with_children(|parent| {
                parent.spawn((
                    Mesh3d(assets.body_mesh.clone()),
                    MeshMaterial3d(assets.body_material.clone()),
                    Name::new(format!("{}_Body", name)),
                ));

                let wheel_positions = [
                    (Vec3::new(1.4, -0.3, -0.9), format!("{}_FL_Wheel", name)),
                    (Vec3::new(1.4, -0.3, 0.9), format!("{}_FR_Wheel", name)),
                    (Vec3::new(-1.4, -0.3, -0.9), format!("{}_RL_Wheel", name)),
                    (Vec3::new(-1.4, -0.3, 0.9), format!("{}_RR_Wheel", name)),
                ];
                for (pos, wheel_name) in wheel_positions {
                    parent.spawn((
                        Mesh3d(assets.wheel_mesh.clone()),
                        MeshMaterial3d(assets.wheel_material.clone()),
                        Transform::from_translation(pos)
                            .with_rotation(Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)),
                        Name::new(wheel_name),
                    ));
                }
            });
    }
}

fn sync_body_pose_from_physics(mut query: Query<(&Transform, &mut BodyPose), With<RigidBody>>) {
    for (transform, mut body_pose) in &mut query {
        body_pose.0 = bevy_transform_to_enu_iso(transform);
    }
}

fn actuate_rigid_bodies(
    mut commands: Commands,
    mut query: Query<(
        Entity,
        &Transform,
        &mut LinearVelocity,
        &AngularVelocity,
        &ChassisParameters,
        &TickOutput,
    )>,
) {
    for (entity, transform, mut lin_vel, ang_vel, params, output) in &mut query {
        let world_forward_vector = transform.rotation * Vec3::X;
        let speed = lin_vel.dot(world_forward_vector) as f64;

        let push = drive_force(output, params);
        let resist = resistive_force(output, params);
        let net = net_longitudinal_force(speed, push, resist);
        if net == 0.0 && speed.abs() < STOP_SPEED {
            // Held by the brakes: drop the residual forward creep.
            lin_vel.0 -= world_forward_vector * speed as f32;
        }
        let force_vector = world_forward_vector * net as f32;

        let desired_yaw_rate = yaw_rate(speed, output.steer_angle(), params.wheelbase) as f32;
        let yaw_error = desired_yaw_rate - ang_vel.y;
        let torque_vector = Vec3::Y * yaw_error * MAX_YAW_TORQUE;

        commands.entity(entity).insert((
            ExternalForce::new(force_vector),
            ExternalTorque::new(torque_vector),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Translation3;
    use powertrain_core::messages::{WheelCommand, WheelSide};

    const DT: f64 = 1.0 / 50.0;

    fn params() -> ChassisParameters {
        ChassisParameters {
            mass: 1500.0,
            wheel_radius: 0.35,
            wheelbase: 2.8,
        }
    }

    fn output(motor: f64, brake: f64, steer: f64) -> TickOutput {
        let wheel = |axle, side, steer_angle, motor_torque| WheelCommand {
            axle,
            side,
            steer_angle,
            motor_torque,
            brake_torque: brake,
        };
        TickOutput {
            wheels: vec![
                wheel(0, WheelSide::Left, steer, 0.0),
                wheel(0, WheelSide::Right, steer, 0.0),
                wheel(1, WheelSide::Left, 0.0, motor / 2.0),
                wheel(1, WheelSide::Right, 0.0, motor / 2.0),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn resistance_never_pushes_a_body_at_rest() {
        assert_eq!(net_longitudinal_force(0.0, 100.0, 250.0), 0.0);
        assert_eq!(net_longitudinal_force(0.0, -100.0, 250.0), 0.0);
        assert_abs_diff_eq!(net_longitudinal_force(0.0, 400.0, 250.0), 150.0);
        assert_abs_diff_eq!(net_longitudinal_force(0.0, -400.0, 250.0), -150.0);
    }

    #[test]
    fn braking_stops_at_zero_without_reversing() {
        let mut speed = 1.0;
        for _ in 0..200 {
            speed = step_speed(speed, 0.0, 8000.0, 1500.0, DT);
            assert!(speed >= 0.0);
        }
        assert_eq!(speed, 0.0);
    }

    #[test]
    fn drive_torque_accelerates_the_point_mass() {
        let mut chassis = PointMassChassis::default();
        let mut pose = Isometry3::identity();
        let out = output(800.0, 0.0, 0.0);
        for _ in 0..50 {
            chassis.integrate(&mut pose, &out, &params(), DT);
        }
        // (800 / 0.35 - rolling) / 1500 for one second.
        let expected = (800.0 / 0.35 - ROLLING_RESISTANCE * 1500.0 * GRAVITY) / 1500.0;
        assert_abs_diff_eq!(chassis.speed, expected, epsilon = 1e-9);
        assert!(pose.translation.vector.x > 0.0);
        assert_abs_diff_eq!(pose.translation.vector.y, 0.0);
    }

    #[test]
    fn handbrake_holds_against_drive() {
        let mut chassis = PointMassChassis::default();
        let mut pose = Isometry3::identity();
        // Four wheels at 1000 N·m each far outweigh a small push.
        let out = output(300.0, 1000.0, 0.0);
        chassis.integrate(&mut pose, &out, &params(), DT);
        assert_eq!(chassis.speed, 0.0);
        assert_eq!(pose.translation.vector, Vector3::zeros());
    }

    #[test]
    fn steering_right_turns_clockwise() {
        assert!(yaw_rate(10.0, 20.0, 2.8) < 0.0);
        assert!(yaw_rate(10.0, -20.0, 2.8) > 0.0);
        assert!(yaw_rate(-10.0, 20.0, 2.8) > 0.0);
        assert_eq!(yaw_rate(0.0, 35.0, 2.8), 0.0);

        let mut chassis = PointMassChassis { speed: 10.0 };
        let mut pose = Isometry3::identity();
        chassis.integrate(&mut pose, &output(0.0, 0.0, 20.0), &params(), DT);
        let (_, _, yaw) = pose.rotation.euler_angles();
        assert!(yaw < 0.0);
        assert!(pose.translation.vector.y < 0.0);
    }

    #[test]
    fn uphill_grade_slows_a_coasting_body() {
        let mut flat = PointMassChassis { speed: 10.0 };
        let mut hill = PointMassChassis { speed: 10.0 };
        let mut flat_pose = Isometry3::identity();
        let mut hill_pose = Isometry3::from_parts(
            Translation3::identity(),
            // Negative pitch about y raises the nose in ENU.
            UnitQuaternion::from_euler_angles(0.0, -10f64.to_radians(), 0.0),
        );
        let coast = output(0.0, 0.0, 0.0);
        flat.integrate(&mut flat_pose, &coast, &params(), DT);
        hill.integrate(&mut hill_pose, &coast, &params(), DT);
        assert!(hill.speed < flat.speed);
        assert!(hill_pose.translation.vector.z > 0.0);
    }
}
