// powertrain_sim/src/simulation/plugins/world/spawner.rs

use crate::prelude::*;
use crate::simulation::core::components::KeyboardControlled;
use avian3d::prelude::*;

/// Side length of the square test pad, meters.
const GROUND_SIZE: f32 = 2000.0;

/// Ground, light and a chase camera. Windowed runs only.
pub struct WorldSpawnerPlugin;

impl Plugin for WorldSpawnerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            (
                spawn_lighting_and_camera,
                spawn_ground.in_set(SceneBuildSet::Physics),
            ),
        )
        .add_systems(
            Update,
            follow_driven_vehicle.run_if(in_state(AppState::Running)),
        );
    }
}

#[derive(Component)]
struct ChaseCamera;

fn spawn_lighting_and_camera(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 15_000.0,
            ..default()
        },
        Transform::from_xyz(0.0, 50.0, 0.0).looking_at(Vec3::new(10.0, 0.0, -10.0), Vec3::Y),
    ));

    let camera_transform = Transform::from_xyz(-15.0, 8.0, 0.0).looking_at(Vec3::ZERO, Vec3::Y);
    commands.spawn((ChaseCamera, Camera3d::default(), camera_transform));
}

fn spawn_ground(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    info!("[SCENE] Spawning {} m test pad.", GROUND_SIZE);
    commands.spawn((
        Name::new("Ground"),
        RigidBody::Static,
        Collider::cuboid(GROUND_SIZE, 0.2, GROUND_SIZE),
        Friction::new(0.05),
        Mesh3d(meshes.add(Cuboid::new(GROUND_SIZE, 0.2, GROUND_SIZE))),
        MeshMaterial3d(materials.add(Color::srgb(0.35, 0.4, 0.35))),
        // Top face at y = 0.
        Transform::from_xyz(0.0, -0.1, 0.0),
    ));
}

/// Keeps the camera behind whichever vehicle the keyboard drives (or the first vehicle).
fn follow_driven_vehicle(
    vehicles: Query<(&Transform, Has<KeyboardControlled>), (With<VehicleSim>, Without<ChaseCamera>)>,
    mut cameras: Query<&mut Transform, With<ChaseCamera>>,
) {
    let Some((target, _)) = vehicles.iter().max_by_key(|(_, keyboard)| *keyboard) else {
        return;
    };
    let Ok(mut camera) = cameras.single_mut() else {
        return;
    };
    let behind = target.rotation * Vec3::new(-15.0, 0.0, 0.0);
    let desired = target.translation + Vec3::new(behind.x, 8.0, behind.z);
    camera.translation = camera.translation.lerp(desired, 0.1);
    camera.look_at(target.translation, Vec3::Y);
}
