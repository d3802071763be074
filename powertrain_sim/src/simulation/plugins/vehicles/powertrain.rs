// powertrain_sim/src/simulation/plugins/vehicles/powertrain.rs

use crate::{
    prelude::*,
    simulation::core::components::{BodyPose, DriverScript, KeyboardControlled},
};

// --- THE PLUGIN ---
pub struct PowertrainPlugin;

impl Plugin for PowertrainPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            process_powertrain_logic.in_set(SceneBuildSet::ProcessVehicle),
        )
        .add_systems(
            FixedUpdate,
            tick_powertrains.in_set(SimulationSet::Powertrain),
        );
    }
}

// --- SYSTEMS ---

/// SPAWNING (LOGIC): Assembles the powertrain and attaches the driver mailbox.
fn process_powertrain_logic(
    mut commands: Commands,
    request_query: Query<(Entity, &SpawnVehicleRequest, &BodyPose)>,
) {
    for (entity, request, body_pose) in &request_query {
        let config = &request.0;
        let pose = VehiclePose::from_isometry(&body_pose.0);

        let sim = match VehicleSim::assemble(&config.vehicle, &pose) {
            Ok(sim) => sim,
            Err(e) => {
                error!("[SPAWN] Vehicle '{}' failed to assemble: {}", config.name, e);
                commands.entity(entity).despawn();
                continue;
            }
        };
        info!(
            "[SPAWN] Assembled powertrain for '{}': top gear {}, {} driven wheels.",
            config.name,
            sim.transmission().top_gear(),
            sim.chassis().driven_wheels()
        );

        let output = sim.last_output().clone();
        let mut entity_commands = commands.entity(entity);
        entity_commands.insert((sim, DriverInput::default(), output));
        if config.keyboard {
            entity_commands.insert(KeyboardControlled);
        }
        if !config.script.is_empty() {
            entity_commands.insert(DriverScript::new(config.script.clone()));
        }
    }
}

/// RUNTIME: Advances every powertrain by one fixed step.
fn tick_powertrains(
    time: Res<Time>,
    mut query: Query<(
        &Name,
        &BodyPose,
        &mut VehicleSim,
        &mut DriverInput,
        &mut TickOutput,
    )>,
) {
    let dt = time.delta_secs_f64();
    for (name, body_pose, mut sim, mut input, mut output) in &mut query {
        let _span = info_span!("vehicle", name = %name).entered();

        let pose = VehiclePose::from_isometry(&body_pose.0);
        *output = sim.tick(&input, &pose, dt);
        // Button presses are consumed by exactly one tick.
        input.clear_edges();
    }
}
