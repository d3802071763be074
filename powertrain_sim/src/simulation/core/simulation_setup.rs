// powertrain_sim/src/simulation/core/simulation_setup.rs

use crate::prelude::*;
use crate::simulation::config::ResolvedVehicles;
use crate::simulation::core::components::{BodyPose, SimulationClock};
use crate::simulation::core::spawn_requests::SpawnVehicleRequest;
use crate::simulation::core::transforms::enu_iso_to_bevy_transform;

pub struct SimulationSetupPlugin;

impl Plugin for SimulationSetupPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationClock>();

        // --- CONFIGURE THE SPAWNING PIPELINE ---
        // This chain of SystemSets guarantees the correct spawning order.
        app.configure_sets(
            OnEnter(AppState::SceneBuilding),
            (
                SceneBuildSet::CreateRequests,
                SceneBuildSet::ProcessVehicle,
                SceneBuildSet::Physics,
                SceneBuildSet::Cleanup,
            )
                .chain(),
        );

        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            (
                spawn_vehicle_shells.in_set(SceneBuildSet::CreateRequests),
                cleanup_spawn_requests.in_set(SceneBuildSet::Cleanup),
                transition_to_running
                    .in_set(SceneBuildSet::Cleanup)
                    .after(cleanup_spawn_requests),
            ),
        );

        // Configure the runtime schedule graph. Nothing ticks until the scene is built.
        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Precomputation,
                SimulationSet::Input,
                SimulationSet::Powertrain,
                SimulationSet::Actuation,
                SimulationSet::Telemetry,
            )
                .chain()
                .run_if(in_state(AppState::Running)),
        );

        app.add_systems(
            FixedUpdate,
            (
                advance_simulation_clock.in_set(SimulationSet::Precomputation),
                stop_after_duration.in_set(SimulationSet::Telemetry),
            ),
        );
    }
}

fn spawn_vehicle_shells(mut commands: Commands, resolved_vehicles: Res<ResolvedVehicles>) {
    for vehicle_config in &resolved_vehicles.0 {
        info!(
            "[SPAWN] Posting spawn request for resolved vehicle: {}",
            &vehicle_config.name
        );

        let start_isometry = vehicle_config.starting_pose.to_isometry();
        commands.spawn((
            Name::new(vehicle_config.name.clone()),
            BodyPose(start_isometry),
            enu_iso_to_bevy_transform(&start_isometry),
            SpawnVehicleRequest(vehicle_config.clone()),
        ));
    }
}

fn cleanup_spawn_requests(
    mut commands: Commands,
    query: Query<Entity, With<SpawnVehicleRequest>>,
) {
    info!("[CLEANUP] Removing spawn request components.");
    for entity in &query {
        commands.entity(entity).remove::<SpawnVehicleRequest>();
    }
}

/// Runs once at the end of the `OnEnter(SceneBuilding)` chain.
fn transition_to_running(mut next_state: ResMut<NextState<AppState>>) {
    info!("Scene building complete. Transitioning to Running state.");
    next_state.set(AppState::Running);
}

fn advance_simulation_clock(time: Res<Time>, mut clock: ResMut<SimulationClock>) {
    clock.elapsed += time.delta_secs_f64();
    clock.ticks += 1;
}

fn stop_after_duration(
    clock: Res<SimulationClock>,
    scenario: Res<ScenarioConfig>,
    mut exit: EventWriter<AppExit>,
) {
    let Some(duration) = scenario.simulation.duration_seconds else {
        return;
    };
    if clock.elapsed >= duration {
        info!(
            "Simulated {:.2} s over {} ticks. Stopping.",
            clock.elapsed, clock.ticks
        );
        exit.write(AppExit::Success);
    }
}
