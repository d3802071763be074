// powertrain_sim/src/simulation/core/spawn_requests.rs
use crate::prelude::VehicleConfig;
use bevy::prelude::Component;

/// Carries a resolved vehicle description through the `SceneBuildSet` passes.
#[derive(Component, Clone)]
pub struct SpawnVehicleRequest(pub VehicleConfig);
