// powertrain_sim/src/prelude.rs

// Re-export the entire Bevy prelude for convenience.
pub use bevy::prelude::*;

// Re-export the powertrain_core prelude so the pure vehicle model is one import away.
pub use powertrain_core::prelude::*;

pub use crate::cli::Cli;
pub use crate::simulation::config::structs::*;
pub use crate::simulation::config::{ResolvedVehicles, ScenarioError};
pub use crate::simulation::core::app_state::{AppState, SceneBuildSet, SimulationSet};
pub use crate::simulation::core::spawn_requests::SpawnVehicleRequest;
pub use crate::PowertrainSimulationPlugin;
