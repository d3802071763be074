// powertrain_sim/src/lib.rs

use bevy::prelude::*;

use crate::simulation::config::ConfigPlugin;
use crate::simulation::core::simulation_setup::SimulationSetupPlugin;
use crate::simulation::plugins::dashboard::DashboardPlugin;
use crate::simulation::plugins::input::DriverInputPlugin;
use crate::simulation::plugins::vehicles::chassis::ChassisPlugin;
use crate::simulation::plugins::vehicles::powertrain::PowertrainPlugin;
use crate::simulation::plugins::world::spawner::WorldSpawnerPlugin;

// This prelude is for convenience for other files WITHIN the powertrain_sim crate.
pub mod prelude;

pub mod cli;
pub mod simulation;

/// The main plugin that brings together all the simulation parts.
///
/// Expects `AppState` to be initialised and a [`cli::Cli`] resource to be present.
/// Headless runs skip everything that needs a window, a renderer or avian3d.
pub struct PowertrainSimulationPlugin {
    pub headless: bool,
}

impl Plugin for PowertrainSimulationPlugin {
    fn build(&self, app: &mut App) {
        let headless = self.headless;
        app.add_plugins((
            // Catalog + scenario loading, then the move to SceneBuilding.
            ConfigPlugin,
            // Spawns vehicle shells, orders the build passes and the tick.
            SimulationSetupPlugin,
            PowertrainPlugin,
            ChassisPlugin { headless },
            DriverInputPlugin { headless },
            DashboardPlugin { headless },
        ));
        if !headless {
            app.add_plugins(WorldSpawnerPlugin);
        }
    }
}
