// powertrain_sim/src/simulation/core/app_state.rs

use bevy::{ecs::schedule::SystemSet, prelude::States};

/// Defines the major phases of the application's lifecycle.
#[derive(States, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    /// The initial state. Catalog and scenario are read here.
    #[default]
    AssetLoading,

    /// Configuration is resolved. Vehicle entities are being spawned.
    SceneBuilding,

    /// The scene is built. The powertrain ticks in `FixedUpdate`.
    Running,
}

/// System sets to control the order of execution during the SceneBuilding state.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneBuildSet {
    /// Pass 1: Create vehicle shells and attach the request component.
    CreateRequests,

    /// Pass 2: Assemble the powertrain and driver components.
    ProcessVehicle,

    /// Pass 3: Attach the physical body (avian rigid body or point-mass chassis).
    Physics,

    /// Pass 4: Remove all temporary request components.
    Cleanup,
}

// =========================================================================
// == Main Simulation Sets ==
// =========================================================================

/// Per-tick data flow inside `FixedUpdate`. Chained in declaration order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Refresh each vehicle's `BodyPose` from the physics body.
    Precomputation,
    /// Driver scripts write this tick's `DriverInput`.
    Input,
    /// `VehicleSim::tick` for every vehicle.
    Powertrain,
    /// Turn wheel commands into forces on the body.
    Actuation,
    /// Dashboards and log output.
    Telemetry,
}
