// powertrain_sim/examples/01_full_pipeline.rs

//! A full end-to-end run of the powertrain simulation.
//!
//! This example demonstrates how to:
//! 1. Parse the command line into the `Cli` resource.
//! 2. Set up either a windowed Bevy app with avian3d physics, or a headless one.
//! 3. Add the main `PowertrainSimulationPlugin`, which loads the scenario,
//!    spawns the vehicles and ticks their powertrains.
//!
//! To run this example:
//! `cargo run --example 01_full_pipeline`
//! `cargo run --example 01_full_pipeline -- --headless --duration 30`
//!
//! Windowed controls: W/S throttle, A/D steer, I ignition, Space handbrake, L lights.

use std::time::Duration;

use avian3d::prelude::*;
use bevy::{app::ScheduleRunnerPlugin, log::LogPlugin, prelude::*, state::app::StatesPlugin};
use bevy::time::TimeUpdateStrategy;
use clap::Parser;

use powertrain_sim::cli::Cli;
use powertrain_sim::prelude::AppState;
use powertrain_sim::PowertrainSimulationPlugin;

/// A good filter for focusing on our crates' logs during development.
const LOG_FILTER: &str = "info,wgpu_core=error,wgpu_hal=error,powertrain_sim=debug,powertrain_core=debug";

fn main() -> AppExit {
    let cli = Cli::parse();
    let headless = cli.headless;

    let mut app = App::new();

    if headless {
        app.add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)),
            LogPlugin {
                level: bevy::log::Level::INFO,
                filter: LOG_FILTER.to_string(),
                ..default()
            },
            StatesPlugin,
        ))
        // Every update advances simulated time by one nominal tick, as fast as the CPU allows.
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(20)));
    } else {
        app.add_plugins(DefaultPlugins.set(LogPlugin {
            level: bevy::log::Level::INFO,
            filter: LOG_FILTER.to_string(),
            ..default()
        }))
        // The Avian3D physics plugins.
        .add_plugins(PhysicsPlugins::default());
    }

    app.insert_resource(cli);
    app.init_state::<AppState>();

    app.add_plugins(PowertrainSimulationPlugin { headless });

    info!("Starting powertrain simulation (headless: {}).", headless);
    app.run()
}
