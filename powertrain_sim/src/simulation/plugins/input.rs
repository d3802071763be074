// powertrain_sim/src/simulation/plugins/input.rs

//! Fills each vehicle's `DriverInput` mailbox, from the keyboard or from a
//! scripted timeline.
//!
//! Button flags are latched here and cleared by the powertrain once a tick has
//! seen them, so a release between two fixed steps is never lost.

use crate::{
    prelude::*,
    simulation::core::components::{DriverScript, KeyboardControlled, SimulationClock},
};

pub struct DriverInputPlugin {
    pub headless: bool,
}

impl Plugin for DriverInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            play_driver_scripts.in_set(SimulationSet::Input),
        );
        if !self.headless {
            app.add_systems(
                Update,
                keyboard_driver_input.run_if(in_state(AppState::Running)),
            );
        }
    }
}

/// Applies one scripted step on top of the current controls.
pub fn apply_script_step(input: &mut DriverInput, step: &ScriptStep) {
    if let Some(throttle) = step.throttle {
        input.throttle = throttle;
    }
    if let Some(steering) = step.steering {
        input.steering = steering;
    }
    for control in &step.press {
        match control {
            Control::Ignition => input.ignition_pressed = true,
            Control::Handbrake => input.handbrake_pressed = true,
            Control::Lights => input.lights_pressed = true,
        }
    }
}

fn play_driver_scripts(
    clock: Res<SimulationClock>,
    mut query: Query<(&Name, &mut DriverScript, &mut DriverInput)>,
) {
    for (name, mut script, mut input) in &mut query {
        for step in script.due(clock.elapsed) {
            debug!("[SCRIPT] '{}' at {:.2} s: {:?}", name, clock.elapsed, step);
            apply_script_step(&mut input, step);
        }
    }
}

/// W/S throttle, A/D steering, held. I, Space and L act on release.
fn keyboard_driver_input(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mut query: Query<&mut DriverInput, With<KeyboardControlled>>,
) {
    for mut input in &mut query {
        input.throttle = 0.0;
        input.steering = 0.0;

        if keyboard_input.pressed(KeyCode::KeyW) {
            input.throttle += 1.0;
        }
        if keyboard_input.pressed(KeyCode::KeyS) {
            input.throttle -= 1.0;
        }
        if keyboard_input.pressed(KeyCode::KeyA) {
            input.steering -= 1.0;
        }
        if keyboard_input.pressed(KeyCode::KeyD) {
            input.steering += 1.0;
        }

        if keyboard_input.just_released(KeyCode::KeyI) {
            input.ignition_pressed = true;
        }
        if keyboard_input.just_released(KeyCode::Space) {
            input.handbrake_pressed = true;
        }
        if keyboard_input.just_released(KeyCode::KeyL) {
            input.lights_pressed = true;
        }
    }
}
