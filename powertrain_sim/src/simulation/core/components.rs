// powertrain_sim/src/simulation/core/components.rs

use bevy::prelude::{Component, Resource};
use nalgebra::Isometry3;

use crate::simulation::config::ScriptStep;

/// World pose of a vehicle body in ENU, refreshed once per tick before the powertrain runs.
#[derive(Component, Debug, Clone, Copy)]
pub struct BodyPose(pub Isometry3<f64>);

/// Marks the vehicle that reads the keyboard.
#[derive(Component, Debug, Default)]
pub struct KeyboardControlled;

/// Timed driver inputs for one vehicle, consumed in order.
#[derive(Component, Debug, Clone, Default)]
pub struct DriverScript {
    pub steps: Vec<ScriptStep>,
    /// Index of the first step not yet applied.
    pub next: usize,
}

impl DriverScript {
    pub fn new(mut steps: Vec<ScriptStep>) -> Self {
        steps.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self { steps, next: 0 }
    }

    /// Returns the steps that became due at or before `elapsed` and advances past them.
    pub fn due(&mut self, elapsed: f64) -> &[ScriptStep] {
        let start = self.next;
        while self.next < self.steps.len() && self.steps[self.next].at <= elapsed {
            self.next += 1;
        }
        &self.steps[start..self.next]
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.steps.len()
    }
}

/// Simulated seconds since the scene entered `AppState::Running`.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct SimulationClock {
    pub elapsed: f64,
    pub ticks: u64,
}
