//! Driving scenario integration tests
//!
//! Drives `VehicleSim` through tick sequences using only the public API.

use approx::assert_abs_diff_eq;
use nalgebra::Vector3;
use powertrain_core::prelude::*;
use powertrain_core::types::MPS_TO_MPH;
use powertrain_core::vehicle::{HANDBRAKE_TORQUE, IDLE_RPM, NEUTRAL_MOTOR_TORQUE};

const DT: f64 = 1.0 / 50.0;

/// Tracks a pose moving along +x so tests can feed consistent motion.
struct Track {
    pose: VehiclePose,
}

impl Track {
    fn new() -> Self {
        Self {
            pose: VehiclePose::default(),
        }
    }

    /// Advances at `mph` (negative for backward) for one tick and returns the new pose.
    fn step(&mut self, mph: f64) -> VehiclePose {
        self.pose.position += Vector3::x() * (mph / MPS_TO_MPH * DT);
        self.pose
    }
}

fn parked() -> VehicleSim {
    VehicleSim::assemble(&VehicleSpec::default(), &VehiclePose::default()).unwrap()
}

fn press(f: impl FnOnce(&mut DriverInput)) -> DriverInput {
    let mut input = DriverInput::default();
    f(&mut input);
    input
}

fn start_engine(sim: &mut VehicleSim, track: &mut Track) {
    sim.tick(&press(|i| i.ignition_pressed = true), &track.step(0.0), DT);
    sim.tick(&press(|i| i.handbrake_pressed = true), &track.step(0.0), DT);
    assert!(sim.state().engine_running);
    assert!(!sim.state().handbrake_engaged);
}

#[test]
fn test_vehicle_starts_parked() {
    let sim = parked();
    let state = sim.state();
    assert!(!state.engine_running);
    assert!(state.handbrake_engaged);
    assert_eq!(state.current_gear, Gear::Neutral);
    assert!(sim
        .last_output()
        .wheels
        .iter()
        .all(|w| w.brake_torque == HANDBRAKE_TORQUE));
}

#[test]
fn test_ignition_starts_engine_and_rpm_climbs_to_idle() {
    let mut sim = parked();
    let mut track = Track::new();
    sim.tick(&press(|i| i.ignition_pressed = true), &track.step(0.0), DT);
    assert!(sim.state().engine_running);
    assert_abs_diff_eq!(sim.state().engine_rpm, 100.0);

    for _ in 0..20 {
        sim.tick(&DriverInput::default(), &track.step(0.0), DT);
    }
    assert_abs_diff_eq!(sim.state().engine_rpm, IDLE_RPM);

    sim.tick(&press(|i| i.ignition_pressed = true), &track.step(0.0), DT);
    assert!(!sim.state().engine_running);
    assert_eq!(sim.state().engine_rpm, 0.0);
}

#[test]
fn test_empty_tank_prevents_start() {
    let mut spec = VehicleSpec::default();
    spec.fuel_tank.level = Some(0.0);
    let mut sim = VehicleSim::assemble(&spec, &VehiclePose::default()).unwrap();
    sim.tick(
        &press(|i| i.ignition_pressed = true),
        &VehiclePose::default(),
        DT,
    );
    assert!(!sim.state().engine_running);
}

#[test]
fn test_wrong_fluid_in_tank_prevents_start() {
    let mut spec = VehicleSpec::default();
    spec.fuel_tank.fluid = FluidKind::Water;
    let mut sim = VehicleSim::assemble(&spec, &VehiclePose::default()).unwrap();
    sim.tick(
        &press(|i| i.ignition_pressed = true),
        &VehiclePose::default(),
        DT,
    );
    assert!(!sim.state().engine_running);
}

#[test]
fn test_running_out_of_fuel_stops_engine_within_one_tick() {
    let mut sim = parked();
    let mut track = Track::new();
    start_engine(&mut sim, &mut track);
    for _ in 0..100 {
        sim.tick(&press(|i| i.throttle = 1.0), &track.step(10.0), DT);
    }
    assert!(sim.state().engine_running);

    sim.fuel_tank_mut().remove(f64::MAX);
    sim.tick(&press(|i| i.throttle = 1.0), &track.step(10.0), DT);

    let state = sim.state();
    assert!(!state.engine_running);
    assert_eq!(state.engine_rpm, 0.0);
    assert_eq!(state.current_gear, Gear::Neutral);
}

#[test]
fn test_draining_oil_stops_engine() {
    let mut sim = parked();
    let mut track = Track::new();
    start_engine(&mut sim, &mut track);
    sim.engine_mut().oil_mut().remove(100.0);
    sim.tick(&DriverInput::default(), &track.step(0.0), DT);
    assert!(!sim.state().engine_running);
}

#[test]
fn test_forward_throttle_engages_first_and_drives_wheels() {
    let mut sim = parked();
    let mut track = Track::new();
    start_engine(&mut sim, &mut track);
    for _ in 0..10 {
        sim.tick(&DriverInput::default(), &track.step(0.0), DT);
    }

    let out = sim.tick(&press(|i| i.throttle = 1.0), &track.step(0.0), DT);
    assert_eq!(sim.state().current_gear, Gear::FIRST);
    assert!(sim.state().gearbox_torque > 0.0);

    let driven: Vec<_> = out.wheels.iter().filter(|w| w.motor_torque != 0.0).collect();
    assert_eq!(driven.len(), 2);
    for w in &driven {
        assert_abs_diff_eq!(w.motor_torque, sim.state().gearbox_torque / 2.0, epsilon = 1e-9);
    }
    assert_eq!(out.total_brake_torque(), 0.0);
}

#[test]
fn test_reverse_throttle_from_rest_selects_reverse_with_negative_torque() {
    let mut sim = parked();
    let mut track = Track::new();
    start_engine(&mut sim, &mut track);
    for _ in 0..10 {
        sim.tick(&DriverInput::default(), &track.step(0.0), DT);
    }
    let out = sim.tick(&press(|i| i.throttle = -1.0), &track.step(0.0), DT);
    assert_eq!(sim.state().current_gear, Gear::Reverse);
    assert!(out.total_motor_torque() < 0.0);
}

#[test]
fn test_reverse_lamps_follow_backward_motion() {
    let mut sim = parked();
    let mut track = Track::new();
    start_engine(&mut sim, &mut track);

    let out = sim.tick(&press(|i| i.throttle = -0.5), &track.step(-3.0), DT);
    assert!(out.lights.taillight_secondary);
    assert_eq!(sim.state().current_gear, Gear::Reverse);
    assert_eq!(sim.state().movement, MovementDirection::Backward);

    // Forward throttle while still rolling back: lamps off, first gear, brakes on.
    let out = sim.tick(&press(|i| i.throttle = 0.5), &track.step(-3.0), DT);
    assert!(!out.lights.taillight_secondary);
    assert!(out.lights.taillight_tertiary);
    assert_eq!(sim.state().current_gear, Gear::FIRST);
    assert_abs_diff_eq!(out.wheels[0].brake_torque, 500.0);
}

#[test]
fn test_handbrake_toggle() {
    let mut sim = parked();
    let mut track = Track::new();
    start_engine(&mut sim, &mut track);
    sim.tick(&press(|i| i.throttle = 0.3), &track.step(0.0), DT);
    assert_eq!(sim.state().current_gear, Gear::FIRST);

    let out = sim.tick(&press(|i| i.handbrake_pressed = true), &track.step(0.0), DT);
    assert!(sim.state().handbrake_engaged);
    assert_eq!(sim.state().current_gear, Gear::Neutral);
    assert!(out.wheels.iter().all(|w| w.brake_torque == HANDBRAKE_TORQUE));
    assert!(out
        .wheels
        .iter()
        .filter(|w| w.motor_torque != 0.0)
        .all(|w| w.motor_torque == NEUTRAL_MOTOR_TORQUE));
}

#[test]
fn test_light_button_cycles_and_backlights_follow() {
    let mut sim = parked();
    let lights = press(|i| i.lights_pressed = true);
    let pose = VehiclePose::default();

    let out = sim.tick(&lights, &pose, DT);
    assert!(out.lights.headlight_primary && !out.lights.headlight_secondary);
    assert!(out.gauges.backlight);

    let out = sim.tick(&lights, &pose, DT);
    assert!(out.lights.headlight_secondary);

    let out = sim.tick(&lights, &pose, DT);
    assert_eq!(out.lights, LightSignals::default());
    assert!(!out.gauges.backlight);
}

#[test]
fn test_gauges_and_odometer_while_driving() {
    let mut sim = parked();
    let mut track = Track::new();
    start_engine(&mut sim, &mut track);

    let mut travelled = 0.0;
    for _ in 0..500 {
        let out = sim.tick(&press(|i| i.throttle = 0.8), &track.step(30.0), DT);
        travelled += out.odometer_delta;
        let g = out.gauges;
        for reading in [g.tachometer, g.speedometer, g.fuel, g.thermometer] {
            assert!((0.0..=1.0).contains(&reading));
        }
    }
    assert_abs_diff_eq!(sim.state().odometer, travelled, epsilon = 1e-12);
    assert_abs_diff_eq!(travelled, 30.0 * 500.0 * DT / 3600.0, epsilon = 1e-9);
    assert_abs_diff_eq!(sim.last_output().gauges.speedometer, 30.0 / 120.0, epsilon = 1e-9);
    assert!(sim.fuel_tank().level() < sim.fuel_tank().capacity());
}

#[test]
fn test_steering_applies_to_steering_axle_only() {
    let mut sim = parked();
    let out = sim.tick(
        &press(|i| i.steering = -0.5),
        &VehiclePose::default(),
        DT,
    );
    for w in &out.wheels {
        let expected = if sim.chassis().axles[w.axle].steering {
            -17.5
        } else {
            0.0
        };
        assert_abs_diff_eq!(w.steer_angle, expected);
    }
    assert_abs_diff_eq!(out.steer_angle(), -17.5);
}

#[test]
fn test_gear_stays_inside_table_on_long_drive() {
    let mut sim = parked();
    let mut track = Track::new();
    start_engine(&mut sim, &mut track);
    let top = sim.transmission().top_gear().index();
    let mut mph = 0.0;
    for tick in 0..3000 {
        // Accelerate, then coast down.
        mph = if tick < 2000 { (mph + 0.1_f64).min(110.0) } else { (mph - 0.2_f64).max(0.0) };
        let throttle = if tick < 2000 { 1.0 } else { 0.0 };
        sim.tick(&press(|i| i.throttle = throttle), &track.step(mph), DT);
        assert!(sim.state().current_gear.index() <= top);
    }
}
