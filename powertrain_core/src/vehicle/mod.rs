// powertrain_core/src/vehicle/mod.rs

//! The per-tick vehicle orchestrator.
//!
//! [`VehicleSim`] owns every sub-model of one vehicle and advances them together
//! once per fixed tick. All increments (RPM steps, temperature steps) are per
//! tick and assume the nominal 50 Hz rate; `dt` only enters the conversion from
//! displacement to speed and distance.

pub mod lighting;
pub mod state;

use tracing::{debug, info, warn};

use crate::config::{AxleSpec, ChassisSpec, InstrumentSpec, VehicleSpec};
use crate::error::ConfigError;
use crate::messages::{DriverInput, GaugeReadings, TickOutput, WheelCommand, WheelSide};
use crate::models::engine::EngineModel;
use crate::models::fluid::{FluidKind, FluidReservoir};
use crate::models::radiator::RadiatorModel;
use crate::models::transmission::{Gear, TransmissionModel};
use crate::types::{MovementDirection, VehiclePose, MPS_TO_MPH, SECONDS_PER_HOUR};

pub use self::lighting::{HeadlampMode, LightingState};
pub use self::state::{VehicleSimState, HANDBRAKE_TORQUE};

// --- Operating constants ---
pub const NOMINAL_TICK_RATE_HZ: f64 = 50.0;
pub const IDLE_RPM: f64 = 1000.0;
/// RPM gained per tick while climbing to idle.
pub const IDLE_RPM_STEP: f64 = 100.0;
/// RPM gained per tick, at full engine load, while climbing to a throttle target.
pub const THROTTLE_RPM_STEP: f64 = 5.0;
/// RPM lost per tick with the throttle released.
pub const RPM_DECAY_STEP: f64 = 65.0;
/// Tilt, in degrees, at which the engine load reaches zero.
pub const MAX_LOAD_TILT_DEGREES: f64 = 30.0;
/// Engine temperature (°F) above which output is derated.
pub const OVERHEAT_THRESHOLD: f64 = 230.0;
/// Degrees above the threshold at which output reaches zero.
pub const OVERHEAT_SPAN: f64 = 10.0;
/// Temperature at which the radiator effect starts showing on a cooling engine.
pub const RADIATOR_EFFECT_THRESHOLD: f64 = 200.0;
/// Temperature ceiling used when there is no radiator.
pub const NO_RADIATOR_CEILING: f64 = 1000.0;
pub const HEAT_RATE_WITH_RADIATOR: f64 = 0.2;
pub const HEAT_RATE_WITHOUT_RADIATOR: f64 = 5.0;
pub const COOLING_STEP: f64 = 0.1;
/// Brake torque per unit of opposing throttle, N·m.
pub const SERVICE_BRAKE_TORQUE: f64 = 1000.0;
/// Motor torque held on driven wheels in neutral. Exact zero keeps some
/// physics solvers from letting the wheel roll freely.
pub const NEUTRAL_MOTOR_TORQUE: f64 = 1e-5;
const SHIFT_UP_SPEED_FRACTION: f64 = 0.8;
const SHIFT_DOWN_SPEED_FRACTION: f64 = 0.6;
const TOP_SPEED_COEFFICIENT_BASE: f64 = 1.5;
const TOP_SPEED_COEFFICIENT_GAIN: f64 = 2.2;
const CEILING_SPEED_DISCOUNT: f64 = 10.0;

/// One vehicle's powertrain and thermal simulation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "bevy", derive(bevy_ecs::component::Component))]
pub struct VehicleSim {
    engine: EngineModel,
    transmission: TransmissionModel,
    fuel_tank: FluidReservoir,
    radiator: Option<RadiatorModel>,
    chassis: ChassisSpec,
    instruments: InstrumentSpec,
    state: VehicleSimState,
    last_output: TickOutput,
    reported_dt_mismatch: bool,
}

impl VehicleSim {
    /// Builds every sub-model from its description and parks the vehicle at `pose`.
    pub fn assemble(spec: &VehicleSpec, pose: &VehiclePose) -> Result<Self, ConfigError> {
        let engine = EngineModel::new(&spec.engine)?;
        let transmission = TransmissionModel::new(&spec.transmission)?;
        let fuel_tank = spec.fuel_tank.build("fuel tank")?;
        let radiator = spec.radiator.as_ref().map(RadiatorModel::new).transpose()?;

        spec.chassis.validate()?;
        spec.instruments.validate()?;
        if !(spec.ambient_temperature > 0.0) {
            return Err(ConfigError::NonPositiveAmbientTemperature(
                spec.ambient_temperature,
            ));
        }

        let state = VehicleSimState::parked(
            pose,
            spec.ambient_temperature,
            spec.initial_engine_temperature,
        );
        let mut sim = Self {
            engine,
            transmission,
            fuel_tank,
            radiator,
            chassis: spec.chassis.clone(),
            instruments: spec.instruments.clone(),
            state,
            last_output: TickOutput::default(),
            reported_dt_mismatch: false,
        };
        sim.last_output = sim.output(0.0, 0.0);
        Ok(sim)
    }

    // --- Accessors ---

    pub fn state(&self) -> &VehicleSimState {
        &self.state
    }

    pub fn engine(&self) -> &EngineModel {
        &self.engine
    }

    /// Mutable access for topping up or draining the oil sump.
    pub fn engine_mut(&mut self) -> &mut EngineModel {
        &mut self.engine
    }

    pub fn transmission(&self) -> &TransmissionModel {
        &self.transmission
    }

    pub fn fuel_tank(&self) -> &FluidReservoir {
        &self.fuel_tank
    }

    pub fn fuel_tank_mut(&mut self) -> &mut FluidReservoir {
        &mut self.fuel_tank
    }

    pub fn radiator(&self) -> Option<&RadiatorModel> {
        self.radiator.as_ref()
    }

    pub fn radiator_mut(&mut self) -> Option<&mut RadiatorModel> {
        self.radiator.as_mut()
    }

    pub fn chassis(&self) -> &ChassisSpec {
        &self.chassis
    }

    pub fn last_output(&self) -> &TickOutput {
        &self.last_output
    }

    /// Fuel in the tank and oil in the sump.
    pub fn can_run(&self) -> bool {
        self.fuel_tank.holds(FluidKind::Fuel) && self.engine.is_lubricated()
    }

    // =========================================================================
    // == Tick ==
    // =========================================================================

    /// Advances the vehicle by one fixed tick.
    ///
    /// A non-finite or non-positive `dt` skips the tick and returns the previous output.
    pub fn tick(&mut self, input: &DriverInput, pose: &VehiclePose, dt: f64) -> TickOutput {
        if !(dt.is_finite() && dt > 0.0) {
            warn!(dt, "skipping vehicle tick with invalid time step");
            return self.last_output.clone();
        }
        if !self.reported_dt_mismatch && (dt * NOMINAL_TICK_RATE_HZ - 1.0).abs() > 1e-6 {
            debug!(
                dt,
                "time step differs from the nominal {} Hz; per-tick rates are unscaled",
                NOMINAL_TICK_RATE_HZ
            );
            self.reported_dt_mismatch = true;
        }

        let throttle = input.throttle();

        // Motion along the previous tick's forward axis.
        let delta = pose.position - self.state.prev_position;
        let projected = self.state.forward_vector.dot(&delta);
        self.state.movement = MovementDirection::classify(projected);
        self.state.forward_vector = pose.forward;
        self.state.prev_position = pose.position;

        self.state.prev_speed = self.state.current_speed;
        self.state.current_speed = projected.abs() / dt * MPS_TO_MPH;

        let distance = self.state.current_speed / SECONDS_PER_HOUR * dt;
        self.state.odometer += distance;
        self.consume_fluids(distance);

        if !self.can_run() {
            if self.state.engine_running {
                warn!("engine starved of fuel or oil, shutting down");
            }
            self.state.engine_running = false;
            self.state.engine_rpm = 0.0;
            self.state.current_gear = Gear::Neutral;
        }

        self.handle_controls(input, throttle);

        if self.state.engine_running {
            self.run_engine(throttle, pose.tilt_degrees());
        } else {
            self.rest_engine();
        }
        self.update_radiator_effect();

        let output = self.output(input.steering(), distance);
        self.last_output = output.clone();
        output
    }

    fn consume_fluids(&mut self, distance: f64) {
        let rpm = self.state.engine_rpm;
        let engine = &mut self.engine;
        self.fuel_tank
            .remove((distance / engine.mileage) * (rpm / engine.peak_rpm));
        let oil_used = (distance / engine.oil_mileage) * (rpm / engine.max_rpm);
        let coolant_used = (distance / engine.coolant_mileage) * (rpm / engine.max_rpm);
        engine.oil_mut().remove(oil_used);
        if let Some(radiator) = self.radiator.as_mut() {
            radiator.coolant_mut().remove(coolant_used);
        }
    }

    /// Edge-triggered buttons and the reverse lamps.
    fn handle_controls(&mut self, input: &DriverInput, throttle: f64) {
        let state = &mut self.state;

        if input.lights_pressed {
            state.lighting.toggle_headlamps();
            debug!(mode = ?state.lighting.headlamps, "headlamps switched");
        }

        if throttle < 0.0
            && state.movement == MovementDirection::Backward
            && !state.lighting.reverse
        {
            state.lighting.reverse = true;
            state.current_gear = Gear::Reverse;
        } else if state.lighting.reverse && throttle > 0.0 {
            state.lighting.reverse = false;
            state.current_gear = Gear::FIRST;
        }

        if input.handbrake_pressed {
            if state.handbrake_engaged {
                state.handbrake_engaged = false;
                state.brake_torque = 0.0;
            } else {
                state.handbrake_engaged = true;
                state.brake_torque = HANDBRAKE_TORQUE;
                state.current_gear = Gear::Neutral;
            }
        }

        if input.ignition_pressed {
            if state.engine_running {
                info!("ignition off");
                state.engine_running = false;
                state.engine_rpm = 0.0;
                state.current_gear = Gear::Neutral;
            } else if self.fuel_tank.holds(FluidKind::Fuel) && self.engine.is_lubricated() {
                info!("ignition on");
                state.engine_running = true;
            } else {
                info!("ignition pressed but the engine cannot run");
            }
        }
    }

    fn run_engine(&mut self, throttle: f64, tilt_degrees: f64) {
        let engine = &self.engine;
        let transmission = &self.transmission;
        let state = &mut self.state;

        // Service brakes while driving against the direction of travel.
        if !state.handbrake_engaged {
            if throttle > 0.0 {
                if state.movement == MovementDirection::Backward {
                    state.brake_torque = SERVICE_BRAKE_TORQUE * throttle;
                    state.lighting.brake = true;
                } else {
                    state.brake_torque = 0.0;
                    state.lighting.brake = false;
                }
            } else if throttle < 0.0 {
                if state.movement == MovementDirection::Forward {
                    state.brake_torque = SERVICE_BRAKE_TORQUE * -throttle;
                    state.lighting.brake = true;
                } else {
                    state.brake_torque = 0.0;
                    state.lighting.brake = false;
                    state.current_gear = Gear::Reverse;
                }
            }
        }

        if state.current_gear == Gear::Neutral {
            if throttle > 0.0 {
                state.current_gear = Gear::FIRST;
            } else if throttle < 0.0 {
                state.current_gear = Gear::Reverse;
            }
        }

        state.engine_load = 1.0 - tilt_degrees.min(MAX_LOAD_TILT_DEGREES) / MAX_LOAD_TILT_DEGREES;

        // RPM integration.
        let target_rpm = if throttle == 0.0 {
            IDLE_RPM
        } else {
            engine.max_rpm * throttle.abs()
        };
        if state.engine_rpm < target_rpm {
            let step = if throttle == 0.0 {
                IDLE_RPM_STEP
            } else {
                THROTTLE_RPM_STEP * state.engine_load
            };
            state.engine_rpm = (state.engine_rpm + step).min(target_rpm);
        } else if throttle == 0.0 {
            state.engine_rpm = (state.engine_rpm - RPM_DECAY_STEP).max(IDLE_RPM);
        }

        // Temperature.
        let (ceiling, heat_rate) = match &self.radiator {
            Some(radiator) => (
                radiator.min_temperature()
                    - CEILING_SPEED_DISCOUNT
                        * (state.current_speed / transmission.top_speed_of_top_gear()),
                HEAT_RATE_WITH_RADIATOR,
            ),
            None => (NO_RADIATOR_CEILING, HEAT_RATE_WITHOUT_RADIATOR),
        };
        state.thermal_ceiling = Some(ceiling);
        if state.engine_temperature < ceiling {
            state.engine_temperature +=
                heat_rate * (state.engine_rpm / engine.max_rpm) * (1.0 - state.engine_load);
        } else {
            state.engine_temperature -= COOLING_STEP;
        }

        // Automatic gear changes.
        let gear = state.current_gear;
        if state.engine_rpm > engine.peak_rpm
            && state.current_speed > transmission.top_speed(gear) * SHIFT_UP_SPEED_FRACTION
            && state.current_speed > state.prev_speed
        {
            if let Some(next) = transmission.next_gear(gear) {
                state.engine_rpm *= state.current_speed / transmission.top_speed(next);
                state.current_gear = next;
                debug!(from = %gear, to = %next, rpm = state.engine_rpm, "shift up");
            }
        }
        let gear = state.current_gear;
        if let Some(previous) = transmission.previous_gear(gear) {
            if state.current_speed < transmission.top_speed(gear) * SHIFT_DOWN_SPEED_FRACTION
                && state.current_speed < state.prev_speed
            {
                state.engine_rpm *= state.current_speed / transmission.top_speed(gear);
                state.current_gear = previous;
                debug!(from = %gear, to = %previous, rpm = state.engine_rpm, "shift down");
            }
        }
        if state.current_gear == Gear::FIRST
            && state.movement == MovementDirection::Forward
            && throttle < 0.0
        {
            state.current_gear = Gear::Reverse;
        }

        // Overheat derate and stall.
        let derate = (1.0 - (state.engine_temperature - OVERHEAT_THRESHOLD) / OVERHEAT_SPAN)
            .clamp(0.0, 1.0);
        state.true_engine_rpm = state.engine_rpm * derate;
        if state.engine_temperature > OVERHEAT_THRESHOLD && state.true_engine_rpm < engine.min_rpm {
            warn!(
                temperature = state.engine_temperature,
                true_rpm = state.true_engine_rpm,
                "engine overheated and stalled"
            );
            state.engine_running = false;
            state.engine_rpm = 0.0;
            state.engine_torque = 0.0;
            state.gearbox_torque = 0.0;
            return;
        }

        // Torque.
        let gear = state.current_gear;
        state.engine_torque = engine.torque_nm(state.true_engine_rpm);
        let gear_top_speed = transmission.top_speed(gear);
        let top_speed_coefficient =
            TOP_SPEED_COEFFICIENT_BASE - state.current_speed / gear_top_speed;
        let transmission_speed_coefficient = if gear == Gear::Neutral {
            0.0
        } else {
            (top_speed_coefficient * TOP_SPEED_COEFFICIENT_GAIN
                - state.current_speed / gear_top_speed)
                * (state.engine_rpm / engine.max_rpm)
        };
        state.gearbox_torque = transmission.ratio(gear)
            * state.engine_torque
            * state.engine_load
            * transmission_speed_coefficient;
    }

    fn rest_engine(&mut self) {
        let state = &mut self.state;
        if state.engine_temperature > state.ambient_temperature {
            let step = COOLING_STEP * (state.engine_temperature / state.ambient_temperature);
            state.engine_temperature = (state.engine_temperature - step).max(state.ambient_temperature);
        }
        state.true_engine_rpm = (state.true_engine_rpm - RPM_DECAY_STEP).max(0.0);
        state.engine_torque = 0.0;
        state.gearbox_torque = 0.0;
    }

    fn update_radiator_effect(&mut self) {
        let Some(radiator) = self.radiator.as_mut() else {
            return;
        };
        let temperature = self.state.engine_temperature;
        if self.state.engine_running && temperature > OVERHEAT_THRESHOLD {
            radiator.activate_overheat_effect();
            radiator.set_intensity((temperature - OVERHEAT_THRESHOLD) / OVERHEAT_SPAN);
        } else if temperature > RADIATOR_EFFECT_THRESHOLD {
            radiator.set_intensity(
                (temperature - RADIATOR_EFFECT_THRESHOLD)
                    / (OVERHEAT_THRESHOLD + OVERHEAT_SPAN - RADIATOR_EFFECT_THRESHOLD),
            );
        } else {
            radiator.deactivate_overheat_effect();
        }
    }

    // =========================================================================
    // == Output ==
    // =========================================================================

    fn output(&self, steering: f64, odometer_delta: f64) -> TickOutput {
        let state = &self.state;
        let motor_torque_per_wheel = if state.current_gear == Gear::Neutral {
            NEUTRAL_MOTOR_TORQUE
        } else {
            state.gearbox_torque / self.chassis.driven_wheels() as f64
        };
        let steer_angle = self.chassis.max_steering_angle * steering;

        let wheels = self
            .chassis
            .axles
            .iter()
            .enumerate()
            .flat_map(|(axle, spec): (usize, &AxleSpec)| {
                [WheelSide::Left, WheelSide::Right].map(|side| WheelCommand {
                    axle,
                    side,
                    steer_angle: if spec.steering { steer_angle } else { 0.0 },
                    motor_torque: if spec.motor { motor_torque_per_wheel } else { 0.0 },
                    brake_torque: state.brake_torque,
                })
            })
            .collect();

        let instruments = &self.instruments;
        TickOutput {
            gauges: GaugeReadings {
                tachometer: (state.true_engine_rpm / instruments.tachometer_max).clamp(0.0, 1.0),
                speedometer: (state.current_speed / instruments.speedometer_max).clamp(0.0, 1.0),
                fuel: self.fuel_tank.fill_ratio().clamp(0.0, 1.0),
                thermometer: (state.engine_temperature / instruments.thermometer_max)
                    .clamp(0.0, 1.0),
                backlight: state.lighting.backlight(),
            },
            odometer_delta,
            wheels,
            lights: state.lighting.signals(),
            radiator: self.radiator.as_ref().map(RadiatorModel::effect),
        }
    }
}
