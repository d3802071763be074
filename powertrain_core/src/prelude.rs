// powertrain_core/src/prelude.rs

// --- Orchestrator ---
pub use crate::vehicle::{HeadlampMode, LightingState, VehicleSim, VehicleSimState};

// --- Configuration and errors ---
pub use crate::config::{
    AxleSpec, ChassisSpec, EngineSpec, InstrumentSpec, RadiatorSpec, ReservoirSpec,
    TransmissionSpec, VehicleSpec,
};
pub use crate::error::ConfigError;

// --- Per-tick messages ---
pub use crate::messages::{
    DriverInput, GaugeReadings, LightSignals, TickOutput, WheelCommand, WheelSide,
};
pub use crate::types::{MovementDirection, VehiclePose};

// --- Sub-models ---
pub use crate::models::engine::EngineModel;
pub use crate::models::fluid::{FluidKind, FluidReservoir};
pub use crate::models::radiator::{RadiatorModel, RadiatorSignal};
pub use crate::models::transmission::{Gear, TransmissionModel};
