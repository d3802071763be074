// powertrain_core/src/models/mod.rs

// Pure numeric sub-models. None of them knows about the others or the orchestrator.
pub mod engine;
pub mod fluid;
pub mod radiator;
pub mod transmission;
