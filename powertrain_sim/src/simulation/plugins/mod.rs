// powertrain_sim/src/simulation/plugins/mod.rs

pub mod dashboard;
pub mod input;
pub mod vehicles;
pub mod world;
