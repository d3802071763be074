// powertrain_sim/src/simulation/plugins/vehicles/mod.rs

pub mod chassis;
pub mod powertrain;
