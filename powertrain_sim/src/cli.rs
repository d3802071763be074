// powertrain_sim/src/cli.rs

use bevy::prelude::Resource;
use clap::Parser;
use std::path::PathBuf;

/// Drives one or more simulated vehicles through a scenario, tick by tick.
///
/// Any binary built on the powertrain_sim library can parse these arguments
/// and insert the result as a resource.
#[derive(Parser, Debug, Resource, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(
        short,
        long,
        default_value = "assets/scenarios/pickup_test_drive.toml"
    )]
    pub scenario: PathBuf,

    /// Directory of reusable vehicle and component prefabs.
    #[arg(short, long, default_value = "assets/catalog")]
    pub catalog: PathBuf,

    /// Run the simulation in headless mode (without a graphical window).
    #[arg(long, default_value_t = false)]
    pub headless: bool,

    /// Stop after this many simulated seconds, overriding the scenario.
    #[arg(short, long)]
    pub duration: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_bundled_assets() {
        let cli = Cli::parse_from(["powertrain_sim"]);
        assert_eq!(cli.scenario, PathBuf::from("assets/scenarios/pickup_test_drive.toml"));
        assert_eq!(cli.catalog, PathBuf::from("assets/catalog"));
        assert!(!cli.headless);
        assert_eq!(cli.duration, None);
    }

    #[test]
    fn headless_run_with_duration() {
        let cli = Cli::parse_from(["powertrain_sim", "--headless", "--duration", "12.5"]);
        assert!(cli.headless);
        assert_eq!(cli.duration, Some(12.5));
    }
}
