// prism_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

use crate::simulation::config::{ScenarioConfig, ScenarioError};

/// Prism: a spinning-prism LiDAR simulator.
///
/// This struct defines the command-line arguments that can be passed to any
/// binary application that uses the Prism simulation library.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(
        short,
        long,
        default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/scenarios/mid360_course.toml")
    )]
    pub scenario: PathBuf,

    /// Run the simulation in headless mode (without a graphical window).
    #[arg(long, default_value_t = false)]
    pub headless: bool,

    /// Overrides `simulation.seed` from the scenario.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many ticks, overriding `simulation.duration_seconds`.
    #[arg(long)]
    pub ticks: Option<u64>,
}

impl Cli {
    /// Applies the command-line overrides on top of a loaded scenario and
    /// validates the result again.
    pub fn apply_overrides(&self, config: &mut ScenarioConfig) -> Result<(), ScenarioError> {
        if let Some(seed) = self.seed {
            config.simulation.seed = Some(seed);
        }
        if let Some(ticks) = self.ticks {
            config.simulation.duration_seconds = Some(ticks as f64 / config.simulation.rate_hz as f64);
        }
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_seed_and_duration() {
        let cli = Cli::parse_from(["prism", "--headless", "--seed", "12", "--ticks", "25"]);
        assert!(cli.headless);

        let mut config = ScenarioConfig::default();
        cli.apply_overrides(&mut config).unwrap();
        assert_eq!(config.simulation.seed, Some(12));
        assert_eq!(config.simulation.max_ticks(), Some(25));
    }

    #[test]
    fn no_flags_leave_the_scenario_alone() {
        let cli = Cli::parse_from(["prism"]);
        assert!(cli.scenario.ends_with("assets/scenarios/mid360_course.toml"));

        let mut config = ScenarioConfig::default();
        cli.apply_overrides(&mut config).unwrap();
        assert_eq!(config.simulation.seed, None);
        assert_eq!(config.simulation.max_ticks(), None);
    }

    #[test]
    fn zero_ticks_is_rejected() {
        let cli = Cli::parse_from(["prism", "--ticks", "0"]);
        let mut config = ScenarioConfig::default();
        assert!(matches!(
            cli.apply_overrides(&mut config),
            Err(ScenarioError::InvalidDuration(d)) if d == 0.0
        ));
    }
}
