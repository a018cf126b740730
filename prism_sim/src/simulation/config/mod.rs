// prism_sim/src/simulation/config/mod.rs

//! Loading and validating scenario files.
//!
//! A scenario is a TOML file merged with `PRISM_`-prefixed environment
//! variables, where `__` separates nesting levels
//! (`PRISM_LIDAR__SENSOR__MASTER_SEED=7`). Only variables naming a scenario
//! section are read; other `PRISM_` variables are ignored.

mod serde_helpers;
pub mod structs;

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use thiserror::Error;

pub use structs::{LidarSection, ObstacleConfig, Pose, ScenarioConfig, ShapeConfig, Simulation};

/// Top-level scenario tables that environment variables may override.
const ENV_SECTIONS: [&str; 3] = ["simulation", "lidar", "obstacles"];

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario file {0} does not exist")]
    Missing(PathBuf),

    #[error("could not read scenario: {0}")]
    Load(#[from] figment::Error),

    #[error("simulation.rate_hz is {simulation} but lidar.sensor.simulation_rate_hz is {lidar}")]
    RateMismatch { simulation: u32, lidar: u32 },

    #[error("simulation.duration_seconds must be a positive number, got {0}")]
    InvalidDuration(f64),

    #[error("obstacle '{name}': {reason}")]
    InvalidObstacle { name: String, reason: String },
}

impl ScenarioConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ScenarioError::Missing(path.to_path_buf()));
        }

        let mut config: ScenarioConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(scenario_env())
            .extract()?;

        if let (Some(table), Some(dir)) = (config.lidar.mirror_table.as_mut(), path.parent()) {
            if table.is_relative() {
                *table = dir.join(&*table);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks what the sensor itself cannot. Sensor parameters are validated
    /// when the scan pipeline is built.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let simulation = self.simulation.rate_hz;
        let lidar = self.lidar.sensor.simulation_rate_hz;
        if simulation != lidar {
            return Err(ScenarioError::RateMismatch { simulation, lidar });
        }

        if let Some(seconds) = self.simulation.duration_seconds {
            if !(seconds.is_finite() && seconds > 0.0) {
                return Err(ScenarioError::InvalidDuration(seconds));
            }
        }

        for obstacle in &self.obstacles {
            let invalid = |reason: String| ScenarioError::InvalidObstacle {
                name: obstacle.name.clone(),
                reason,
            };
            if let Some(bad) = obstacle
                .shape
                .dimensions()
                .into_iter()
                .find(|d| !(d.is_finite() && *d > 0.0))
            {
                return Err(invalid(format!("shape dimension {bad} is not positive")));
            }
            if let Some(percent) = obstacle.reflectivity {
                if !percent.is_finite() {
                    return Err(invalid(format!("reflectivity {percent} is not a number")));
                }
            }
        }
        Ok(())
    }
}

/// `PRISM_`-prefixed variables whose first segment is a scenario section.
fn scenario_env() -> Env {
    Env::prefixed("PRISM_")
        .filter(|key| {
            let section = key.as_str().split("__").next().unwrap_or_default();
            ENV_SECTIONS.iter().any(|s| s.eq_ignore_ascii_case(section))
        })
        .split("__")
}
