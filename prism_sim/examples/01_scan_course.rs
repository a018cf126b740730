// prism_sim/examples/01_scan_course.rs

//! Runs a scenario end to end: loads the TOML, spawns the course and drives
//! the LiDAR every tick.
//!
//! With a window, F3 toggles the point cloud. Headless runs tick at the
//! scenario rate and log one line per sweep.
//!
//! To run this example:
//! `cargo run --example 01_scan_course -- --headless --ticks 50`

use std::time::Duration;

// --- Bevy Imports ---
use bevy::{
    app::ScheduleRunnerPlugin, log::LogPlugin, prelude::*, state::app::StatesPlugin,
    transform::TransformPlugin,
};
use clap::Parser;

// --- Project-Specific Imports ---
use prism_sim::cli::Cli;
use prism_sim::prelude::ScenarioConfig;
use prism_sim::{DebuggingPlugin, PrismSimulationPlugin};

const LOG_FILTER: &str = "info,wgpu_core=error,wgpu_hal=error,prism_sim=debug,prism_core=info";

fn main() -> AppExit {
    let cli = Cli::parse();

    // --- 1. Load Simulation Configuration ---
    println!("Loading scenario from: {}", cli.scenario.display());
    let mut config = match ScenarioConfig::load(&cli.scenario) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Could not load scenario '{}': {}", cli.scenario.display(), e);
            return AppExit::error();
        }
    };
    if let Err(e) = cli.apply_overrides(&mut config) {
        eprintln!("Invalid command-line overrides: {}", e);
        return AppExit::error();
    }

    let mut app = App::new();

    // --- 2. Add Core Bevy Plugins & Resources ---
    let log = LogPlugin {
        level: bevy::log::Level::INFO,
        filter: LOG_FILTER.to_string(),
        ..default()
    };
    if cli.headless {
        let tick = Duration::from_secs_f64(1.0 / config.simulation.rate_hz as f64);
        app.add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(tick)),
            StatesPlugin,
            TransformPlugin,
            log,
        ));
    } else {
        app.add_plugins(
            DefaultPlugins.set(log).set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Prism LiDAR".into(),
                    ..default()
                }),
                ..default()
            }),
        )
        .insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.08)))
        .add_plugins(DebuggingPlugin);
    }

    // Insert the loaded configuration as a Bevy resource so all systems can access it.
    app.insert_resource(config);

    // --- 3. Add the Main Prism Simulation Plugin ---
    app.add_plugins(PrismSimulationPlugin);

    // --- 4. Run the App ---
    println!("Starting Prism Simulation...");
    app.run()
}
