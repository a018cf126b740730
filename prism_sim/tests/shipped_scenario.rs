// prism_sim/tests/shipped_scenario.rs

//! The scenario in `assets/` must stay loadable and scannable.

use std::path::PathBuf;
use std::sync::Arc;

use prism_core::prelude::*;
use prism_sim::prelude::{ScenarioConfig, ShapeConfig};
use prism_sim::simulation::plugins::sensors::lidar::build_pipeline;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn scenario_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/scenarios/mid360_course.toml")
}

fn course_scene(config: &ScenarioConfig) -> ParryScene {
    let mut scene = ParryScene::new();
    for (id, obstacle) in config.obstacles.iter().enumerate() {
        scene.add(
            ObjectHandle(id as u64),
            obstacle.pose.to_isometry(),
            obstacle.shape.to_shared_shape(),
            Some(obstacle.reflectivity.unwrap_or(20.0)),
        );
    }
    scene
}

#[test]
fn the_course_loads_with_its_mirror_table() {
    let config = ScenarioConfig::load(scenario_path()).unwrap();
    assert_eq!(config.simulation.max_ticks(), Some(1_500));
    assert!(config
        .obstacles
        .iter()
        .any(|o| matches!(o.shape, ShapeConfig::Plane { .. })));

    let table_path = config.lidar.mirror_table.clone().unwrap();
    let table =
        MirrorRotationTable::from_path(&table_path, config.lidar.sensor.mirror_out_of_range).unwrap();
    assert_eq!(table.span_seconds(), 120.0);
    // Wrapping: one table length later the pattern repeats.
    let a = table.sample(3.5);
    let b = table.sample(3.5 + 121.0);
    assert!((a.azimuth_deg - b.azimuth_deg).abs() < 1e-9);
}

#[test]
fn a_sweep_of_the_course_sees_the_obstacles() {
    let config = ScenarioConfig::load(scenario_path()).unwrap();
    let scene = Arc::new(course_scene(&config));
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let mut pipeline = build_pipeline(&config.lidar, scene, &mut rng).unwrap();

    let pose = config.lidar.pose.to_isometry();
    let mut points = 0;
    for n in 0..pipeline.total_sections() {
        pipeline
            .schedule(ScanTick {
                timestamp: n as f64 / config.simulation.rate_hz as f64,
                pose,
            })
            .unwrap();
        let frame = pipeline.complete().unwrap();
        points += frame.len();
        // Nothing lies above the wall top.
        for p in frame.points.iter() {
            assert!(p.y < 15.5, "point above the course: {p:?}");
        }
    }
    assert!(points > 0);
}
