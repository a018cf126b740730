// prism_sim/src/simulation/plugins/sensors/lidar.rs

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use rand::Rng;

// --- Simulation Crate Imports ---
use crate::prelude::*;
use crate::simulation::core::clock::SimulationClock;
use crate::simulation::core::events::BevyPointCloudMessage;
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::core::transforms::bevy_global_transform_to_isometry;
use crate::simulation::plugins::debugging::ShowDebugGizmos;
use crate::simulation::plugins::world::scene::SceneSnapshot;

// --- Core Library Imports ---
use prism_core::error::LidarError;
use prism_core::pipeline::PipelinePhase;

// =========================================================================
// == Components & Plugin ==
// =========================================================================

/// A spinning-prism LiDAR. Owns the scan pipeline that casts its rays.
#[derive(Component, Debug)]
pub struct PrismLidar {
    pub pipeline: ScanPipeline,
}

/// The frames of the most recent full sweep, oldest first.
#[derive(Component, Debug)]
pub struct SweepBuffer {
    frames: VecDeque<ScanFrame>,
    capacity: usize,
}

impl SweepBuffer {
    /// Holds at least one frame.
    pub fn new(sections: usize) -> Self {
        let capacity = sections.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, frame: ScanFrame) {
        while self.frames.len() >= self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    pub fn frames(&self) -> impl Iterator<Item = &ScanFrame> {
        self.frames.iter()
    }

    pub fn points(&self) -> impl Iterator<Item = &nalgebra::Point3<f64>> {
        self.frames.iter().flat_map(|f| f.points.iter())
    }
}

pub struct PrismLidarPlugin;

impl Plugin for PrismLidarPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_lidar.in_set(SceneBuildSet::Sensors),
        )
        .add_systems(
            Update,
            schedule_scans
                .in_set(SimulationSet::ScheduleScans)
                .run_if(in_state(AppState::Running)),
        )
        .add_systems(
            PostUpdate,
            (
                complete_scans.in_set(SimulationSet::CompleteScans),
                report_sweeps.in_set(SimulationSet::Consumers),
            )
                .run_if(in_state(AppState::Running)),
        )
        .add_systems(Last, drain_on_exit.after(SimulationSet::Clock));
    }
}

/// Builds the pipeline for the scenario's LiDAR. An unset master seed is
/// drawn from `rng`.
pub fn build_pipeline(
    section: &LidarSection,
    scene: Arc<dyn SceneQuery>,
    rng: &mut impl Rng,
) -> Result<ScanPipeline, LidarError> {
    let mirror: Arc<dyn MirrorRotationProvider> = match &section.mirror_table {
        Some(path) => Arc::new(MirrorRotationTable::from_path(
            path,
            section.sensor.mirror_out_of_range,
        )?),
        None => Arc::new(StaticMirror::default()),
    };
    let seed = section.sensor.master_seed.unwrap_or_else(|| rng.gen());
    ScanPipeline::new(&section.sensor, seed, scene, mirror)
}

// =========================================================================
// == Spawning System ==
// =========================================================================

fn spawn_lidar(
    mut commands: Commands,
    config: Res<ScenarioConfig>,
    snapshot: Option<Res<SceneSnapshot>>,
    mut rng: ResMut<SimulationRng>,
    mut exit: EventWriter<AppExit>,
) {
    let section = &config.lidar;
    let scene: Arc<dyn SceneQuery> = match snapshot {
        Some(snapshot) => snapshot.0.clone(),
        None => {
            warn!("[SPAWN] No scene snapshot, LiDAR '{}' will see nothing.", section.name);
            Arc::new(ParryScene::new())
        }
    };

    let pipeline = match build_pipeline(section, scene, &mut rng.0) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("[SPAWN] LiDAR '{}' could not be built: {}", section.name, e);
            exit.write(AppExit::error());
            return;
        }
    };

    info!(
        "[SPAWN] LiDAR '{}': {} sections of {} rays, seed {}",
        section.name,
        pipeline.total_sections(),
        pipeline.ray_count(),
        pipeline.master_seed()
    );

    let sections = pipeline.total_sections();
    let mut entity = commands.spawn((
        Name::new(section.name.clone()),
        PrismLidar { pipeline },
        SweepBuffer::new(sections),
        section.pose.to_bevy_transform(),
    ));
    if section.debug_visuals {
        entity.insert(ShowDebugGizmos);
    }
}

// =========================================================================
// == Runtime Systems ==
// =========================================================================

/// Launches this tick's casting. It runs on the worker pool until
/// `complete_scans` joins it in `PostUpdate`.
fn schedule_scans(
    clock: Res<SimulationClock>,
    mut lidars: Query<(&Name, &mut PrismLidar, &GlobalTransform)>,
) {
    for (name, mut lidar, transform) in &mut lidars {
        let tick = ScanTick {
            timestamp: clock.timestamp(),
            pose: bevy_global_transform_to_isometry(transform),
        };
        if let Err(e) = lidar.pipeline.schedule(tick) {
            warn!("[LIDAR] '{}' skipped tick {}: {}", name, clock.tick(), e);
        }
    }
}

/// Joins the casting started in `Update` and publishes the point cloud.
fn complete_scans(
    mut writer: EventWriter<BevyPointCloudMessage>,
    mut lidars: Query<(Entity, &Name, &mut PrismLidar, &mut SweepBuffer)>,
) {
    for (entity, name, mut lidar, mut sweep) in &mut lidars {
        if !matches!(
            lidar.pipeline.phase(),
            PipelinePhase::Scheduled | PipelinePhase::ReadyToComplete
        ) {
            continue;
        }

        match lidar.pipeline.complete() {
            Ok(frame) => {
                sweep.push(frame.clone());
                writer.write(BevyPointCloudMessage {
                    sensor: entity,
                    frame,
                });
            }
            Err(e) => error!("[LIDAR] '{}' lost a scan: {}", name, e),
        }
    }
}

/// Logs one line per finished sweep and sensor.
fn report_sweeps(
    mut reader: EventReader<BevyPointCloudMessage>,
    names: Query<&Name>,
    mut totals: Local<HashMap<Entity, (u64, usize)>>,
) {
    for message in reader.read() {
        let (sweeps, points) = totals.entry(message.sensor).or_default();
        *points += message.frame.len();
        if message.frame.completes_sweep() {
            *sweeps += 1;
            let name = names
                .get(message.sensor)
                .map(|n| n.as_str().to_owned())
                .unwrap_or_else(|_| format!("{:?}", message.sensor));
            info!(
                "[LIDAR] '{}' sweep {} done at t = {:.2} s: {} points",
                name, sweeps, message.frame.timestamp, points
            );
            *points = 0;
        }
    }
}

/// Lets in-flight casting finish before the world is torn down.
fn drain_on_exit(mut exits: EventReader<AppExit>, mut lidars: Query<&mut PrismLidar>) {
    if exits.read().next().is_none() {
        return;
    }
    for mut lidar in &mut lidars {
        lidar.pipeline.drain();
    }
}
