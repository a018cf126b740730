// prism_core/src/pipeline.rs

//! The per-tick scan cycle.
//!
//! A host drives the pipeline with two calls per tick:
//!
//! 1. `schedule` picks the next section, samples the mirror and launches ray
//!    generation chained with the scene intersection on the worker pool. It
//!    returns immediately so the host can do other work in the meantime.
//! 2. `complete` blocks until that unit is done, runs the hit acceptance and
//!    returns the tick's point cloud.
//!
//! The scratch buffers are moved into the in-flight unit and handed back when
//! it finishes, so nothing can read results before they are written and only
//! one unit can ever be in flight.

use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crossbeam::channel::{bounded, Receiver};
use nalgebra::{Point3, Vector3};
use tracing::{debug, error, info};

use crate::acceptance::{accept_hits, HitAcceptanceModel};
use crate::config::LidarConfig;
use crate::error::{LidarError, PipelineError};
use crate::generator::{NoisyRayGenerator, RayGenerationInput};
use crate::messages::{ScanFrame, ScanTick};
use crate::mirror::MirrorRotationProvider;
use crate::reflectivity::ReflectivityIndex;
use crate::scan::{RayGrid, ScanSection, ScanSectioner};
use crate::scene::SceneQuery;
use crate::types::{RayCastRequest, RayCastResult};

/// Where the pipeline is in its per-tick cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Idle,
    Scheduled,
    ReadyToComplete,
    Consumed,
}

/// Per-tick scratch space, sized once to the section length.
#[derive(Debug)]
struct ScanBuffers {
    directions: Vec<Vector3<f64>>,
    range_noise: Vec<f64>,
    requests: Vec<RayCastRequest>,
    results: Vec<RayCastResult>,
}

impl ScanBuffers {
    fn new(ray_count: usize) -> Self {
        Self {
            directions: vec![Vector3::zeros(); ray_count],
            range_noise: vec![0.0; ray_count],
            requests: vec![RayCastRequest::default(); ray_count],
            results: vec![None; ray_count],
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TickInfo {
    tick: u64,
    timestamp: f64,
    section: ScanSection,
}

#[derive(Debug)]
enum PipelineState {
    Idle(ScanBuffers),
    Scheduled {
        info: TickInfo,
        done: Receiver<ScanBuffers>,
    },
    ReadyToComplete {
        info: TickInfo,
        buffers: ScanBuffers,
    },
    Consumed(ScanBuffers),
    /// Only observable while a transition is being computed.
    Transitioning,
}

pub struct ScanPipeline {
    grid: Arc<RayGrid>,
    sectioner: ScanSectioner,
    generator: NoisyRayGenerator,
    acceptance: HitAcceptanceModel,
    reflectivity: Arc<ReflectivityIndex>,
    scene: Arc<dyn SceneQuery>,
    mirror: Arc<dyn MirrorRotationProvider>,
    state: PipelineState,
    /// Reused every tick; published as a snapshot by `complete`.
    accepted: Vec<Point3<f64>>,
    next_tick: u64,
}

impl ScanPipeline {
    /// Builds the ray grid, the sectioner and the reflectivity index, and
    /// allocates every per-tick buffer. Fails on any invalid configuration.
    pub fn new(
        config: &LidarConfig,
        master_seed: u64,
        scene: Arc<dyn SceneQuery>,
        mirror: Arc<dyn MirrorRotationProvider>,
    ) -> Result<Self, LidarError> {
        config.validate()?;

        let (min_elevation, max_elevation) = config.effective_elevation_deg();
        let grid = RayGrid::build(
            config.azimuth_steps,
            config.elevation_steps,
            min_elevation,
            max_elevation,
        )?;
        let sectioner =
            ScanSectioner::new(grid.len(), config.scan_rate_hz, config.simulation_rate_hz)?;
        let reflectivity = ReflectivityIndex::from_objects(scene.reflective_objects());

        let ray_count = sectioner.ray_count();
        info!(
            "LiDAR pipeline ready: {} directions, {} rays per tick over {} sections, {} reflective objects, seed {}",
            grid.len(),
            ray_count,
            sectioner.total_sections(),
            reflectivity.len(),
            master_seed
        );

        Ok(Self {
            grid: Arc::new(grid),
            sectioner,
            generator: NoisyRayGenerator::new(config, master_seed),
            acceptance: HitAcceptanceModel::new(
                config.acceptance_constant,
                config.acceptance_exponent,
            ),
            reflectivity: Arc::new(reflectivity),
            scene,
            mirror,
            state: PipelineState::Idle(ScanBuffers::new(ray_count)),
            accepted: Vec::with_capacity(ray_count),
            next_tick: 0,
        })
    }

    /// Starts this tick's generation + intersection unit on the worker pool.
    /// Returns the section being cast.
    pub fn schedule(&mut self, tick: ScanTick) -> Result<ScanSection, PipelineError> {
        let mut buffers = match mem::replace(&mut self.state, PipelineState::Transitioning) {
            PipelineState::Idle(buffers) | PipelineState::Consumed(buffers) => buffers,
            other => {
                self.state = other;
                return Err(PipelineError::NotIdle);
            }
        };

        let mirror = self.mirror.sample(tick.timestamp);
        let section = self.sectioner.next_section();
        let range = section.range();
        buffers
            .directions
            .copy_from_slice(&self.grid.directions()[range.clone()]);

        let info = TickInfo {
            tick: self.next_tick,
            timestamp: tick.timestamp,
            section,
        };
        self.next_tick += 1;

        let input = RayGenerationInput {
            pose: tick.pose,
            mirror,
            tick: info.tick,
            first_ray_index: range.start,
        };
        let generator = self.generator;
        let scene = Arc::clone(&self.scene);
        let (tx, rx) = bounded(1);

        rayon::spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                generator.generate(
                    &buffers.directions,
                    &input,
                    &mut buffers.requests,
                    &mut buffers.range_noise,
                );
                scene.batch_cast(&buffers.requests, &mut buffers.results);
            }));
            match outcome {
                // The receiver only disappears if the pipeline itself is gone.
                Ok(()) => {
                    let _ = tx.send(buffers);
                }
                Err(_) => error!("LiDAR scan unit for tick {} panicked", input.tick),
            }
        });

        debug!(
            "Scheduled tick {} (section {}/{}, mirror az {:.3} el {:.3})",
            info.tick, section.index, section.total_sections, mirror.azimuth_deg, mirror.elevation_deg
        );
        self.state = PipelineState::Scheduled { info, done: rx };
        Ok(section)
    }

    /// Blocks until the scheduled unit has finished. Calling it again before
    /// `complete` is a no-op.
    pub fn wait(&mut self) -> Result<(), PipelineError> {
        let (info, buffers) = self.take_finished()?;
        self.state = PipelineState::ReadyToComplete { info, buffers };
        Ok(())
    }

    /// Finishes the tick: waits for the in-flight unit if needed, filters the
    /// hits and returns the tick's point cloud.
    pub fn complete(&mut self) -> Result<ScanFrame, PipelineError> {
        let (info, buffers) = self.take_finished()?;

        accept_hits(
            &buffers.requests,
            &buffers.results,
            &buffers.range_noise,
            &self.reflectivity,
            &self.acceptance,
            &mut self.accepted,
        );

        debug!(
            "Completed tick {}: {} of {} rays accepted",
            info.tick,
            self.accepted.len(),
            buffers.requests.len()
        );

        self.state = PipelineState::Consumed(buffers);
        Ok(ScanFrame {
            tick: info.tick,
            timestamp: info.timestamp,
            section: info.section,
            points: Arc::from(self.accepted.as_slice()),
        })
    }

    /// Waits for any in-flight unit and discards its results. Afterwards the
    /// pipeline is idle.
    pub fn drain(&mut self) {
        // On error nothing was in flight, or the worker was lost and fresh buffers are in place.
        if let Ok((info, buffers)) = self.take_finished() {
            debug!("Drained tick {} without completing it", info.tick);
            self.state = PipelineState::Idle(buffers);
        }
    }

    pub fn phase(&self) -> PipelinePhase {
        match self.state {
            PipelineState::Idle(_) | PipelineState::Transitioning => PipelinePhase::Idle,
            PipelineState::Scheduled { .. } => PipelinePhase::Scheduled,
            PipelineState::ReadyToComplete { .. } => PipelinePhase::ReadyToComplete,
            PipelineState::Consumed(_) => PipelinePhase::Consumed,
        }
    }

    pub fn grid(&self) -> &RayGrid {
        &self.grid
    }

    pub fn reflectivity(&self) -> &ReflectivityIndex {
        &self.reflectivity
    }

    pub fn ray_count(&self) -> usize {
        self.sectioner.ray_count()
    }

    pub fn total_sections(&self) -> usize {
        self.sectioner.total_sections()
    }

    pub fn master_seed(&self) -> u64 {
        self.generator.master_seed()
    }

    /// Points accepted by the most recent `complete`.
    pub fn accepted_points(&self) -> &[Point3<f64>] {
        &self.accepted
    }

    /// Takes the buffers of a finished unit, blocking on the worker if needed.
    fn take_finished(&mut self) -> Result<(TickInfo, ScanBuffers), PipelineError> {
        match mem::replace(&mut self.state, PipelineState::Transitioning) {
            PipelineState::Scheduled { info, done } => match done.recv() {
                Ok(buffers) => Ok((info, buffers)),
                Err(_) => {
                    self.state = PipelineState::Idle(ScanBuffers::new(self.ray_count()));
                    Err(PipelineError::WorkerLost)
                }
            },
            PipelineState::ReadyToComplete { info, buffers } => Ok((info, buffers)),
            other => {
                self.state = other;
                Err(PipelineError::NothingScheduled)
            }
        }
    }
}

impl Drop for ScanPipeline {
    fn drop(&mut self) {
        self.drain();
    }
}

impl std::fmt::Debug for ScanPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanPipeline")
            .field("directions", &self.grid.len())
            .field("ray_count", &self.ray_count())
            .field("total_sections", &self.total_sections())
            .field("phase", &self.phase())
            .field("next_tick", &self.next_tick)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::StaticMirror;
    use crate::scene::ParryScene;
    use crate::types::ObjectHandle;
    use nalgebra::Isometry3;

    fn small_config() -> LidarConfig {
        LidarConfig {
            azimuth_steps: 4,
            elevation_steps: 2,
            min_elevation_deg: -1.0,
            max_elevation_deg: 1.0,
            fov_shrinkage_deg: 0.0,
            scan_rate_hz: 1,
            simulation_rate_hz: 2,
            ..Default::default()
        }
    }

    fn pipeline(config: &LidarConfig) -> ScanPipeline {
        ScanPipeline::new(
            config,
            42,
            Arc::new(ParryScene::new()),
            Arc::new(StaticMirror::default()),
        )
        .unwrap()
    }

    fn tick(timestamp: f64) -> ScanTick {
        ScanTick {
            timestamp,
            pose: Isometry3::identity(),
        }
    }

    #[test]
    fn walks_through_every_phase() {
        let mut pipeline = pipeline(&small_config());
        assert_eq!(pipeline.phase(), PipelinePhase::Idle);

        pipeline.schedule(tick(0.0)).unwrap();
        assert_eq!(pipeline.phase(), PipelinePhase::Scheduled);

        pipeline.wait().unwrap();
        assert_eq!(pipeline.phase(), PipelinePhase::ReadyToComplete);
        // Waiting twice is harmless.
        pipeline.wait().unwrap();

        let frame = pipeline.complete().unwrap();
        assert_eq!(pipeline.phase(), PipelinePhase::Consumed);
        assert_eq!(frame.tick, 0);
        assert!(frame.is_empty());
    }

    #[test]
    fn refuses_to_overlap_ticks() {
        let mut pipeline = pipeline(&small_config());
        pipeline.schedule(tick(0.0)).unwrap();
        assert_eq!(pipeline.schedule(tick(0.02)), Err(PipelineError::NotIdle));
        // The original unit is untouched by the rejected call.
        assert_eq!(pipeline.complete().unwrap().tick, 0);
    }

    #[test]
    fn refuses_to_complete_an_unscheduled_tick() {
        let mut pipeline = pipeline(&small_config());
        assert_eq!(pipeline.complete().unwrap_err(), PipelineError::NothingScheduled);

        pipeline.schedule(tick(0.0)).unwrap();
        pipeline.complete().unwrap();
        assert_eq!(pipeline.complete().unwrap_err(), PipelineError::NothingScheduled);
        assert_eq!(pipeline.wait().unwrap_err(), PipelineError::NothingScheduled);
    }

    #[test]
    fn sections_alternate_across_ticks() {
        let mut pipeline = pipeline(&small_config());
        assert_eq!(pipeline.ray_count(), 4);
        assert_eq!(pipeline.total_sections(), 2);

        let mut indices = Vec::new();
        for n in 0..4 {
            indices.push(pipeline.schedule(tick(n as f64 * 0.5)).unwrap().index);
            let frame = pipeline.complete().unwrap();
            assert_eq!(frame.tick, n);
            assert_eq!(frame.completes_sweep(), n % 2 == 1);
        }
        assert_eq!(indices, vec![1, 2, 1, 2]);
    }

    #[test]
    fn drain_returns_to_idle() {
        let mut pipeline = pipeline(&small_config());
        pipeline.schedule(tick(0.0)).unwrap();
        pipeline.drain();
        assert_eq!(pipeline.phase(), PipelinePhase::Idle);
        pipeline.schedule(tick(0.5)).unwrap();
        // Dropping with a unit in flight waits for it.
        drop(pipeline);
    }

    /// A scene whose casts always blow up on the worker.
    #[derive(Debug)]
    struct BrokenScene;

    impl SceneQuery for BrokenScene {
        fn batch_cast(&self, _requests: &[RayCastRequest], _results: &mut [RayCastResult]) {
            panic!("scene backend crashed");
        }

        fn reflective_objects(&self) -> Vec<(ObjectHandle, f64)> {
            Vec::new()
        }
    }

    #[test]
    fn a_panicking_worker_is_reported_and_recovered_from() {
        let mut pipeline = ScanPipeline::new(
            &small_config(),
            42,
            Arc::new(BrokenScene),
            Arc::new(StaticMirror::default()),
        )
        .unwrap();

        pipeline.schedule(tick(0.0)).unwrap();
        assert_eq!(pipeline.complete().unwrap_err(), PipelineError::WorkerLost);
        assert_eq!(pipeline.phase(), PipelinePhase::Idle);

        // Fresh buffers are in place, so the next tick can be scheduled.
        pipeline.schedule(tick(0.5)).unwrap();
        assert_eq!(pipeline.wait().unwrap_err(), PipelineError::WorkerLost);
        assert_eq!(pipeline.phase(), PipelinePhase::Idle);
    }

    #[test]
    fn rejects_invalid_configuration() {
        let config = LidarConfig {
            elevation_steps: 1,
            ..small_config()
        };
        let result = ScanPipeline::new(
            &config,
            0,
            Arc::new(ParryScene::new()),
            Arc::new(StaticMirror::default()),
        );
        assert!(matches!(result, Err(LidarError::InvalidGrid { .. })));
    }

    #[test]
    fn reflectivity_index_comes_from_the_scene() {
        let mut scene = ParryScene::new();
        scene.add(
            ObjectHandle(3),
            Isometry3::identity(),
            parry3d_f64::shape::SharedShape::ball(1.0),
            Some(55.0),
        );
        let pipeline = ScanPipeline::new(
            &small_config(),
            0,
            Arc::new(scene),
            Arc::new(StaticMirror::default()),
        )
        .unwrap();
        assert_eq!(pipeline.reflectivity().percent(ObjectHandle(3)), Some(55.0));
    }
}
