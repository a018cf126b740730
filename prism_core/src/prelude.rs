// prism_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::mirror::MirrorRotationProvider;
pub use crate::scene::SceneQuery;

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::config::{LidarConfig, MirrorOutOfRange};
pub use crate::error::{LidarError, PipelineError};
pub use crate::messages::{ScanFrame, ScanTick};
pub use crate::mirror::MirrorRotationSample;
pub use crate::scan::{RayGrid, ScanSection, ScanSectioner};
pub use crate::types::{ObjectHandle, RayCastRequest, RayCastResult, RayHit, SensorPose};

// --- The Scan Pipeline ---
pub use crate::pipeline::{PipelinePhase, ScanPipeline};

// --- Concrete Implementations (Export common ones for convenience) ---
pub use crate::mirror::{MirrorRotationTable, StaticMirror};
pub use crate::reflectivity::ReflectivityIndex;
pub use crate::scene::ParryScene;
