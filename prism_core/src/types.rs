// prism_core/src/types.rs

use nalgebra::{Isometry3, Point3, Vector3};

// --- Core Identifier ---
/// Opaque identity of a scene object that can be hit by a ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectHandle(pub u64);

impl ObjectHandle {
    // A convenience method for use in the Bevy adapter crate.
    #[cfg(feature = "bevy")] // This will only compile if the "bevy" feature is enabled
    pub fn from_entity(entity: bevy_ecs::prelude::Entity) -> Self {
        Self(entity.to_bits())
    }

    #[cfg(feature = "bevy")]
    pub fn to_entity(self) -> bevy_ecs::prelude::Entity {
        bevy_ecs::prelude::Entity::from_bits(self.0)
    }
}

/// World pose of the sensor at the moment a scan is scheduled.
pub type SensorPose = Isometry3<f64>;

// =========================================================================
// == Ray Casting Data ==
// =========================================================================

/// One ray handed to the intersection stage. All vectors are in WORLD space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayCastRequest {
    pub origin: Point3<f64>,
    /// Unit direction of travel.
    pub direction: Vector3<f64>,
    pub max_range: f64,
}

impl Default for RayCastRequest {
    fn default() -> Self {
        Self {
            origin: Point3::origin(),
            direction: Vector3::z(),
            max_range: 0.0,
        }
    }
}

/// The closest intersection found for a `RayCastRequest`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the request origin to `point`.
    pub distance: f64,
    pub object: ObjectHandle,
    pub point: Point3<f64>,
}

/// `None` means the ray left `max_range` without touching anything.
pub type RayCastResult = Option<RayHit>;
