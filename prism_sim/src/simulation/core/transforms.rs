// prism_sim/src/simulation/core/transforms.rs

//! Conversions between Bevy's `f32` transforms and the `f64` nalgebra types
//! of `prism_core`.
//!
//! Both sides use the same axes (+Y up), so these are plain component copies
//! with no frame change.

use bevy::prelude::{GlobalTransform, Quat as BevyQuat, Transform as BevyTransform, Vec3 as BevyVec3};
use nalgebra::{Isometry3, Point3, Quaternion, Translation3, UnitQuaternion};

/// Converts a Bevy `Transform` into a `nalgebra::Isometry3<f64>`. Scale is dropped.
pub fn bevy_transform_to_isometry(transform: &BevyTransform) -> Isometry3<f64> {
    let t = transform.translation;
    let r = transform.rotation;
    Isometry3::from_parts(
        Translation3::new(t.x as f64, t.y as f64, t.z as f64),
        UnitQuaternion::from_quaternion(Quaternion::new(
            r.w as f64, r.x as f64, r.y as f64, r.z as f64,
        )),
    )
}

/// Converts a Bevy `GlobalTransform` into a `nalgebra::Isometry3<f64>`.
pub fn bevy_global_transform_to_isometry(transform: &GlobalTransform) -> Isometry3<f64> {
    bevy_transform_to_isometry(&transform.compute_transform())
}

pub fn isometry_to_bevy_transform(iso: &Isometry3<f64>) -> BevyTransform {
    let t = iso.translation.vector;
    let r = iso.rotation.coords; // [x, y, z, w]
    BevyTransform {
        translation: BevyVec3::new(t.x as f32, t.y as f32, t.z as f32),
        rotation: BevyQuat::from_xyzw(r.x as f32, r.y as f32, r.z as f32, r.w as f32),
        scale: BevyVec3::ONE,
    }
}

pub fn point_to_bevy_vec3(p: &Point3<f64>) -> BevyVec3 {
    BevyVec3::new(p.x as f32, p.y as f32, p.z as f32)
}
