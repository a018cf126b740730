// prism_core/src/scene.rs

//! The intersection stage. The pipeline only talks to `SceneQuery`; whoever
//! owns the scene geometry decides how rays are actually traced.

use std::fmt::Debug;

use nalgebra::{Isometry3, Point3};
use parry3d_f64::na as pna;
use parry3d_f64::query::{Ray, RayCast};
use parry3d_f64::shape::SharedShape;
use rayon::prelude::*;

use crate::types::{ObjectHandle, RayCastRequest, RayCastResult, RayHit};

/// The scene collaborator the LiDAR casts against.
pub trait SceneQuery: Send + Sync + Debug {
    /// Casts every request and writes the closest hit (or `None`) to the
    /// result with the same index. Must return only once every slot is final.
    fn batch_cast(&self, requests: &[RayCastRequest], results: &mut [RayCastResult]);

    /// Every object that declares a reflectivity, as `(handle, percent)`.
    fn reflective_objects(&self) -> Vec<(ObjectHandle, f64)>;
}

/// One static collider in a `ParryScene`.
#[derive(Clone)]
pub struct SceneObject {
    pub handle: ObjectHandle,
    pub pose: Isometry3<f64>,
    pub shape: SharedShape,
    /// Percent, `None` for objects without a reflectivity property.
    pub reflectivity: Option<f64>,
}

impl Debug for SceneObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneObject")
            .field("handle", &self.handle)
            .field("pose", &self.pose)
            .field("shape", &self.shape.shape_type())
            .field("reflectivity", &self.reflectivity)
            .finish()
    }
}

/// A static scene traced with parry. Every ray is tested against every
/// object, in parallel across rays.
#[derive(Debug, Clone, Default)]
pub struct ParryScene {
    objects: Vec<SceneObject>,
}

impl ParryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        handle: ObjectHandle,
        pose: Isometry3<f64>,
        shape: SharedShape,
        reflectivity: Option<f64>,
    ) -> &mut Self {
        self.objects.push(SceneObject {
            handle,
            pose,
            shape,
            reflectivity,
        });
        self
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Closest hit along one request, if any lies within `max_range`.
    pub fn cast(&self, request: &RayCastRequest) -> RayCastResult {
        let ray = Ray::new(to_parry_point(&request.origin), to_parry_vector(&request.direction));

        let mut best: Option<(f64, ObjectHandle)> = None;
        for object in &self.objects {
            let limit = best.map_or(request.max_range, |(toi, _)| toi);
            // Hollow shapes: a ray starting inside a volume reports the surface it exits through.
            if let Some(toi) = object
                .shape
                .cast_ray(&to_parry_iso(&object.pose), &ray, limit, false)
            {
                if best.map_or(true, |(current, _)| toi < current) {
                    best = Some((toi, object.handle));
                }
            }
        }

        best.map(|(distance, object)| RayHit {
            distance,
            object,
            point: request.origin + request.direction * distance,
        })
    }
}

impl SceneQuery for ParryScene {
    fn batch_cast(&self, requests: &[RayCastRequest], results: &mut [RayCastResult]) {
        debug_assert_eq!(requests.len(), results.len());
        results
            .par_iter_mut()
            .zip(requests.par_iter())
            .for_each(|(result, request)| *result = self.cast(request));
    }

    fn reflective_objects(&self) -> Vec<(ObjectHandle, f64)> {
        self.objects
            .iter()
            .filter_map(|o| o.reflectivity.map(|r| (o.handle, r)))
            .collect()
    }
}

// parry re-exports its own nalgebra; convert by components so the two never
// have to be the same crate version.
fn to_parry_point(p: &Point3<f64>) -> pna::Point3<f64> {
    pna::Point3::new(p.x, p.y, p.z)
}

fn to_parry_vector(v: &nalgebra::Vector3<f64>) -> pna::Vector3<f64> {
    pna::Vector3::new(v.x, v.y, v.z)
}

fn to_parry_iso(iso: &Isometry3<f64>) -> pna::Isometry3<f64> {
    let q = iso.rotation.quaternion();
    let t = &iso.translation.vector;
    pna::Isometry3::from_parts(
        pna::Translation3::new(t.x, t.y, t.z),
        pna::UnitQuaternion::new_unchecked(pna::Quaternion::new(q.w, q.i, q.j, q.k)),
    )
}
