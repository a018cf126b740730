// prism_sim/src/simulation/plugins/world/scene.rs

use std::sync::Arc;

use crate::prelude::*;
use crate::simulation::core::components::{Reflectivity, SceneShape};
use crate::simulation::core::transforms::bevy_transform_to_isometry;
use crate::simulation::plugins::world::spawner::Obstacle;

/// The static scene the sensors cast against, frozen after SceneBuilding.
/// Object handles are the bits of the obstacle entities.
#[derive(Resource, Debug, Clone)]
pub struct SceneSnapshot(pub Arc<ParryScene>);

/// Collects every obstacle into a `ParryScene`.
///
/// Runs before transform propagation, so obstacles are expected to be root
/// entities and their local `Transform` is their world pose.
pub fn build_scene_snapshot(
    mut commands: Commands,
    obstacles: Query<(Entity, &Transform, &SceneShape, Option<&Reflectivity>), With<Obstacle>>,
) {
    let mut scene = ParryScene::new();
    for (entity, transform, shape, reflectivity) in &obstacles {
        scene.add(
            ObjectHandle::from_entity(entity),
            bevy_transform_to_isometry(transform),
            shape.0.clone(),
            reflectivity.map(|r| r.0),
        );
    }

    info!(
        "[SCENE] Snapshot holds {} objects, {} with reflectivity.",
        scene.len(),
        scene.reflective_objects().len()
    );
    commands.insert_resource(SceneSnapshot(Arc::new(scene)));
}
