// prism_sim/src/simulation/plugins/world/spawner.rs

use crate::prelude::*;
use crate::simulation::core::components::{Reflectivity, SceneShape};
use crate::simulation::plugins::world::scene::build_scene_snapshot;

/// Marks the static obstacles spawned from the scenario.
#[derive(Component, Debug)]
pub struct Obstacle;

pub struct WorldSpawnerPlugin;

impl Plugin for WorldSpawnerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            (
                spawn_obstacles.in_set(SceneBuildSet::World),
                spawn_lighting_and_camera.in_set(SceneBuildSet::World),
                build_scene_snapshot.in_set(SceneBuildSet::Snapshot),
            ),
        );
    }
}

/// Spawns one entity per `[[obstacles]]` entry. Render meshes are only
/// attached when the app has a renderer.
fn spawn_obstacles(
    mut commands: Commands,
    config: Res<ScenarioConfig>,
    mut meshes: Option<ResMut<Assets<Mesh>>>,
    mut materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    for obstacle in &config.obstacles {
        let reflectivity = obstacle.reflectivity.map(Reflectivity).unwrap_or_default();
        info!(
            "[SPAWN] Obstacle '{}' ({:?}) at reflectivity {:.0}%",
            obstacle.name, obstacle.shape, reflectivity.0
        );

        let mut entity = commands.spawn((
            Name::new(obstacle.name.clone()),
            Obstacle,
            SceneShape(obstacle.shape.to_shared_shape()),
            reflectivity,
            obstacle.pose.to_bevy_transform(),
        ));

        if let (Some(meshes), Some(materials)) = (meshes.as_deref_mut(), materials.as_deref_mut()) {
            entity.insert((
                Mesh3d(meshes.add(obstacle_mesh(&obstacle.shape))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: reflectivity_color(reflectivity),
                    perceptual_roughness: 0.9,
                    ..default()
                })),
            ));
        }
    }
}

fn obstacle_mesh(shape: &ShapeConfig) -> Mesh {
    let [x, y, z] = shape.full_size().map(|v| v as f32);
    match shape {
        ShapeConfig::Cylinder { .. } => Cylinder::new(x / 2.0, y).into(),
        ShapeConfig::Cuboid { .. } | ShapeConfig::Plane { .. } => Cuboid::new(x, y, z).into(),
    }
}

/// Darker surfaces reflect less.
fn reflectivity_color(reflectivity: Reflectivity) -> Color {
    let v = 0.15 + 0.8 * (reflectivity.0.clamp(0.0, 100.0) / 100.0) as f32;
    Color::srgb(v, v, v)
}

/// Spawns lights and a camera when there is something to render.
fn spawn_lighting_and_camera(mut commands: Commands, meshes: Option<Res<Assets<Mesh>>>) {
    if meshes.is_none() {
        return;
    }

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 15_000.0,
            ..default()
        },
        Transform::from_xyz(10.0, 30.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let camera_transform = Transform::from_xyz(-18.0, 14.0, -18.0).looking_at(Vec3::ZERO, Vec3::Y);
    commands.spawn((Camera3d::default(), camera_transform));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_meshes_follow_the_collision_shape() {
        let cylinder = obstacle_mesh(&ShapeConfig::Cylinder {
            half_height: 1.0,
            radius: 0.5,
        });
        let half = Vec3::from(cylinder.compute_aabb().unwrap().half_extents);
        assert!((half - Vec3::new(0.5, 1.0, 0.5)).abs().max_element() < 1e-4);
    }

    #[test]
    fn brighter_means_more_reflective() {
        let dark = reflectivity_color(Reflectivity(5.0)).to_srgba();
        let bright = reflectivity_color(Reflectivity(90.0)).to_srgba();
        assert!(bright.red > dark.red);
    }
}
