//! The orrery itself: a planet on an orbiting pivot, circled by six cubes

use cgmath::Vector3;

use crate::{
    config::OrreryConfig,
    error::SceneError,
    gfx::{
        camera::{CameraController, CameraManager, FlyCamera},
        geometry::generate_smooth_cube,
        resources::{Material, TextureId},
        scene::{
            graph::TransformOp,
            model,
            object::{Mesh, Object},
            scene::{Scene, SceneClock},
        },
    },
};

pub const PIVOT: &str = "pivot";
pub const PLANET: &str = "planet";

const CUBE_SCALE: f32 = 0.5;

/// Local transform chains of the six orbiting cubes, relative to the pivot
fn cube_orbits() -> [Vec<TransformOp>; 6] {
    let x = Vector3::unit_x();
    let y = Vector3::unit_y();
    let z = Vector3::unit_z();
    let yz = Vector3::new(0.0, 1.0, 1.0);

    [
        vec![
            TransformOp::spin(y),
            TransformOp::translate(5.0, 0.0, 0.0),
            TransformOp::spin(z),
        ],
        vec![
            TransformOp::spin(x),
            TransformOp::translate(0.0, 10.0, 0.0),
            TransformOp::spin(y),
        ],
        vec![
            TransformOp::rotate(z, 60.0),
            TransformOp::spin(y),
            TransformOp::translate(15.0, 0.0, 1.0),
            TransformOp::spin(x),
            TransformOp::rotate(y, 60.0),
        ],
        vec![
            TransformOp::rotate(z, 60.0),
            TransformOp::spin(y),
            TransformOp::translate(-15.0, 0.0, 0.0),
            TransformOp::spin(z),
            TransformOp::rotate(x, 70.0),
        ],
        vec![
            TransformOp::spin(x),
            TransformOp::translate(0.0, -10.0, 0.0),
            TransformOp::spin(yz),
            TransformOp::rotate(z, 45.0),
        ],
        vec![
            TransformOp::spin(y),
            TransformOp::translate(-5.0, 0.0, 0.0),
            TransformOp::spin(y),
            TransformOp::rotate(yz, 120.0),
        ],
    ]
}

/// Builds the full scene from settings.
///
/// Missing assets are not fatal: the cubes fall back to a white texture and
/// the planet node stays empty, each with a warning.
pub fn planet_system(config: &OrreryConfig, aspect: f32) -> Result<Scene, SceneError> {
    let camera = FlyCamera::from_settings(&config.camera, aspect);
    let mut scene = Scene::new(CameraManager::new(camera, CameraController::new()));
    scene.clock = SceneClock::new(config.animation.deg_per_tick);
    scene.directional_light = config.lighting.directional;

    let shiny = scene.material_manager.add_material(Material::shiny());
    let dull = scene.material_manager.add_material(Material::dull());

    let pivot = scene.graph.add_node(
        PIVOT,
        None,
        vec![
            TransformOp::spin(Vector3::unit_y()),
            TransformOp::translate(15.0, 0.0, 0.0),
        ],
    )?;

    let planet = scene.graph.add_node(
        PLANET,
        Some(pivot),
        vec![TransformOp::spin(Vector3::unit_y())],
    )?;
    let planet_meshes = load_planet(&mut scene, config);
    scene.add_object(Object::new(PLANET, planet, planet_meshes).with_material(dull));

    let cube_texture = scene.textures.load_or_white(&config.assets.cube_texture);
    match generate_smooth_cube() {
        Ok(cube) => {
            for (i, mut ops) in cube_orbits().into_iter().enumerate() {
                ops.push(TransformOp::uniform_scale(CUBE_SCALE));
                let name = format!("cube_{}", i + 1);
                let node = scene.graph.add_node(&name, Some(pivot), ops)?;
                let mesh = Mesh::from_interleaved(&name, &cube);
                scene.add_object(
                    Object::new(&name, node, vec![mesh])
                        .with_material(shiny.clone())
                        .with_texture(cube_texture),
                );
            }
        }
        Err(err) => log::error!("Cube mesh rejected by the normal pass: {}", err),
    }

    scene
        .point_lights
        .push(config.lighting.point.with_anchor(pivot));

    scene.update_transforms();
    log::info!(
        "Built planet system: {} nodes, {} objects",
        scene.graph.len(),
        scene.objects.len()
    );
    Ok(scene)
}

fn load_planet(scene: &mut Scene, config: &OrreryConfig) -> Vec<Mesh> {
    let imported = match model::load_obj(&config.assets.planet_model) {
        Ok(imported) => imported,
        Err(err) => {
            log::warn!("{}; the planet will not be drawn", err);
            return Vec::new();
        }
    };

    imported
        .into_iter()
        .map(|part| {
            let texture = part
                .diffuse_texture
                .as_deref()
                .map(|path| scene.textures.load_or_white(path))
                .unwrap_or(TextureId::WHITE);
            Mesh::from_interleaved(&part.name, &part.mesh).with_texture(texture)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Matrix4, Point3, Transform};
    use std::path::PathBuf;

    fn offline_config() -> OrreryConfig {
        let mut config = OrreryConfig::default();
        config.assets.planet_model = PathBuf::from("missing/planet.obj");
        config.assets.cube_texture = PathBuf::from("missing/container.png");
        config
    }

    fn origin(m: &Matrix4<f32>) -> Point3<f32> {
        m.transform_point(Point3::new(0.0, 0.0, 0.0))
    }

    #[test]
    fn test_layout_has_pivot_planet_and_six_cubes() {
        let scene = planet_system(&offline_config(), 1.0).unwrap();

        assert_eq!(scene.graph.len(), 8);
        assert_eq!(scene.objects.len(), 7);
        assert_eq!(scene.point_lights.len(), 1);
        assert!(scene.graph.find(PIVOT).is_some());
        assert!(scene.graph.find("cube_6").is_some());
    }

    #[test]
    fn test_missing_assets_fall_back() {
        let scene = planet_system(&offline_config(), 1.0).unwrap();

        let planet = &scene.objects[0];
        assert!(planet.meshes.is_empty());
        assert_eq!(planet.material.as_deref(), Some("dull"));

        let cube = &scene.objects[1];
        assert_eq!(cube.texture, Some(TextureId::WHITE));
        assert_eq!(cube.material.as_deref(), Some("shiny"));
    }

    #[test]
    fn test_children_are_placed_relative_to_pivot() {
        let scene = planet_system(&offline_config(), 1.0).unwrap();
        let world = scene.world_matrices();

        let pivot = scene.graph.find(PIVOT).unwrap();
        let planet = scene.graph.find(PLANET).unwrap();
        let first_cube = scene.graph.find("cube_1").unwrap();

        assert!((origin(&world[pivot.index()]) - Point3::new(15.0, 0.0, 0.0)).magnitude() < 1e-4);
        assert!((origin(&world[planet.index()]) - Point3::new(15.0, 0.0, 0.0)).magnitude() < 1e-4);
        assert!((origin(&world[first_cube.index()]) - Point3::new(20.0, 0.0, 0.0)).magnitude() < 1e-4);
    }

    #[test]
    fn test_cubes_are_half_size() {
        let scene = planet_system(&offline_config(), 1.0).unwrap();
        let cube = scene.graph.find("cube_2").unwrap();
        let world = scene.world_matrices()[cube.index()];

        let edge = world.transform_vector(Vector3::unit_x());
        assert!((edge.magnitude() - CUBE_SCALE).abs() < 1e-5);
    }

    #[test]
    fn test_light_rides_on_pivot() {
        let scene = planet_system(&offline_config(), 1.0).unwrap();
        let globals = scene.global_uniforms();
        assert_eq!(globals.point_light_count, 1);

        let position = Point3::from(globals.point_lights[0].position);
        assert!((position - Point3::new(15.0, 0.0, 0.0)).magnitude() < 1e-4);
    }

    #[test]
    fn test_spin_rate_comes_from_config() {
        let mut config = offline_config();
        config.animation.deg_per_tick = 2.0;
        let scene = planet_system(&config, 1.0).unwrap();
        assert_eq!(scene.clock.deg_per_tick, 2.0);
    }
}
