use cgmath::{Deg, Matrix4};
use wgpu::Device;

use crate::gfx::{
    camera::camera_utils::CameraManager,
    resources::{
        BindingLayouts, DirectionalLight, GlobalUBOContent, Material, MaterialManager,
        PointLight, TextureLibrary,
    },
    scene::graph::SceneGraph,
};

use super::object::Object;

/// Frame counter driving every `Spin` transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneClock {
    pub ticks: u64,
    pub deg_per_tick: f32,
}

impl Default for SceneClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SceneClock {
    pub fn new(deg_per_tick: f32) -> Self {
        Self {
            ticks: 0,
            deg_per_tick,
        }
    }

    pub fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }

    /// Current spin angle, wrapped to [0, 360)
    pub fn angle(&self) -> Deg<f32> {
        let degrees = (self.ticks as f64 * self.deg_per_tick as f64).rem_euclid(360.0);
        Deg(degrees as f32)
    }
}

/// Main scene containing the transform hierarchy, objects, lights and camera
pub struct Scene {
    pub camera_manager: CameraManager,
    pub graph: SceneGraph,
    pub objects: Vec<Object>,
    pub material_manager: MaterialManager,
    pub textures: TextureLibrary,
    pub directional_light: DirectionalLight,
    pub point_lights: Vec<PointLight>,
    pub clock: SceneClock,
    world_matrices: Vec<Matrix4<f32>>,
}

impl Scene {
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            graph: SceneGraph::new(),
            objects: Vec::new(),
            material_manager: MaterialManager::new(),
            textures: TextureLibrary::new(),
            directional_light: DirectionalLight::default(),
            point_lights: Vec::new(),
            clock: SceneClock::default(),
            world_matrices: Vec::new(),
        }
    }

    pub fn add_object(&mut self, object: Object) {
        self.objects.push(object);
    }

    /// Advances the camera and, unless paused, the animation clock, then
    /// recomputes every world matrix.
    pub fn update(&mut self, dt: f32, paused: bool) {
        self.camera_manager.controller.look_locked = paused;
        self.camera_manager.update(dt);

        if !paused {
            self.clock.tick();
        }
        self.update_transforms();
    }

    /// Recomputes world matrices at the current clock angle
    pub fn update_transforms(&mut self) {
        self.world_matrices = self.graph.world_matrices(self.clock.angle());
        for object in &mut self.objects {
            if let Some(world) = self.world_matrices.get(object.node.index()) {
                object.model_matrix = *world;
            }
        }
    }

    pub fn world_matrices(&self) -> &[Matrix4<f32>] {
        &self.world_matrices
    }

    /// Camera and light data for the global uniform block
    pub fn global_uniforms(&self) -> GlobalUBOContent {
        let point_lights: Vec<_> = self
            .point_lights
            .iter()
            .map(|light| light.to_uniform(light.world_position(&self.world_matrices)))
            .collect();

        GlobalUBOContent::new(
            self.camera_manager.view_matrix(),
            self.camera_manager.projection_matrix(),
            self.camera_manager.eye(),
            self.directional_light.to_uniform(),
            &point_lights,
        )
    }

    /// Material used to draw `object`
    pub fn material_for(&self, object: &Object) -> &Material {
        self.material_manager
            .get_material_for_object(object.material.as_deref())
    }

    /// Initializes GPU resources for all objects, materials and textures
    ///
    /// Must be called after the GPU context is available and before rendering.
    pub fn init_gpu_resources(&mut self, device: &Device, queue: &wgpu::Queue, layouts: &BindingLayouts) {
        self.update_transforms();
        for object in &mut self.objects {
            object.init_gpu_resources(device, &layouts.object);
        }
        self.material_manager
            .update_all_gpu_resources(device, queue, &layouts.material);
        self.textures.upload_all(device, queue, &layouts.texture);

        log::info!(
            "Scene ready: {} objects, {} triangles, {} textures",
            self.objects.len(),
            self.objects.iter().map(Object::triangle_count).sum::<u32>(),
            self.textures.len()
        );
    }

    /// Writes every object's model matrix to the GPU
    pub fn sync_gpu(&mut self, queue: &wgpu::Queue) {
        for object in self.objects.iter_mut().filter(|o| o.visible) {
            object.update_transform(queue);
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera_manager.camera.resize(width, height);
    }
}
