//! Global uniform bindings for camera and lighting
//!
//! One uniform block shared by every draw in a frame, bound to group 0.

use cgmath::{Matrix4, Point3};

use crate::{
    gfx::{
        camera::camera_utils::convert_matrix4_to_array,
        resources::lights::{
            DirectionalLightUniform, PointLightUniform, MAX_POINT_LIGHTS,
        },
    },
    wgpu_utils::{BindGroupBuilder, BindGroupLayoutWithDesc, UniformBuffer},
};

/// Per-frame global data.
///
/// MUST match the `Globals` struct in shader.wgsl exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub eye_position: [f32; 4],
    pub directional: DirectionalLightUniform,
    pub point_lights: [PointLightUniform; MAX_POINT_LIGHTS],
    pub point_light_count: u32,
    _padding: [u32; 3],
}

impl GlobalUBOContent {
    /// Packs camera and lights; lights beyond [`MAX_POINT_LIGHTS`] are dropped.
    pub fn new(
        view: Matrix4<f32>,
        projection: Matrix4<f32>,
        eye: Point3<f32>,
        directional: DirectionalLightUniform,
        point_lights: &[PointLightUniform],
    ) -> Self {
        if point_lights.len() > MAX_POINT_LIGHTS {
            log::warn!(
                "{} point lights in scene, only the first {} are shaded",
                point_lights.len(),
                MAX_POINT_LIGHTS
            );
        }

        let mut packed = [PointLightUniform::default(); MAX_POINT_LIGHTS];
        let count = point_lights.len().min(MAX_POINT_LIGHTS);
        packed[..count].copy_from_slice(&point_lights[..count]);

        Self {
            view: convert_matrix4_to_array(view),
            projection: convert_matrix4_to_array(projection),
            eye_position: [eye.x, eye.y, eye.z, 1.0],
            directional,
            point_lights: packed,
            point_light_count: count as u32,
            _padding: [0; 3],
        }
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Owns the global uniform buffer and its bind group
pub struct GlobalBindings {
    ubo: GlobalUBO,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, layout: &BindGroupLayoutWithDesc) -> Self {
        let ubo = GlobalUBO::new(device);
        let bind_group = BindGroupBuilder::new(layout)
            .resource(ubo.binding_resource())
            .create(device, "Global Bind Group");

        Self { ubo, bind_group }
    }

    /// Should be called once per frame before drawing
    pub fn update(&mut self, queue: &wgpu::Queue, content: GlobalUBOContent) {
        self.ubo.update_content(queue, content);
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
