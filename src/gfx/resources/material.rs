//! Phong materials
//!
//! Materials are stored in [`MaterialManager`] and objects reference them by
//! name. Each material owns one small uniform buffer with its specular terms.

use std::collections::HashMap;

use wgpu::Device;

use crate::wgpu_utils::{BindGroupBuilder, BindGroupLayoutWithDesc, UniformBuffer};

/// Material ID for referencing materials
pub type MaterialId = String;

/// GPU uniform data for materials. MUST match `Material` in shader.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub specular_intensity: f32,
    pub shininess: f32,
    _padding: [f32; 2],
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Specular response of a surface
pub struct Material {
    pub name: String,
    pub specular_intensity: f32,
    pub shininess: f32,

    material_ubo: Option<MaterialUBO>,
    bind_group: Option<wgpu::BindGroup>,
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default", 0.5, 32.0)
    }
}

impl Material {
    pub fn new(name: &str, specular_intensity: f32, shininess: f32) -> Self {
        Self {
            name: name.to_string(),
            specular_intensity: specular_intensity.max(0.0),
            shininess: shininess.max(1.0),
            material_ubo: None,
            bind_group: None,
        }
    }

    /// Strong, tight highlight used for the cubes
    pub fn shiny() -> Self {
        Self::new("shiny", 4.0, 256.0)
    }

    /// Weak, broad highlight used for the planet
    pub fn dull() -> Self {
        Self::new("dull", 0.3, 3.0)
    }

    pub fn uniform(&self) -> MaterialUniform {
        MaterialUniform {
            specular_intensity: self.specular_intensity,
            shininess: self.shininess,
            _padding: [0.0; 2],
        }
    }

    /// Creates the uniform buffer and bind group on first use, then syncs
    /// the current properties.
    pub fn update_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
    ) {
        let uniform = self.uniform();
        let ubo = self
            .material_ubo
            .get_or_insert_with(|| MaterialUBO::new_with_data(device, &uniform));

        if self.bind_group.is_none() {
            self.bind_group = Some(
                BindGroupBuilder::new(layout)
                    .resource(ubo.binding_resource())
                    .create(device, &format!("Material Bind Group: {}", self.name)),
            );
        }

        ubo.update_content(queue, uniform);
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}

/// Central storage for all materials
pub struct MaterialManager {
    materials: HashMap<MaterialId, Material>,
    default_material: Material,
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialManager {
    pub fn new() -> Self {
        Self {
            materials: HashMap::new(),
            default_material: Material::default(),
        }
    }

    /// Adds a material, replacing any existing one with the same name
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = material.name.clone();
        self.materials.insert(id.clone(), material);
        id
    }

    pub fn get_material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn get_material_mut(&mut self, id: &str) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    /// Gets material for an object with fallback to default
    pub fn get_material_for_object(&self, material_id: Option<&str>) -> &Material {
        material_id
            .and_then(|id| self.get_material(id))
            .unwrap_or(&self.default_material)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Updates GPU resources for all materials, including the default
    pub fn update_all_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
    ) {
        self.default_material
            .update_gpu_resources(device, queue, layout);
        for material in self.materials.values_mut() {
            material.update_gpu_resources(device, queue, layout);
        }
    }
}
