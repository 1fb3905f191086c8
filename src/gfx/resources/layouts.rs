//! Bind group layouts shared by the Phong pipeline and the resources bound to it
//!
//! | group | contents                               | stages   |
//! |-------|----------------------------------------|----------|
//! | 0     | globals: camera, eye, lights           | both     |
//! | 1     | object: model and normal matrix        | vertex   |
//! | 2     | material: specular intensity/shininess | fragment |
//! | 3     | diffuse texture and sampler            | fragment |

use crate::wgpu_utils::{binding_types, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};

pub struct BindingLayouts {
    pub globals: BindGroupLayoutWithDesc,
    pub object: BindGroupLayoutWithDesc,
    pub material: BindGroupLayoutWithDesc,
    pub texture: BindGroupLayoutWithDesc,
}

impl BindingLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let globals = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group Layout");

        let object = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(device, "Object Bind Group Layout");

        let material = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .create(device, "Material Bind Group Layout");

        let texture = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Texture Bind Group Layout");

        Self {
            globals,
            object,
            material,
            texture,
        }
    }

    /// Layouts in bind group order
    pub fn as_array(&self) -> [&wgpu::BindGroupLayout; 4] {
        [
            &self.globals.layout,
            &self.object.layout,
            &self.material.layout,
            &self.texture.layout,
        ]
    }
}
