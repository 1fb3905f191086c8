//! Renderable objects and their GPU buffers

use std::ops::Range;

use cgmath::{Matrix, Matrix3, Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;

use crate::{
    gfx::{
        camera::camera_utils::convert_matrix4_to_array,
        geometry::InterleavedMesh,
        resources::{material::MaterialId, Material, TextureId, TextureLibrary},
        scene::{graph::NodeId, vertex::Vertex3D},
    },
    wgpu_utils::{BindGroupBuilder, BindGroupLayoutWithDesc, UniformBuffer},
};

/// Indexed triangle mesh, CPU data plus buffers once uploaded
pub struct Mesh {
    pub name: String,
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    index_count: u32,
    /// Diffuse map from the model file; overrides the object's texture
    pub texture: Option<TextureId>,
}

impl Mesh {
    /// Wraps finalized interleaved data. Normals must already be computed.
    pub fn from_interleaved(name: &str, mesh: &InterleavedMesh) -> Self {
        Self {
            name: name.to_string(),
            vertices: mesh.to_gpu_vertices(),
            indices: mesh.indices.clone(),
            vertex_buffer: None,
            index_buffer: None,
            index_count: mesh.indices.len() as u32,
            texture: None,
        }
    }

    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn is_uploaded(&self) -> bool {
        self.vertex_buffer.is_some() && self.index_buffer.is_some()
    }

    /// Creates the vertex and index buffers; later calls are no-ops
    pub fn upload(&mut self, device: &wgpu::Device) {
        if self.is_uploaded() || self.index_count == 0 {
            return;
        }

        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Vertex Buffer: {}", self.name)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Index Buffer: {}", self.name)),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));

        log::debug!(
            "Uploaded mesh '{}': {} vertices, {} triangles",
            self.name,
            self.vertices.len(),
            self.index_count / 3
        );
    }
}

/// Per-object uniform block. MUST match `Object` in shader.wgsl.
///
/// `normal_matrix` is a WGSL `mat3x3<f32>`, whose columns are padded to 16 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 3],
}

impl ObjectUniform {
    pub fn new(model: Matrix4<f32>) -> Self {
        let normal = normal_matrix(model);
        let column = |c: cgmath::Vector3<f32>| [c.x, c.y, c.z, 0.0];
        Self {
            model: convert_matrix4_to_array(model),
            normal_matrix: [column(normal.x), column(normal.y), column(normal.z)],
        }
    }
}

/// Inverse transpose of the upper 3x3, so normals stay perpendicular under
/// non-uniform scale. Falls back to the plain 3x3 for singular matrices.
pub fn normal_matrix(model: Matrix4<f32>) -> Matrix3<f32> {
    let upper = Matrix3::from_cols(model.x.truncate(), model.y.truncate(), model.z.truncate());
    upper
        .invert()
        .map(|inverse| inverse.transpose())
        .unwrap_or(upper)
}

pub struct ObjectGpuResources {
    ubo: UniformBuffer<ObjectUniform>,
    bind_group: wgpu::BindGroup,
}

/// A drawable bound to a scene graph node
pub struct Object {
    pub name: String,
    pub node: NodeId,
    pub meshes: Vec<Mesh>,
    pub material: Option<MaterialId>,
    /// Texture for meshes without their own diffuse map
    pub texture: Option<TextureId>,
    pub visible: bool,
    /// World matrix from the last scene update
    pub model_matrix: Matrix4<f32>,
    pub gpu_resources: Option<ObjectGpuResources>,
}

impl Object {
    pub fn new(name: &str, node: NodeId, meshes: Vec<Mesh>) -> Self {
        Self {
            name: name.to_string(),
            node,
            meshes,
            material: None,
            texture: None,
            visible: true,
            model_matrix: Matrix4::identity(),
            gpu_resources: None,
        }
    }

    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn triangle_count(&self) -> u32 {
        self.meshes.iter().map(|m| m.index_count / 3).sum()
    }

    /// Texture a mesh of this object samples from
    pub fn texture_for(&self, mesh: &Mesh) -> TextureId {
        mesh.texture.or(self.texture).unwrap_or(TextureId::WHITE)
    }

    pub fn init_gpu_resources(&mut self, device: &wgpu::Device, layout: &BindGroupLayoutWithDesc) {
        for mesh in &mut self.meshes {
            mesh.upload(device);
        }

        if self.gpu_resources.is_none() {
            let ubo = UniformBuffer::new_with_data(device, &ObjectUniform::new(self.model_matrix));
            let bind_group = BindGroupBuilder::new(layout)
                .resource(ubo.binding_resource())
                .create(device, &format!("Object Bind Group: {}", self.name));
            self.gpu_resources = Some(ObjectGpuResources { ubo, bind_group });
        }
    }

    /// Writes the current model matrix to the GPU
    pub fn update_transform(&mut self, queue: &wgpu::Queue) {
        let uniform = ObjectUniform::new(self.model_matrix);
        if let Some(gpu) = &mut self.gpu_resources {
            gpu.ubo.update_content(queue, uniform);
        }
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources.as_ref().map(|gpu| &gpu.bind_group)
    }
}

pub trait DrawObject<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_mesh_instanced(&mut self, mesh: &'a Mesh, instances: Range<u32>);
    /// Binds groups 1-3 and draws every mesh. Group 0 must already be set.
    fn draw_object(&mut self, object: &'a Object, material: &'a Material, textures: &'a TextureLibrary);
}

impl<'a, 'b> DrawObject<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b Mesh, instances: Range<u32>) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            return;
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, instances);
    }

    fn draw_object(&mut self, object: &'b Object, material: &'b Material, textures: &'b TextureLibrary) {
        let (Some(object_group), Some(material_group)) = (object.bind_group(), material.bind_group())
        else {
            return;
        };

        self.set_bind_group(1, object_group, &[]);
        self.set_bind_group(2, material_group, &[]);
        for mesh in &object.meshes {
            if let Some(texture_group) = textures.bind_group(object.texture_for(mesh)) {
                self.set_bind_group(3, texture_group, &[]);
                self.draw_mesh(mesh);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_smooth_cube;
    use cgmath::{InnerSpace, Vector3};

    fn node() -> NodeId {
        let mut graph = crate::gfx::scene::graph::SceneGraph::new();
        graph.add_node("root", None, Vec::new()).unwrap()
    }

    #[test]
    fn test_object_uniform_size() {
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 112);
    }

    #[test]
    fn test_normal_matrix_undoes_nonuniform_scale() {
        let model = Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0);
        let n = normal_matrix(model) * Vector3::new(1.0, 1.0, 0.0);
        // A 45 degree normal leans towards the unstretched axis
        assert!((n.x - 0.5).abs() < 1e-6);
        assert!((n.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normal_matrix_of_rotation_is_rotation() {
        let model = Matrix4::from_angle_y(cgmath::Deg(30.0)) * Matrix4::from_scale(0.5);
        let n = (normal_matrix(model) * Vector3::unit_x()).normalize();
        let expected = (Matrix4::from_angle_y(cgmath::Deg(30.0)) * Vector3::unit_x().extend(0.0)).truncate();
        assert!((n - expected).magnitude() < 1e-5);
    }

    #[test]
    fn test_singular_model_does_not_panic() {
        let uniform = ObjectUniform::new(Matrix4::from_scale(0.0));
        assert!(uniform.normal_matrix.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_mesh_texture_overrides_object_texture() {
        let cube = generate_smooth_cube().unwrap();
        let mut library = TextureLibrary::new();
        let object_texture = library.add_image("object", crate::gfx::resources::texture_resource::white_image());
        let mesh_texture = library.add_image("mesh", crate::gfx::resources::texture_resource::white_image());

        let object = Object::new(
            "cube",
            node(),
            vec![
                Mesh::from_interleaved("plain", &cube),
                Mesh::from_interleaved("mapped", &cube).with_texture(mesh_texture),
            ],
        )
        .with_texture(object_texture);

        assert_eq!(object.texture_for(&object.meshes[0]), object_texture);
        assert_eq!(object.texture_for(&object.meshes[1]), mesh_texture);
        assert_eq!(object.triangle_count(), 24);
    }

    #[test]
    fn test_untextured_mesh_uses_white() {
        let cube = generate_smooth_cube().unwrap();
        let object = Object::new("cube", node(), vec![Mesh::from_interleaved("cube", &cube)]);
        assert_eq!(object.texture_for(&object.meshes[0]), TextureId::WHITE);
        assert_eq!(object.meshes[0].vertices().len(), 8);
    }
}
