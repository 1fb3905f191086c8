//! # Vertex Data Structures
//!
//! GPU vertex format shared by the cubes and imported models.

use crate::gfx::geometry::VertexLayout;

/// A 3D vertex with position, texture coordinates and normal.
///
/// Mirrors one record of [`VertexLayout::POSITION_TEX_NORMAL`], so an
/// interleaved buffer converts record by record.
///
/// # Memory Layout
///
/// The `#[repr(C)]` attribute ensures the struct has a C-compatible memory
/// layout, which is required for GPU buffer operations.
///
/// # Examples
///
/// ```no_run
/// use orrery::gfx::scene::vertex::Vertex3D;
///
/// let vertex = Vertex3D {
///     position: [0.0, 1.0, 0.0],
///     tex_coords: [0.5, 0.5],
///     normal: [0.0, 1.0, 0.0],
/// };
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    /// 3D position coordinates [x, y, z]
    pub position: [f32; 3],
    /// Texture coordinates [u, v]
    pub tex_coords: [f32; 2],
    /// 3D normal vector [nx, ny, nz] for lighting calculations
    pub normal: [f32; 3],
}

impl Vertex3D {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x3];

    /// Reads one interleaved [`VertexLayout::POSITION_TEX_NORMAL`] record.
    ///
    /// # Panics
    ///
    /// Panics if `record` is shorter than the layout stride.
    pub fn from_record(record: &[f32]) -> Self {
        let uv = VertexLayout::TEX_COORD_OFFSET;
        let n = VertexLayout::POSITION_TEX_NORMAL.normal_offset;
        Self {
            position: [record[0], record[1], record[2]],
            tex_coords: [record[uv], record[uv + 1]],
            normal: [record[n], record[n + 1], record[n + 2]],
        }
    }

    /// Returns the vertex buffer layout for wgpu rendering.
    ///
    /// - Attribute 0: Position (Float32x3)
    /// - Attribute 1: Texture coordinates (Float32x2)
    /// - Attribute 2: Normal (Float32x3)
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_matches_interleaved_stride() {
        assert_eq!(
            std::mem::size_of::<Vertex3D>(),
            VertexLayout::POSITION_TEX_NORMAL.stride * std::mem::size_of::<f32>()
        );
    }

    #[test]
    fn test_attribute_offsets() {
        let layout = Vertex3D::desc();
        let offsets: Vec<_> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 20]);
    }
}
