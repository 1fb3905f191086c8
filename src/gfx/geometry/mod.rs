//! # Procedural Geometry
//!
//! CPU-side mesh data in the interleaved layout the renderer uploads, the
//! smooth-normal pass that finalizes it, and the cube primitive.
//!
//! ## Usage
//!
//! ```rust
//! use orrery::gfx::geometry::generate_cube;
//!
//! let mut cube = generate_cube();
//! cube.recompute_normals().expect("cube indices are in range");
//! assert_eq!(cube.triangle_count(), 12);
//! ```

pub mod normals;
pub mod primitives;

pub use normals::{clear_normals, compute_smooth_normals, recompute_smooth_normals};
pub use primitives::*;

use crate::{error::NormalError, gfx::scene::vertex::Vertex3D};

/// Where the normal lives inside each interleaved vertex record.
///
/// Positions always occupy the first three floats of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    /// Floats per vertex record
    pub stride: usize,
    /// Offset of the 3-float normal within a record
    pub normal_offset: usize,
}

impl VertexLayout {
    /// Position (3), texture coordinates (2), normal (3).
    pub const POSITION_TEX_NORMAL: Self = Self {
        stride: 8,
        normal_offset: 5,
    };

    /// Offset of the texture coordinates in [`Self::POSITION_TEX_NORMAL`].
    pub const TEX_COORD_OFFSET: usize = 3;

    pub const fn new(stride: usize, normal_offset: usize) -> Self {
        Self {
            stride,
            normal_offset,
        }
    }
}

/// Mesh data ready for the normal pass and GPU upload
///
/// Vertices are stored as a flat `f32` buffer in
/// [`VertexLayout::POSITION_TEX_NORMAL`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct InterleavedMesh {
    /// Flat vertex records: position, texture coordinates, normal
    pub vertices: Vec<f32>,
    /// Triangle indices, three per face
    pub indices: Vec<u32>,
}

impl InterleavedMesh {
    pub const LAYOUT: VertexLayout = VertexLayout::POSITION_TEX_NORMAL;

    pub fn new(vertices: Vec<f32>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Builds a mesh from separate attribute streams.
    ///
    /// Missing texture coordinates default to `(0, 0)` and missing normals to
    /// zero, ready for [`Self::recompute_normals`].
    pub fn from_attributes(
        positions: &[[f32; 3]],
        tex_coords: &[[f32; 2]],
        normals: &[[f32; 3]],
        indices: Vec<u32>,
    ) -> Self {
        let vertices = positions
            .iter()
            .enumerate()
            .flat_map(|(i, p)| {
                let uv = tex_coords.get(i).copied().unwrap_or([0.0, 0.0]);
                let n = normals.get(i).copied().unwrap_or([0.0, 0.0, 0.0]);
                [p[0], p[1], p[2], uv[0], uv[1], n[0], n[1], n[2]]
            })
            .collect();

        Self { vertices, indices }
    }

    /// Get the number of vertices in this mesh
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / Self::LAYOUT.stride
    }

    /// Get the number of triangles in this mesh
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Replaces every normal with the smoothed average of its adjacent faces.
    pub fn recompute_normals(&mut self) -> Result<(), NormalError> {
        recompute_smooth_normals(&self.indices, &mut self.vertices, Self::LAYOUT)
    }

    /// Converts the interleaved records into GPU vertices.
    pub fn to_gpu_vertices(&self) -> Vec<Vertex3D> {
        self.vertices
            .chunks_exact(Self::LAYOUT.stride)
            .map(Vertex3D::from_record)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_attributes_fills_missing_streams() {
        let mesh = InterleavedMesh::from_attributes(
            &[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
            &[[0.5, 0.25]],
            &[],
            vec![],
        );

        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(
            mesh.vertices,
            vec![
                1.0, 2.0, 3.0, 0.5, 0.25, 0.0, 0.0, 0.0, //
                4.0, 5.0, 6.0, 0.0, 0.0, 0.0, 0.0, 0.0
            ]
        );
    }

    #[test]
    fn test_gpu_vertices_follow_layout() {
        let mesh = InterleavedMesh::new(vec![1.0, 2.0, 3.0, 0.1, 0.2, 0.0, 1.0, 0.0], vec![]);
        let vertices = mesh.to_gpu_vertices();

        assert_eq!(vertices.len(), 1);
        assert_eq!(vertices[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(vertices[0].tex_coords, [0.1, 0.2]);
        assert_eq!(vertices[0].normal, [0.0, 1.0, 0.0]);
    }
}
