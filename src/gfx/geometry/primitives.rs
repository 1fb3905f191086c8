//! # Primitive Shape Generation
//!
//! The textured cube used for every orbiting object. Its eight corners are
//! shared between faces, so the smooth-normal pass rounds its shading.

use super::{normals::compute_smooth_normals, InterleavedMesh};
use crate::error::NormalError;

/// Cube corners from -1 to 1 on every axis, with per-corner UVs.
#[rustfmt::skip]
pub const CUBE_VERTICES: [f32; 64] = [
    // x     y     z      u    v     nx   ny   nz
    -1.0,  1.0,  1.0,   0.0, 1.0,   0.0, 0.0, 0.0,
    -1.0, -1.0,  1.0,   0.0, 0.0,   0.0, 0.0, 0.0,
     1.0,  1.0,  1.0,   1.0, 1.0,   0.0, 0.0, 0.0,
     1.0, -1.0,  1.0,   1.0, 0.0,   0.0, 0.0, 0.0,
    -1.0,  1.0, -1.0,   0.0, 1.0,   0.0, 0.0, 0.0,
    -1.0, -1.0, -1.0,   0.0, 0.0,   0.0, 0.0, 0.0,
     1.0,  1.0, -1.0,   1.0, 1.0,   0.0, 0.0, 0.0,
     1.0, -1.0, -1.0,   1.0, 0.0,   0.0, 0.0, 0.0,
];

/// Two counter-clockwise triangles per face, viewed from outside.
///
/// Each face is split along the diagonal through (1, 1, 1) or (-1, -1, -1),
/// so those two corners receive two contributions from each adjacent face.
#[rustfmt::skip]
pub const CUBE_INDICES: [u32; 36] = [
    1, 3, 2,   1, 2, 0,   // +Z
    3, 7, 2,   7, 6, 2,   // +X
    0, 2, 4,   2, 6, 4,   // +Y
    5, 4, 6,   5, 6, 7,   // -Z
    5, 1, 0,   5, 0, 4,   // -X
    5, 7, 3,   5, 3, 1,   // -Y
];

/// Generate the shared-corner cube centered at the origin
///
/// Normals are left zeroed; run
/// [`InterleavedMesh::recompute_normals`] before upload.
pub fn generate_cube() -> InterleavedMesh {
    InterleavedMesh::new(CUBE_VERTICES.to_vec(), CUBE_INDICES.to_vec())
}

/// Generate the cube with smoothed normals already computed.
pub fn generate_smooth_cube() -> Result<InterleavedMesh, NormalError> {
    let mut cube = generate_cube();
    compute_smooth_normals(&cube.indices, &mut cube.vertices, InterleavedMesh::LAYOUT)?;
    Ok(cube)
}
