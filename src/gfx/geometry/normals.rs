//! # Smooth Vertex Normals
//!
//! Computes per-vertex averaged normals over an indexed triangle mesh stored
//! as a flat, interleaved `f32` vertex buffer.
//!
//! Each triangle contributes its unit face normal to all three of its
//! vertices; every vertex then normalizes the sum. Shared vertices therefore
//! receive one contribution per adjacent triangle, which is what gives the
//! cube meshes their rounded shading.
//!
//! ## Policy for degenerate input
//!
//! - A triangle whose edges are collinear has no face normal. It contributes
//!   the zero vector instead of propagating NaN.
//! - A vertex whose accumulated normal is zero (no triangles reference it, or
//!   every contribution was degenerate or cancelled out) keeps `(0, 0, 0)`.
//!
//! Triangle winding is trusted, not validated: an inconsistently wound
//! neighbour simply pulls the average the other way.
//!
//! ## Usage
//!
//! ```
//! use orrery::gfx::geometry::{normals::compute_smooth_normals, VertexLayout};
//!
//! // One triangle in the XY plane, layout: position, uv, normal
//! let mut vertices = vec![
//!     0.0, 0.0, 0.0,  0.0, 0.0,  0.0, 0.0, 0.0,
//!     1.0, 0.0, 0.0,  1.0, 0.0,  0.0, 0.0, 0.0,
//!     0.0, 1.0, 0.0,  0.0, 1.0,  0.0, 0.0, 0.0,
//! ];
//! compute_smooth_normals(&[0, 1, 2], &mut vertices, VertexLayout::POSITION_TEX_NORMAL)?;
//! assert_eq!(&vertices[5..8], &[0.0, 0.0, 1.0]);
//! # Ok::<(), orrery::error::NormalError>(())
//! ```

use cgmath::{InnerSpace, Vector3, Zero};

use super::VertexLayout;
use crate::error::NormalError;

/// Squared lengths below this are treated as the zero vector.
const ZERO_LENGTH_SQUARED: f32 = f32::EPSILON * f32::EPSILON;

/// Squared sine of the smallest edge angle still treated as a real triangle.
const COLLINEAR_SINE_SQUARED: f32 = f32::EPSILON * f32::EPSILON;

/// Accumulates face normals into each vertex and renormalizes them in place.
///
/// The normal sub-range of every record is used as the accumulator, so it
/// must be zero before the call. Use [`clear_normals`] first, or
/// [`recompute_smooth_normals`] which does both.
///
/// # Errors
///
/// Returns a [`NormalError`] if the layout is malformed, the buffers are
/// ragged, or an index points past the last vertex. All checks run before the
/// first write.
pub fn compute_smooth_normals(
    indices: &[u32],
    vertices: &mut [f32],
    layout: VertexLayout,
) -> Result<(), NormalError> {
    let vertex_count = validate(indices, vertices, layout)?;
    let stride = layout.stride;

    let mut degenerate = 0usize;
    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);

        let p0 = read_vec3(vertices, i0 * stride);
        let e1 = read_vec3(vertices, i1 * stride) - p0;
        let e2 = read_vec3(vertices, i2 * stride) - p0;

        let face_normal = match face_normal(e1, e2) {
            Some(n) => n,
            None => {
                degenerate += 1;
                continue;
            }
        };

        for vertex in [i0, i1, i2] {
            let at = vertex * stride + layout.normal_offset;
            let sum = read_vec3(vertices, at) + face_normal;
            write_vec3(vertices, at, sum);
        }
    }

    let mut zero_normals = 0usize;
    for vertex in 0..vertex_count {
        let at = vertex * stride + layout.normal_offset;
        match normalize_or_zero(read_vec3(vertices, at)) {
            Some(n) => write_vec3(vertices, at, n),
            None => {
                zero_normals += 1;
                write_vec3(vertices, at, Vector3::zero());
            }
        }
    }

    log::debug!(
        "smooth normals: {} triangles ({} degenerate), {} vertices ({} without a normal)",
        indices.len() / 3,
        degenerate,
        vertex_count,
        zero_normals
    );

    Ok(())
}

/// Zeroes the normal sub-range of every vertex record.
pub fn clear_normals(vertices: &mut [f32], layout: VertexLayout) -> Result<(), NormalError> {
    validate(&[], vertices, layout)?;
    for record in vertices.chunks_exact_mut(layout.stride) {
        record[layout.normal_offset..layout.normal_offset + 3].fill(0.0);
    }
    Ok(())
}

/// Clears any previous normals, then runs [`compute_smooth_normals`].
///
/// Safe to call repeatedly on the same buffer.
pub fn recompute_smooth_normals(
    indices: &[u32],
    vertices: &mut [f32],
    layout: VertexLayout,
) -> Result<(), NormalError> {
    // Validate against the index buffer before clearing anything.
    validate(indices, vertices, layout)?;
    clear_normals(vertices, layout)?;
    compute_smooth_normals(indices, vertices, layout)
}

/// Checks every precondition and returns the vertex count.
fn validate(indices: &[u32], vertices: &[f32], layout: VertexLayout) -> Result<usize, NormalError> {
    let VertexLayout {
        stride,
        normal_offset,
    } = layout;

    if stride < 3 {
        return Err(NormalError::InvalidStride { stride });
    }
    if normal_offset < 3 {
        return Err(NormalError::NormalOverlapsPosition { normal_offset });
    }
    if normal_offset + 3 > stride {
        return Err(NormalError::NormalOutOfRecord {
            normal_offset,
            stride,
        });
    }
    if vertices.len() % stride != 0 {
        return Err(NormalError::RaggedVertexBuffer {
            len: vertices.len(),
            stride,
        });
    }
    if indices.len() % 3 != 0 {
        return Err(NormalError::IncompleteTriangle { len: indices.len() });
    }

    let vertex_count = vertices.len() / stride;
    if let Some((position, &index)) = indices
        .iter()
        .enumerate()
        .find(|&(_, &index)| index as usize >= vertex_count)
    {
        return Err(NormalError::IndexOutOfRange {
            triangle: position / 3,
            index,
            vertex_count,
        });
    }

    Ok(vertex_count)
}

/// Unit normal of the triangle spanned by `e1` and `e2`.
///
/// Collinearity is judged relative to the edge lengths, so tiny but
/// well-formed triangles still get a normal.
fn face_normal(e1: Vector3<f32>, e2: Vector3<f32>) -> Option<Vector3<f32>> {
    let cross = e1.cross(e2);
    let length_squared = cross.magnitude2();
    let scale = e1.magnitude2() * e2.magnitude2();
    if length_squared == 0.0
        || !length_squared.is_finite()
        || length_squared <= COLLINEAR_SINE_SQUARED * scale
    {
        None
    } else {
        Some(cross / length_squared.sqrt())
    }
}

fn normalize_or_zero(v: Vector3<f32>) -> Option<Vector3<f32>> {
    let length_squared = v.magnitude2();
    if length_squared <= ZERO_LENGTH_SQUARED || !length_squared.is_finite() {
        None
    } else {
        Some(v / length_squared.sqrt())
    }
}

fn read_vec3(data: &[f32], at: usize) -> Vector3<f32> {
    Vector3::new(data[at], data[at + 1], data[at + 2])
}

fn write_vec3(data: &mut [f32], at: usize, v: Vector3<f32>) {
    data[at..at + 3].copy_from_slice(&[v.x, v.y, v.z]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::primitives::{generate_cube, CUBE_INDICES};

    const LAYOUT: VertexLayout = VertexLayout::POSITION_TEX_NORMAL;
    const TOLERANCE: f32 = 1e-5;

    /// Builds a position/uv/normal buffer with zeroed uv and normal slots.
    fn interleave(positions: &[[f32; 3]]) -> Vec<f32> {
        positions
            .iter()
            .flat_map(|p| [p[0], p[1], p[2], 0.0, 0.0, 0.0, 0.0, 0.0])
            .collect()
    }

    fn normal_at(vertices: &[f32], vertex: usize) -> Vector3<f32> {
        read_vec3(vertices, vertex * LAYOUT.stride + LAYOUT.normal_offset)
    }

    fn assert_close(actual: Vector3<f32>, expected: Vector3<f32>) {
        assert!(
            (actual - expected).magnitude() < TOLERANCE,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn test_single_triangle_gets_face_normal() {
        let positions = [[0.0, 0.0, 0.0], [2.0, 0.0, 1.0], [0.5, 3.0, -1.0]];
        let mut vertices = interleave(&positions);

        compute_smooth_normals(&[0, 1, 2], &mut vertices, LAYOUT).unwrap();

        let p = positions.map(|p| Vector3::new(p[0], p[1], p[2]));
        let expected = (p[1] - p[0]).cross(p[2] - p[0]).normalize();
        for vertex in 0..3 {
            assert_close(normal_at(&vertices, vertex), expected);
        }
    }

    #[test]
    fn test_positions_and_tex_coords_untouched() {
        let mut vertices = vec![
            0.0, 0.0, 0.0, 0.25, 0.75, 0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, 0.5, 0.5, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0,
        ];
        let before = vertices.clone();

        compute_smooth_normals(&[0, 1, 2], &mut vertices, LAYOUT).unwrap();

        for (record_before, record_after) in before.chunks(8).zip(vertices.chunks(8)) {
            assert_eq!(record_before[..5], record_after[..5]);
        }
    }

    #[test]
    fn test_cube_corner_normals() {
        let mut cube = generate_cube();
        cube.recompute_normals().unwrap();

        // Corner (1, 1, 1) sits on the split diagonal of all three faces
        let expected = Vector3::new(1.0, 1.0, 1.0).normalize();
        assert_close(normal_at(&cube.vertices, 2), expected);
        assert_close(normal_at(&cube.vertices, 5), -expected);
        assert!((normal_at(&cube.vertices, 2).x - 0.577).abs() < 1e-3);
    }

    #[test]
    fn test_closed_mesh_normals_are_unit_and_outward() {
        let mut cube = generate_cube();
        cube.recompute_normals().unwrap();

        for vertex in 0..cube.vertex_count() {
            let normal = normal_at(&cube.vertices, vertex);
            let position = read_vec3(&cube.vertices, vertex * LAYOUT.stride);
            assert!((normal.magnitude() - 1.0).abs() < TOLERANCE);
            assert!(normal.dot(position) > 0.0, "vertex {} points inward", vertex);
        }
    }

    #[test]
    fn test_repeated_runs_on_zeroed_buffers_match() {
        let cube = generate_cube();

        let mut first = cube.vertices.clone();
        compute_smooth_normals(&CUBE_INDICES, &mut first, LAYOUT).unwrap();
        let mut second = cube.vertices.clone();
        compute_smooth_normals(&CUBE_INDICES, &mut second, LAYOUT).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut vertices = generate_cube().vertices;
        recompute_smooth_normals(&CUBE_INDICES, &mut vertices, LAYOUT).unwrap();
        let once = vertices.clone();
        recompute_smooth_normals(&CUBE_INDICES, &mut vertices, LAYOUT).unwrap();

        assert_eq!(once, vertices);
    }

    #[test]
    fn test_degenerate_triangle_produces_no_nan() {
        // Two identical vertices
        let mut vertices = interleave(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [1.0, 1.0, 1.0]]);

        compute_smooth_normals(&[0, 1, 2], &mut vertices, LAYOUT).unwrap();

        assert!(vertices.iter().all(|v| v.is_finite()));
        for vertex in 0..3 {
            assert_eq!(normal_at(&vertices, vertex), Vector3::zero());
        }
    }

    #[test]
    fn test_degenerate_triangle_does_not_disturb_neighbours() {
        let mut vertices = interleave(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [2.0, 0.0, 0.0],
        ]);

        // Second triangle is collinear along the X axis
        compute_smooth_normals(&[0, 1, 2, 0, 1, 3], &mut vertices, LAYOUT).unwrap();

        assert_close(normal_at(&vertices, 0), Vector3::unit_z());
        assert_close(normal_at(&vertices, 1), Vector3::unit_z());
        assert_eq!(normal_at(&vertices, 3), Vector3::zero());
    }

    #[test]
    fn test_tiny_triangle_still_gets_a_normal() {
        // Legs of 0.2 mm in metre units
        let mut vertices = interleave(&[[0.0, 0.0, 0.0], [2e-4, 0.0, 0.0], [0.0, 2e-4, 0.0]]);

        compute_smooth_normals(&[0, 1, 2], &mut vertices, LAYOUT).unwrap();

        for vertex in 0..3 {
            assert_close(normal_at(&vertices, vertex), Vector3::unit_z());
        }
    }

    #[test]
    fn test_nearly_collinear_long_triangle_is_degenerate() {
        let mut vertices = interleave(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 1e-9, 0.0]]);

        compute_smooth_normals(&[0, 1, 2], &mut vertices, LAYOUT).unwrap();

        assert!(vertices.iter().all(|v| v.is_finite()));
        assert_eq!(normal_at(&vertices, 0), Vector3::zero());
    }

    #[test]
    fn test_unreferenced_vertex_keeps_zero_normal() {
        let mut vertices = interleave(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [5.0, 5.0, 5.0],
        ]);

        compute_smooth_normals(&[0, 1, 2], &mut vertices, LAYOUT).unwrap();

        assert_eq!(normal_at(&vertices, 3), Vector3::zero());
        assert!(vertices.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_opposing_contributions_cancel_to_zero() {
        let mut vertices = interleave(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);

        // Same triangle, both windings
        compute_smooth_normals(&[0, 1, 2, 0, 2, 1], &mut vertices, LAYOUT).unwrap();

        for vertex in 0..3 {
            assert_eq!(normal_at(&vertices, vertex), Vector3::zero());
        }
    }

    #[test]
    fn test_custom_layout() {
        // position + normal only
        let layout = VertexLayout::new(6, 3);
        let mut vertices = vec![
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, 0.0, 0.0,
        ];

        compute_smooth_normals(&[0, 1, 2], &mut vertices, layout).unwrap();

        assert_eq!(&vertices[3..6], &[-1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_out_of_range_index_is_rejected_without_writes() {
        let mut vertices = interleave(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let before = vertices.clone();

        let result = compute_smooth_normals(&[0, 1, 2, 0, 2, 7], &mut vertices, LAYOUT);

        assert_eq!(
            result,
            Err(NormalError::IndexOutOfRange {
                triangle: 1,
                index: 7,
                vertex_count: 3
            })
        );
        assert_eq!(vertices, before);
    }

    #[test]
    fn test_malformed_layouts_are_rejected() {
        let mut vertices = vec![0.0; 24];

        assert_eq!(
            compute_smooth_normals(&[], &mut vertices, VertexLayout::new(2, 0)),
            Err(NormalError::InvalidStride { stride: 2 })
        );
        assert_eq!(
            compute_smooth_normals(&[], &mut vertices, VertexLayout::new(8, 1)),
            Err(NormalError::NormalOverlapsPosition { normal_offset: 1 })
        );
        assert_eq!(
            compute_smooth_normals(&[], &mut vertices, VertexLayout::new(8, 6)),
            Err(NormalError::NormalOutOfRecord {
                normal_offset: 6,
                stride: 8
            })
        );
        assert_eq!(
            compute_smooth_normals(&[], &mut vertices, VertexLayout::new(7, 3)),
            Err(NormalError::RaggedVertexBuffer { len: 24, stride: 7 })
        );
        assert_eq!(
            compute_smooth_normals(&[0, 1], &mut vertices, LAYOUT),
            Err(NormalError::IncompleteTriangle { len: 2 })
        );
    }

    #[test]
    fn test_empty_buffers_are_valid() {
        let mut vertices: Vec<f32> = Vec::new();
        assert!(compute_smooth_normals(&[], &mut vertices, LAYOUT).is_ok());
    }

    #[test]
    fn test_clear_normals_only_touches_normal_slots() {
        let mut vertices = vec![1.0; 16];
        clear_normals(&mut vertices, LAYOUT).unwrap();

        assert_eq!(
            vertices,
            vec![
                1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, //
                1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0
            ]
        );
    }
}
