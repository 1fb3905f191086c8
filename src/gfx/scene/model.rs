//! OBJ import
//!
//! Models are triangulated and re-indexed to a single index per vertex, then
//! packed into the interleaved layout. Meshes without normals get smoothed
//! normals from the shared-vertex topology.

use std::path::{Path, PathBuf};

use crate::{
    error::AssetError,
    gfx::geometry::{compute_smooth_normals, InterleavedMesh},
};

/// One mesh of an imported model
#[derive(Debug, Clone)]
pub struct ImportedMesh {
    pub name: String,
    pub mesh: InterleavedMesh,
    /// Diffuse map named by the mesh's material, resolved against the model directory
    pub diffuse_texture: Option<PathBuf>,
}

pub fn load_obj(path: &Path) -> Result<Vec<ImportedMesh>, AssetError> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| AssetError::Model {
        path: path.to_path_buf(),
        source,
    })?;

    let materials = materials.unwrap_or_else(|err| {
        log::debug!("No materials for '{}': {}", path.display(), err);
        Vec::new()
    });
    let model_dir = path.parent().unwrap_or_else(|| Path::new(""));

    let mut meshes = Vec::with_capacity(models.len());
    for model in models {
        let diffuse_texture = model
            .mesh
            .material_id
            .and_then(|id| materials.get(id))
            .and_then(|material| material.diffuse_texture.as_deref())
            .filter(|texture| !texture.is_empty())
            .map(|texture| model_dir.join(texture));

        let mesh = interleave(&model.mesh)?;
        log::info!(
            "Imported mesh '{}' from '{}': {} vertices, {} triangles",
            model.name,
            path.display(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );

        meshes.push(ImportedMesh {
            name: model.name,
            mesh,
            diffuse_texture,
        });
    }

    if meshes.is_empty() {
        return Err(AssetError::EmptyModel {
            path: path.to_path_buf(),
        });
    }
    Ok(meshes)
}

/// Packs tobj's separate streams into the standard interleaved layout.
///
/// File normals are kept when present for every vertex; otherwise smoothed
/// normals are computed.
pub fn interleave(mesh: &tobj::Mesh) -> Result<InterleavedMesh, AssetError> {
    let positions: Vec<[f32; 3]> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();
    // OBJ v runs bottom-up; wgpu samples with v = 0 at the top row
    let tex_coords: Vec<[f32; 2]> = mesh
        .texcoords
        .chunks_exact(2)
        .map(|t| [t[0], 1.0 - t[1]])
        .collect();

    let has_normals = !mesh.normals.is_empty() && mesh.normals.len() == mesh.positions.len();
    let normals: Vec<[f32; 3]> = if has_normals {
        mesh.normals
            .chunks_exact(3)
            .map(|n| [n[0], n[1], n[2]])
            .collect()
    } else {
        Vec::new()
    };

    let mut interleaved =
        InterleavedMesh::from_attributes(&positions, &tex_coords, &normals, mesh.indices.clone());
    if !has_normals {
        compute_smooth_normals(
            &interleaved.indices,
            &mut interleaved.vertices,
            InterleavedMesh::LAYOUT,
        )?;
    }
    Ok(interleaved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NormalError;
    use crate::gfx::geometry::VertexLayout;

    fn quad(normals: Vec<f32>) -> tobj::Mesh {
        tobj::Mesh {
            positions: vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                1.0, 1.0, 0.0, //
                0.0, 1.0, 0.0,
            ],
            texcoords: vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
            normals,
            indices: vec![0, 1, 2, 0, 2, 3],
            ..Default::default()
        }
    }

    fn normal_of(mesh: &InterleavedMesh, vertex: usize) -> [f32; 3] {
        let start = vertex * InterleavedMesh::LAYOUT.stride + InterleavedMesh::LAYOUT.normal_offset;
        [
            mesh.vertices[start],
            mesh.vertices[start + 1],
            mesh.vertices[start + 2],
        ]
    }

    #[test]
    fn test_missing_normals_are_computed() {
        let mesh = interleave(&quad(Vec::new())).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        for vertex in 0..4 {
            assert_eq!(normal_of(&mesh, vertex), [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_file_normals_are_kept() {
        let normals = [0.0, 1.0, 0.0].repeat(4);
        let mesh = interleave(&quad(normals)).unwrap();

        assert_eq!(normal_of(&mesh, 2), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_tex_coords_are_interleaved() {
        let mesh = interleave(&quad(Vec::new())).unwrap();
        let uv = |vertex: usize| {
            let start = vertex * InterleavedMesh::LAYOUT.stride + VertexLayout::TEX_COORD_OFFSET;
            [mesh.vertices[start], mesh.vertices[start + 1]]
        };

        // v is flipped so the bottom-left OBJ corner samples the image's last row
        assert_eq!(uv(0), [0.0, 1.0]);
        assert_eq!(uv(1), [1.0, 1.0]);
        assert_eq!(uv(2), [1.0, 0.0]);
        assert_eq!(uv(3), [0.0, 0.0]);
    }

    #[test]
    fn test_bad_indices_are_reported() {
        let mut bad = quad(Vec::new());
        bad.indices = vec![0, 1, 9];

        let err = interleave(&bad).unwrap_err();
        assert!(matches!(
            err,
            AssetError::Mesh(NormalError::IndexOutOfRange { index: 9, .. })
        ));
    }

    #[test]
    fn test_missing_file_is_a_model_error() {
        let err = load_obj(Path::new("nowhere/planet.obj")).unwrap_err();
        assert!(matches!(err, AssetError::Model { .. }));
    }
}
