//! Triangle mesh geometry.
//!
//! A renderer-agnostic triangle soup: shared vertex positions plus an index
//! list where every three indices form one triangle. Populated from OBJ files
//! (any polygon faces are triangulated on load) or built directly.

use std::path::Path;

use luma_math::{Bounds3, Mat4, Vec3};

use crate::error::{Error, Result};

#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box of all positions
    pub bounds: Bounds3,
}

impl Mesh {
    /// Create a new mesh from positions and indices.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let bounds = Self::compute_bounds(&positions);
        Self {
            positions,
            indices,
            bounds,
        }
    }

    /// Load every model of an OBJ file into a single mesh.
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ..Default::default()
            },
        )?;

        let mut positions = Vec::new();
        let mut indices = Vec::new();
        for model in &models {
            let base = positions.len() as u32;
            let mesh = &model.mesh;
            positions.extend(mesh.positions.chunks_exact(3).map(Vec3::from_slice));
            indices.extend(mesh.indices.iter().map(|i| base + i));
        }

        if indices.len() < 3 {
            return Err(Error::EmptyMesh(path.to_path_buf()));
        }

        let mesh = Self::new(positions, indices);
        log::info!(
            "Loaded {} triangles from {} ({} models)",
            mesh.triangle_count(),
            path.display(),
            models.len()
        );
        Ok(mesh)
    }

    /// Compute axis-aligned bounding box from positions.
    fn compute_bounds(positions: &[Vec3]) -> Bounds3 {
        positions
            .iter()
            .fold(Bounds3::EMPTY, |acc, p| Bounds3::union_point(&acc, *p))
    }

    /// Apply a model matrix to every position.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let positions = self
            .positions
            .iter()
            .map(|p| matrix.transform_point3(*p))
            .collect();
        Self::new(positions, self.indices.clone())
    }

    /// Get the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate the corner positions of every triangle.
    ///
    /// Faces referencing out-of-range vertices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(move |face| {
            let corner = |i: u32| self.positions.get(i as usize).copied();
            Some([corner(face[0])?, corner(face[1])?, corner(face[2])?])
        })
    }
}
