//! Triangle mesh primitive backed by its own BVH.

use std::sync::Arc;

use crate::bvh::{Bvh, SplitMethod};
use crate::intersection::{Intersection, LightSample};
use crate::material::Material;
use crate::primitive::Primitive;
use crate::triangle::Triangle;
use luma_core::Mesh;
use luma_math::{Bounds3, Ray};
use rand::RngCore;

/// A triangle soup sharing a single material.
///
/// The scene-level BVH sees the whole mesh as one primitive; rays that reach
/// it continue into the mesh's inner hierarchy.
pub struct TriangleMesh {
    bvh: Bvh,
    triangle_count: usize,
    material: Arc<Material>,
}

impl TriangleMesh {
    /// Build from loaded geometry. `None` when no usable triangle remains.
    pub fn new(mesh: &Mesh, material: Arc<Material>) -> Option<Self> {
        let triangles: Vec<Arc<dyn Primitive>> = mesh
            .triangles()
            .map(|[a, b, c]| Arc::new(Triangle::new(a, b, c, material.clone())) as Arc<dyn Primitive>)
            .collect();

        if triangles.is_empty() {
            return None;
        }

        let bvh = Bvh::build(&triangles, 1, SplitMethod::Naive);
        log::debug!(
            "Mesh with {} triangles, area {:.3}",
            triangles.len(),
            bvh.area()
        );

        Some(Self {
            bvh,
            triangle_count: triangles.len(),
            material,
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }
}

impl Primitive for TriangleMesh {
    fn bounds(&self) -> Bounds3 {
        self.bvh.bounds()
    }

    fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        self.bvh.intersect(ray)
    }

    fn area(&self) -> f32 {
        self.bvh.area()
    }

    fn has_emit(&self) -> bool {
        self.material.has_emission()
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Option<LightSample> {
        self.bvh.sample_surface(rng)
    }
}
