//! Scene container: primitives, the acceleration structure and the
//! integration parameters.

use std::sync::Arc;
use std::time::Instant;

use crate::bvh::{Bvh, SplitMethod};
use crate::intersection::{Intersection, LightSample};
use crate::material::Color;
use crate::primitive::Primitive;
use crate::sampling::gen_f32;
use luma_math::Ray;
use rand::RngCore;

/// A renderable scene.
///
/// Primitives are added first, then [`Scene::build_bvh`] freezes them into a
/// hierarchy. After that the scene is only read, and is shared by reference
/// between render workers.
pub struct Scene {
    pub width: u32,
    pub height: u32,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub background: Color,
    /// Probability of continuing a path at each bounce
    pub russian_roulette: f32,
    pub split_method: SplitMethod,
    pub max_prims_in_node: usize,

    primitives: Vec<Arc<dyn Primitive>>,
    emitters: Vec<Arc<dyn Primitive>>,
    bvh: Bvh,
}

impl Scene {
    /// Create an empty scene with default parameters.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fov: 40.0,
            background: Color::ZERO,
            russian_roulette: 0.8,
            split_method: SplitMethod::Sah,
            max_prims_in_node: 1,
            primitives: Vec::new(),
            emitters: Vec::new(),
            bvh: Bvh::build(&[], 1, SplitMethod::Sah),
        }
    }

    /// Builder method to set the vertical field of view.
    pub fn with_fov(mut self, fov: f32) -> Self {
        self.fov = fov;
        self
    }

    /// Builder method to set the radiance returned by rays that escape.
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    /// Builder method to set the path continuation probability.
    pub fn with_russian_roulette(mut self, probability: f32) -> Self {
        self.russian_roulette = probability;
        self
    }

    /// Builder method to set how the BVH is built.
    pub fn with_bvh(mut self, split_method: SplitMethod, max_prims_in_node: usize) -> Self {
        self.split_method = split_method;
        self.max_prims_in_node = max_prims_in_node;
        self
    }

    /// Add a primitive. Neither hits nor light samples see it until the
    /// next [`Scene::build_bvh`].
    pub fn add(&mut self, primitive: Arc<dyn Primitive>) {
        self.primitives.push(primitive);
    }

    /// Build (or rebuild) the hierarchy over every added primitive.
    pub fn build_bvh(&mut self) {
        log::info!(
            "Generating BVH over {} primitives ({:?} split)",
            self.primitives.len(),
            self.split_method
        );
        let start = Instant::now();
        self.bvh = Bvh::build(&self.primitives, self.max_prims_in_node, self.split_method);
        self.emitters = self
            .primitives
            .iter()
            .filter(|p| p.has_emit())
            .cloned()
            .collect();
        log::info!(
            "BVH generation complete: {} leaves in {:.2?}",
            self.bvh.leaf_count(),
            start.elapsed()
        );

        if self.emitters.is_empty() {
            log::warn!("Scene has no emissive primitives; only the background contributes");
        }
    }

    /// Nearest hit along `ray`.
    pub fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        self.bvh.intersect(ray)
    }

    pub fn primitives(&self) -> &[Arc<dyn Primitive>] {
        &self.primitives
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// Total surface area of the emitters in the built hierarchy.
    pub fn emit_area(&self) -> f32 {
        self.emitters.iter().map(|e| e.area()).sum()
    }

    /// Draw a point on an emitter.
    ///
    /// Emitters are chosen with probability proportional to their area and
    /// sampled uniformly, so the area-measure pdf is `1 / emit_area()`.
    /// `None` when the scene has nothing to sample.
    pub fn sample_light(&self, rng: &mut dyn RngCore) -> Option<LightSample> {
        let total = self.emit_area();
        if !(total > 0.0) {
            return None;
        }

        let p = gen_f32(rng) * total;
        let mut running = 0.0;
        let mut chosen = self.emitters.last()?;
        for emitter in &self.emitters {
            running += emitter.area();
            if p <= running {
                chosen = emitter;
                break;
            }
        }

        let mut sample = chosen.sample(rng)?;
        sample.pdf = 1.0 / total;
        Some(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::sphere::Sphere;
    use crate::triangle::Triangle;
    use luma_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn light(color: Color) -> Arc<Material> {
        Arc::new(Material::emissive(color, Color::ONE))
    }

    #[test]
    fn test_empty_scene() {
        let mut scene = Scene::new(4, 4);
        scene.build_bvh();
        let mut rng = StdRng::seed_from_u64(0);

        assert!(!scene.intersect(&Ray::new(Vec3::ZERO, Vec3::Z)).happened);
        assert!(scene.sample_light(&mut rng).is_none());
    }

    #[test]
    fn test_no_emitters() {
        let mut scene = Scene::new(4, 4);
        scene.add(Arc::new(Sphere::new(
            Vec3::ZERO,
            1.0,
            Arc::new(Material::diffuse(Color::ONE)),
        )));
        scene.build_bvh();
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(scene.emit_area(), 0.0);
        assert!(scene.sample_light(&mut rng).is_none());
    }

    #[test]
    fn test_single_emitter_pdf() {
        let mut scene = Scene::new(4, 4);
        scene.add(Arc::new(Triangle::new(
            Vec3::ZERO,
            Vec3::X,
            Vec3::Y,
            light(Color::ONE),
        )));
        scene.build_bvh();
        let mut rng = StdRng::seed_from_u64(0);

        for _ in 0..100 {
            let s = scene.sample_light(&mut rng).unwrap();
            assert!((s.pdf - 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_emitters_chosen_by_area() {
        let mut scene = Scene::new(4, 4);
        // Areas 0.5 and 2.0, non-emissive clutter in between
        scene.add(Arc::new(Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y, light(Color::X))));
        scene.add(Arc::new(Sphere::new(
            Vec3::splat(5.0),
            1.0,
            Arc::new(Material::diffuse(Color::ONE)),
        )));
        scene.add(Arc::new(Triangle::new(
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, 2.0),
            Vec3::new(0.0, 2.0, 2.0),
            light(Color::Y),
        )));
        scene.build_bvh();
        let mut rng = StdRng::seed_from_u64(42);

        assert!((scene.emit_area() - 2.5).abs() < 1e-6);

        let draws = 100_000;
        let mut first = 0;
        for _ in 0..draws {
            let s = scene.sample_light(&mut rng).unwrap();
            assert!((s.pdf - 0.4).abs() < 1e-6);
            if s.emission == Color::X {
                first += 1;
            }
        }
        let ratio = first as f32 / (draws - first) as f32;
        assert!((ratio - 0.25).abs() < 0.01, "ratio = {}", ratio);
    }

    #[test]
    fn test_rebuild_replaces_tree() {
        let mut scene = Scene::new(4, 4);
        let material = Arc::new(Material::diffuse(Color::ONE));
        scene.add(Arc::new(Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0, material.clone())));
        scene.build_bvh();
        assert_eq!(scene.bvh().leaf_count(), 1);

        scene.add(Arc::new(Sphere::new(Vec3::new(0.0, 0.0, 2.0), 0.5, material)));
        // Not visible until the rebuild
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!((scene.intersect(&ray).distance - 4.0).abs() < 1e-4);

        scene.build_bvh();
        assert_eq!(scene.bvh().leaf_count(), 2);
        assert!((scene.intersect(&ray).distance - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_emitter_added_after_build_waits_for_rebuild() {
        let mut scene = Scene::new(4, 4);
        scene.add(Arc::new(Sphere::new(
            Vec3::new(0.0, 0.0, 5.0),
            1.0,
            Arc::new(Material::diffuse(Color::ONE)),
        )));
        scene.build_bvh();

        scene.add(Arc::new(Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y, light(Color::ONE))));
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(scene.emit_area(), 0.0);
        assert!(scene.sample_light(&mut rng).is_none());

        scene.build_bvh();
        assert!((scene.emit_area() - 0.5).abs() < 1e-6);
        let s = scene.sample_light(&mut rng).unwrap();
        assert!((s.pdf - 2.0).abs() < 1e-6);
        // The sampled point is on geometry the hierarchy can hit
        let hit = scene.intersect(&Ray::new(s.position + Vec3::Z, Vec3::NEG_Z));
        assert!(hit.is_emissive());
    }
}
