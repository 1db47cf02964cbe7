//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use std::sync::Arc;

use crate::intersection::{face_forward, Intersection, LightSample};
use crate::material::Material;
use crate::primitive::{Primitive, RAY_EPSILON};
use crate::sampling::gen_f32;
use luma_math::{Bounds3, Ray, Vec3};
use rand::RngCore;

/// A single two-sided triangle.
#[derive(Debug, Clone)]
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Edges from `v0`
    e1: Vec3,
    e2: Vec3,
    /// Geometric normal (unit length, zero for degenerate triangles)
    normal: Vec3,
    area: f32,
    bbox: Bounds3,
    material: Arc<Material>,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<Material>) -> Self {
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        let cross = e1.cross(e2);

        // Pad thin dimensions to avoid degenerate boxes
        let delta = Vec3::splat(0.0001);
        let bbox = Bounds3::from_points(v0.min(v1).min(v2) - delta, v0.max(v1).max(v2) + delta);

        Self {
            v0,
            v1,
            v2,
            e1,
            e2,
            normal: cross.normalize_or_zero(),
            area: cross.length() * 0.5,
            bbox,
            material,
        }
    }

    /// Split the parallelogram `corner`, `corner + u`, `corner + u + v`,
    /// `corner + v` into two triangles.
    pub fn quad(corner: Vec3, u: Vec3, v: Vec3, material: Arc<Material>) -> [Triangle; 2] {
        [
            Triangle::new(corner, corner + u, corner + u + v, material.clone()),
            Triangle::new(corner, corner + u + v, corner + v, material),
        ]
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }
}

impl Primitive for Triangle {
    fn bounds(&self) -> Bounds3 {
        self.bbox
    }

    /// Möller-Trumbore ray-triangle intersection algorithm.
    fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        let dir = ray.direction();
        let h = dir.cross(self.e2);
        let a = self.e1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-8 {
            return Intersection::default();
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return Intersection::default();
        }

        let q = s.cross(self.e1);
        let v = f * dir.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return Intersection::default();
        }

        let t = f * self.e2.dot(q);
        if t <= RAY_EPSILON {
            return Intersection::default();
        }

        Intersection::hit(t, ray.at(t), face_forward(dir, self.normal), &self.material)
    }

    fn area(&self) -> f32 {
        self.area
    }

    fn has_emit(&self) -> bool {
        self.material.has_emission()
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Option<LightSample> {
        if self.area <= 0.0 {
            return None;
        }

        let x = gen_f32(rng).sqrt();
        let y = gen_f32(rng);
        let position = self.v0 * (1.0 - x) + self.v1 * (x * (1.0 - y)) + self.v2 * (x * y);

        Some(LightSample {
            position,
            normal: self.normal,
            emission: self.material.emission(),
            pdf: 1.0 / self.area,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grey() -> Arc<Material> {
        Arc::new(Material::diffuse(Color::splat(0.5)))
    }

    fn xy_triangle() -> Triangle {
        // Triangle in XY plane at z=-1
        Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            grey(),
        )
    }

    #[test]
    fn test_triangle_hit() {
        let tri = xy_triangle();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let isect = tri.intersect(&ray);
        assert!(isect.happened);
        assert!((isect.distance - 1.0).abs() < 0.001);
        assert!((isect.coords - Vec3::new(0.0, 0.0, -1.0)).length() < 0.001);
        // Normal faces the ray origin
        assert_eq!(isect.normal, Vec3::Z);
    }

    #[test]
    fn test_triangle_hit_from_behind() {
        let tri = xy_triangle();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::Z);

        let isect = tri.intersect(&ray);
        assert!(isect.happened);
        assert_eq!(isect.normal, Vec3::NEG_Z);
    }

    #[test]
    fn test_triangle_miss() {
        let tri = xy_triangle();

        // Ray pointing away
        let away = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(!tri.intersect(&away).happened);

        // Parallel to the plane
        let parallel = Ray::new(Vec3::new(-5.0, 0.0, -1.0), Vec3::X);
        assert!(!tri.intersect(&parallel).happened);

        // Outside the edges
        let outside = Ray::new(Vec3::new(2.0, 2.0, 0.0), Vec3::NEG_Z);
        assert!(!tri.intersect(&outside).happened);
    }

    #[test]
    fn test_ignores_hits_at_origin() {
        let tri = xy_triangle();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::NEG_Z);
        assert!(!tri.intersect(&ray).happened);
    }

    #[test]
    fn test_area_and_bounds() {
        let tri = xy_triangle();
        assert!((tri.area() - 2.0).abs() < 1e-6);

        let b = tri.bounds();
        assert!(b.p_min.z < -1.0 && b.p_max.z > -1.0);
        assert!(b.contains(Vec3::new(0.0, 1.0, -1.0)));
    }

    #[test]
    fn test_samples_lie_on_triangle() {
        let mut rng = StdRng::seed_from_u64(42);
        let light = Arc::new(Material::emissive(Color::splat(3.0), Color::ONE));
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y, light);
        assert!(tri.has_emit());

        for _ in 0..1000 {
            let s = tri.sample(&mut rng).unwrap();
            assert!(s.position.x >= -1e-6 && s.position.y >= -1e-6);
            assert!(s.position.x + s.position.y <= 1.0 + 1e-5);
            assert!(s.position.z.abs() < 1e-6);
            assert_eq!(s.normal, Vec3::Z);
            assert_eq!(s.emission, Color::splat(3.0));
            assert!((s.pdf - 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_degenerate_triangle() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0, grey());
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(tri.area(), 0.0);
        assert!(tri.sample(&mut rng).is_none());
        assert!(!tri.intersect(&Ray::new(Vec3::new(0.5, 1.0, 0.0), Vec3::NEG_Y)).happened);
    }

    #[test]
    fn test_quad_covers_parallelogram() {
        let [a, b] = Triangle::quad(Vec3::ZERO, Vec3::X, Vec3::Z, grey());
        assert!((a.area() + b.area() - 1.0).abs() < 1e-6);

        for (x, z) in [(0.1, 0.1), (0.9, 0.2), (0.2, 0.9), (0.8, 0.8)] {
            let ray = Ray::new(Vec3::new(x, 1.0, z), Vec3::NEG_Y);
            assert!(a.intersect(&ray).happened || b.intersect(&ray).happened);
        }
        let ray = Ray::new(Vec3::new(1.5, 1.0, 0.5), Vec3::NEG_Y);
        assert!(!a.intersect(&ray).happened && !b.intersect(&ray).happened);
    }
}
