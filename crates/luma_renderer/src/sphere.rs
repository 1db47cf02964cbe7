//! Sphere primitive for ray tracing.

use std::f32::consts::PI;
use std::sync::Arc;

use crate::intersection::{face_forward, Intersection, LightSample};
use crate::material::Material;
use crate::primitive::{Primitive, RAY_EPSILON};
use crate::sampling::uniform_sphere;
use luma_math::{Bounds3, Ray, Vec3};
use rand::RngCore;

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<Material>,
    bbox: Bounds3,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Bounds3::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl Primitive for Sphere {
    fn bounds(&self) -> Bounds3 {
        self.bbox
    }

    fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        if self.radius <= 0.0 {
            return Intersection::default();
        }

        // Direction is unit length, so a = 1
        let oc = self.center - ray.origin();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - c;
        if discriminant < 0.0 {
            return Intersection::default();
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = h - sqrtd;
        if root <= RAY_EPSILON {
            root = h + sqrtd;
            if root <= RAY_EPSILON {
                return Intersection::default();
            }
        }

        let p = ray.at(root);
        let outward_normal = (p - self.center) / self.radius;
        Intersection::hit(
            root,
            p,
            face_forward(ray.direction(), outward_normal),
            &self.material,
        )
    }

    fn area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }

    fn has_emit(&self) -> bool {
        self.material.has_emission()
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Option<LightSample> {
        let area = self.area();
        if area <= 0.0 {
            return None;
        }

        let dir = uniform_sphere(rng);
        Some(LightSample {
            position: self.center + self.radius * dir,
            normal: dir,
            emission: self.material.emission(),
            pdf: 1.0 / area,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sphere_at(center: Vec3, radius: f32) -> Sphere {
        Sphere::new(center, radius, Arc::new(Material::diffuse(Color::splat(0.5))))
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = sphere_at(Vec3::new(0.0, 0.0, -1.0), 0.5);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let isect = sphere.intersect(&ray);
        assert!(isect.happened);
        assert!((isect.distance - 0.5).abs() < 0.001);
        assert!((isect.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_sphere_hit_from_inside() {
        let sphere = sphere_at(Vec3::ZERO, 2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let isect = sphere.intersect(&ray);
        assert!(isect.happened);
        assert!((isect.distance - 2.0).abs() < 1e-4);
        // Inner side faces back toward the origin
        assert!((isect.normal - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = sphere_at(Vec3::new(0.0, 0.0, -1.0), 0.5);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(!sphere.intersect(&ray).happened);

        // Sphere entirely behind the origin
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(!sphere.intersect(&ray).happened);
    }

    #[test]
    fn test_sphere_bbox() {
        let sphere = sphere_at(Vec3::new(1.0, 2.0, 3.0), 0.5);
        let bbox = sphere.bounds();

        assert!((bbox.p_min.x - 0.5).abs() < 0.001);
        assert!((bbox.p_max.x - 1.5).abs() < 0.001);
        assert!((bbox.p_min.y - 1.5).abs() < 0.001);
        assert!((bbox.p_max.z - 3.5).abs() < 0.001);
    }

    #[test]
    fn test_samples_lie_on_surface() {
        let mut rng = StdRng::seed_from_u64(5);
        let sphere = sphere_at(Vec3::new(1.0, 0.0, 0.0), 2.0);
        let expected_pdf = 1.0 / (16.0 * PI);

        for _ in 0..500 {
            let s = sphere.sample(&mut rng).unwrap();
            let r = s.position - sphere.center();
            assert!((r.length() - 2.0).abs() < 1e-4);
            assert!((s.normal - r / 2.0).length() < 1e-4);
            assert!((s.pdf - expected_pdf).abs() < 1e-7);
        }
    }
}
