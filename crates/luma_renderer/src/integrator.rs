//! Unidirectional path tracing with next-event estimation.
//!
//! At every non-emissive vertex the estimator adds one light sample through
//! a shadow ray, then continues the path with probability
//! `russian_roulette`, dividing the throughput by that probability so the
//! estimate stays unbiased. Bounces that land on an emitter end the path,
//! since that light was already counted by the direct term.

use crate::material::{Color, Material};
use crate::sampling::gen_f32;
use crate::scene::Scene;
use luma_math::{Ray, Vec3};
use rand::RngCore;

/// Bounce directions with a lower pdf than this end the path.
pub const MIN_BOUNCE_PDF: f32 = 0.01;

impl Scene {
    /// Radiance arriving at the origin of `ray` from its direction.
    pub fn cast_ray(&self, ray: &Ray, rng: &mut dyn RngCore) -> Color {
        let mut isect = self.intersect(ray);
        let Some(mut material) = isect.material.filter(|_| isect.happened) else {
            return self.background;
        };
        if material.has_emission() {
            return material.emission();
        }

        let mut radiance = Color::ZERO;
        let mut throughput = Color::ONE;
        let mut wi = ray.direction();
        let mut depth = 0u32;

        loop {
            let p = isect.coords;
            let n = isect.normal.normalize();

            radiance += throughput * self.direct_light(p, n, wi, material, rng);

            if gen_f32(rng) >= self.russian_roulette {
                break;
            }

            let wo = material.sample(wi, n, rng).normalize();
            let pdf = material.pdf(wi, wo, n);
            if pdf <= MIN_BOUNCE_PDF {
                break;
            }

            let bounce = self.intersect(&Ray::new(p, wo));
            let Some(next) = bounce.material.filter(|_| bounce.happened) else {
                break;
            };
            if next.has_emission() {
                break;
            }

            throughput *= material.eval(wi, wo, n) * wo.dot(n) / pdf / self.russian_roulette;
            wi = wo;
            isect = bounce;
            material = next;
            depth += 1;
        }

        log::trace!("path terminated after {} bounces", depth);
        radiance
    }

    /// One-sample estimate of the light reaching `p` straight from emitters,
    /// reflected toward `-wi`.
    fn direct_light(
        &self,
        p: Vec3,
        n: Vec3,
        wi: Vec3,
        material: &Material,
        rng: &mut dyn RngCore,
    ) -> Color {
        let Some(light) = self.sample_light(rng) else {
            return Color::ZERO;
        };

        let to_light = light.position - p;
        let distance2 = to_light.length_squared();
        if !(distance2 > 0.0 && light.pdf > 0.0) {
            return Color::ZERO;
        }
        let l = to_light / distance2.sqrt();

        let shadow = self.intersect(&Ray::new(p, l));
        if !shadow.is_emissive() {
            return Color::ZERO;
        }

        let cos_surface = n.dot(l);
        let cos_light = light.normal.normalize_or_zero().dot(-l);
        if cos_surface <= 0.0 || cos_light <= 0.0 {
            return Color::ZERO;
        }

        let contribution = light.emission * material.eval(wi, l, n) * cos_surface * cos_light
            / distance2
            / light.pdf;
        if contribution.is_finite() {
            contribution
        } else {
            Color::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangle::Triangle;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    /// Large diffuse floor at y = 0 under a small light facing down at y = 1.
    fn lit_floor(russian_roulette: f32, with_ceiling: bool) -> Scene {
        let mut scene = Scene::new(16, 16).with_russian_roulette(russian_roulette);
        let white = Arc::new(Material::diffuse(Color::splat(0.5)));
        let light = Arc::new(Material::emissive(Color::splat(4.0), Color::splat(0.65)));

        for tri in Triangle::quad(
            Vec3::new(-5.0, 0.0, -5.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 10.0),
            white.clone(),
        ) {
            scene.add(Arc::new(tri));
        }
        // Edges X then Z give a -Y normal
        for tri in Triangle::quad(
            Vec3::new(-0.25, 1.0, -0.25),
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.5),
            light,
        ) {
            scene.add(Arc::new(tri));
        }
        if with_ceiling {
            for tri in Triangle::quad(
                Vec3::new(-5.0, 1.5, -5.0),
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 10.0),
                white.clone(),
            ) {
                scene.add(Arc::new(tri));
            }
        }
        scene.build_bvh();
        scene
    }

    fn mean_radiance(scene: &Scene, ray: &Ray, samples: usize, seed: u64) -> Color {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sum = Color::ZERO;
        for _ in 0..samples {
            sum += scene.cast_ray(ray, &mut rng);
        }
        sum / samples as f32
    }

    #[test]
    fn test_miss_returns_background() {
        let mut scene = Scene::new(4, 4).with_background(Color::new(0.1, 0.2, 0.3));
        scene.build_bvh();
        let mut rng = StdRng::seed_from_u64(0);

        let c = scene.cast_ray(&Ray::new(Vec3::ZERO, Vec3::Z), &mut rng);
        assert_eq!(c, Color::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_emitter_returns_emission() {
        let scene = lit_floor(0.8, false);
        let mut rng = StdRng::seed_from_u64(0);

        // Straight up from the floor into the light
        let c = scene.cast_ray(&Ray::new(Vec3::new(0.0, 0.5, 0.0), Vec3::Y), &mut rng);
        assert_eq!(c, Color::splat(4.0));
    }

    #[test]
    fn test_lit_floor_estimate() {
        let scene = lit_floor(0.8, false);
        let ray = Ray::new(Vec3::new(0.0, 0.5, 0.0), Vec3::NEG_Y);

        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let c = scene.cast_ray(&ray, &mut rng);
            assert!(c.is_finite());
            assert!(c.min_element() > 0.0);
        }

        // kd/π * Le * ∫ cos² / r² over the light, about 0.147
        let mean = mean_radiance(&scene, &ray, 10_000, 2);
        assert!(mean.x > 0.135 && mean.x < 0.16, "mean = {:?}", mean);
        assert!((mean.x - mean.y).abs() < 1e-6);
    }

    #[test]
    fn test_occluded_point_is_dark() {
        let mut scene = lit_floor(0.8, false);
        // Opaque blocker between the floor point and the light
        let blocker = Arc::new(Material::diffuse(Color::ZERO));
        for tri in Triangle::quad(
            Vec3::new(-1.0, 0.5, -1.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            blocker,
        ) {
            scene.add(Arc::new(tri));
        }
        scene.build_bvh();

        let ray = Ray::new(Vec3::new(0.0, 0.25, 0.0), Vec3::NEG_Y);
        let mean = mean_radiance(&scene, &ray, 2_000, 3);
        assert_eq!(mean, Color::ZERO);
    }

    #[test]
    fn test_russian_roulette_is_unbiased() {
        let ray = Ray::new(Vec3::new(0.0, 0.5, 0.0), Vec3::NEG_Y);

        let low = mean_radiance(&lit_floor(0.8, true), &ray, 40_000, 11);
        let high = mean_radiance(&lit_floor(0.95, true), &ray, 40_000, 12);
        let direct_only = mean_radiance(&lit_floor(0.8, false), &ray, 10_000, 13);

        // The ceiling adds indirect light on top of the direct term
        assert!(low.x > direct_only.x);
        assert!((low.x - high.x).abs() < 0.01, "low = {:?}, high = {:?}", low, high);
    }
}
