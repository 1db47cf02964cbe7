//! Surface scattering models.
//!
//! A closed set of materials, each exposing the three queries the
//! integrator needs: draw an outgoing direction, the pdf of that draw, and
//! the BRDF value for a pair of directions.
//!
//! Direction conventions: `wi` is the incoming ray direction (pointing *at*
//! the surface), `wo` the outgoing direction (pointing away from it) and `n`
//! the unit surface normal on the side the ray arrived from.

use crate::sampling::{to_world, uniform_hemisphere};
use luma_math::Vec3;
use rand::RngCore;
use std::f32::consts::PI;

/// Color type alias (linear RGB radiance or reflectance)
pub type Color = Vec3;

/// Emission below this magnitude counts as "not an emitter".
pub const EPSILON: f32 = 0.00001;

/// Lambertian diffuse surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Diffuse {
    pub emission: Color,
    pub kd: Color,
}

/// Cook-Torrance microfacet surface: GGX distribution, Smith-GGX
/// shadowing-masking, Fresnel term, plus a Fresnel-weighted diffuse lobe.
#[derive(Debug, Clone, PartialEq)]
pub struct Microfacet {
    pub emission: Color,
    pub kd: Color,
    pub ks: Color,
    /// Index of refraction
    pub ior: f32,
    /// GGX alpha
    pub roughness: f32,
}

/// A surface material. Shared between primitives by `Arc` and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Diffuse(Diffuse),
    Microfacet(Microfacet),
}

impl Material {
    /// Non-emissive Lambertian material.
    pub fn diffuse(kd: Color) -> Self {
        Material::Diffuse(Diffuse {
            emission: Color::ZERO,
            kd,
        })
    }

    /// Lambertian area light.
    pub fn emissive(emission: Color, kd: Color) -> Self {
        Material::Diffuse(Diffuse { emission, kd })
    }

    /// Non-emissive microfacet material.
    pub fn microfacet(kd: Color, ks: Color, ior: f32, roughness: f32) -> Self {
        Material::Microfacet(Microfacet {
            emission: Color::ZERO,
            kd,
            ks,
            ior,
            roughness,
        })
    }

    /// Builder method to set the emitted radiance.
    pub fn with_emission(mut self, emission: Color) -> Self {
        match &mut self {
            Material::Diffuse(m) => m.emission = emission,
            Material::Microfacet(m) => m.emission = emission,
        }
        self
    }

    pub fn emission(&self) -> Color {
        match self {
            Material::Diffuse(m) => m.emission,
            Material::Microfacet(m) => m.emission,
        }
    }

    pub fn has_emission(&self) -> bool {
        self.emission().length() > EPSILON
    }

    /// Draw an outgoing direction.
    ///
    /// Both models sample the hemisphere around `n` uniformly; the pdf
    /// reported by [`Material::pdf`] matches.
    pub fn sample(&self, _wi: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        match self {
            Material::Diffuse(_) | Material::Microfacet(_) => to_world(uniform_hemisphere(rng), n),
        }
    }

    /// Solid-angle density of [`Material::sample`] producing `wo`.
    pub fn pdf(&self, _wi: Vec3, wo: Vec3, n: Vec3) -> f32 {
        match self {
            Material::Diffuse(_) | Material::Microfacet(_) => {
                if wo.dot(n) > 0.0 {
                    0.5 / PI
                } else {
                    0.0
                }
            }
        }
    }

    /// BRDF value for light arriving along `wo` and leaving toward `-wi`.
    pub fn eval(&self, wi: Vec3, wo: Vec3, n: Vec3) -> Color {
        match self {
            Material::Diffuse(m) => {
                if n.dot(wo) > 0.0 {
                    m.kd / PI
                } else {
                    Color::ZERO
                }
            }
            Material::Microfacet(m) => m.eval(wi, wo, n),
        }
    }
}

impl Microfacet {
    fn eval(&self, wi: Vec3, wo: Vec3, n: Vec3) -> Color {
        let n_dot_l = n.dot(wo);
        if n_dot_l <= 0.0 {
            return Color::ZERO;
        }

        let v = -wi;
        let n_dot_v = n.dot(v);
        let h = (v + wo).normalize_or_zero();

        let f = fresnel(v, h, self.ior);
        let diffuse = self.kd * (1.0 - f).clamp(0.0, 1.0) / PI;
        if n_dot_v <= 0.0 || h == Vec3::ZERO {
            return diffuse;
        }

        let d = d_ggx(self.roughness, n.dot(h).max(0.0));
        let g = g_smith(self.roughness, n_dot_v, n_dot_l);
        let specular = self.ks * (d * g * f) / (4.0 * n_dot_l.max(EPSILON) * n_dot_v.max(EPSILON));

        diffuse + specular
    }
}

/// GGX normal distribution.
fn d_ggx(roughness: f32, n_dot_h: f32) -> f32 {
    let alpha2 = (roughness * roughness).max(1e-6);
    let denom = n_dot_h * n_dot_h * (alpha2 - 1.0) + 1.0;
    alpha2 / (PI * denom * denom)
}

/// Smith joint shadowing-masking from two Schlick-GGX terms.
fn g_smith(roughness: f32, n_dot_v: f32, n_dot_l: f32) -> f32 {
    g_schlick_ggx(n_dot_v, roughness) * g_schlick_ggx(n_dot_l, roughness)
}

fn g_schlick_ggx(n_dot_v: f32, roughness: f32) -> f32 {
    let r = roughness + 1.0;
    let k = (r * r) / 8.0;
    n_dot_v / (n_dot_v * (1.0 - k) + k)
}

/// Fresnel reflectance seen from `v` (toward the viewer) on a facet `h`.
///
/// Indices close to 1 use the full dielectric equations, anything else
/// Schlick's approximation.
fn fresnel(v: Vec3, h: Vec3, ior: f32) -> f32 {
    if (ior - 1.0).abs() < 0.1 {
        fresnel_dielectric(-v, h, ior)
    } else {
        let f0 = ((ior - 1.0) * (ior - 1.0)) / ((ior + 1.0) * (ior + 1.0));
        let cos = v.dot(h).clamp(0.0, 1.0);
        f0 + (1.0 - f0) * (1.0 - cos).powi(5)
    }
}

/// Unpolarized dielectric Fresnel for an incident direction `i`.
fn fresnel_dielectric(i: Vec3, n: Vec3, ior: f32) -> f32 {
    let mut cos_i = i.dot(n).clamp(-1.0, 1.0);
    let (mut eta_i, mut eta_t) = (1.0, ior);
    if cos_i > 0.0 {
        std::mem::swap(&mut eta_i, &mut eta_t);
    }

    let sin_t = eta_i / eta_t * (1.0 - cos_i * cos_i).max(0.0).sqrt();
    if sin_t >= 1.0 {
        // Total internal reflection
        return 1.0;
    }

    let cos_t = (1.0 - sin_t * sin_t).max(0.0).sqrt();
    cos_i = cos_i.abs();
    let rs = ((eta_t * cos_i) - (eta_i * cos_t)) / ((eta_t * cos_i) + (eta_i * cos_t));
    let rp = ((eta_i * cos_i) - (eta_t * cos_t)) / ((eta_i * cos_i) + (eta_t * cos_t));
    (rs * rs + rp * rp) / 2.0
}
