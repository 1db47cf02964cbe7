//! Random sampling helpers shared by materials and primitives.
//!
//! All functions take the entropy source explicitly; nothing here touches a
//! global generator.

use luma_math::Vec3;
use rand::{Rng, RngCore};
use std::f32::consts::PI;

/// Uniform float in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Map a vector from the local frame where `n` is +Z into world space.
///
/// The tangent is built from whichever of `n.x`, `n.y` has the larger
/// magnitude so the basis never degenerates.
pub fn to_world(a: Vec3, n: Vec3) -> Vec3 {
    let c = if n.x.abs() > n.y.abs() {
        let inv_len = 1.0 / (n.x * n.x + n.z * n.z).sqrt();
        Vec3::new(n.z * inv_len, 0.0, -n.x * inv_len)
    } else {
        let inv_len = 1.0 / (n.y * n.y + n.z * n.z).sqrt();
        Vec3::new(0.0, n.z * inv_len, -n.y * inv_len)
    };
    let b = c.cross(n);
    a.x * b + a.y * c + a.z * n
}

/// Uniform direction on the +Z hemisphere (pdf `1 / 2π`).
pub fn uniform_hemisphere(rng: &mut dyn RngCore) -> Vec3 {
    let z = (1.0 - 2.0 * gen_f32(rng)).abs();
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Uniform direction on the unit sphere (pdf `1 / 4π`).
pub fn uniform_sphere(rng: &mut dyn RngCore) -> Vec3 {
    let z = 1.0 - 2.0 * gen_f32(rng);
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}
