//! Ray hit records and sampled emitter points.

use crate::material::{Color, Material};
use luma_math::Vec3;

/// Result of a nearest-hit ray query.
#[derive(Clone, Copy, Debug)]
pub struct Intersection<'a> {
    /// Whether anything was hit
    pub happened: bool,
    /// Ray parameter of the hit (`+inf` when nothing was hit)
    pub distance: f32,
    /// Hit position
    pub coords: Vec3,
    /// Unit normal, always facing against the incoming ray
    pub normal: Vec3,
    /// Material at the hit point
    pub material: Option<&'a Material>,
}

impl<'a> Default for Intersection<'a> {
    fn default() -> Self {
        Self {
            happened: false,
            distance: f32::INFINITY,
            coords: Vec3::ZERO,
            normal: Vec3::ZERO,
            material: None,
        }
    }
}

impl<'a> Intersection<'a> {
    /// A confirmed hit.
    pub fn hit(distance: f32, coords: Vec3, normal: Vec3, material: &'a Material) -> Self {
        Self {
            happened: true,
            distance,
            coords,
            normal,
            material: Some(material),
        }
    }

    /// Emitted radiance at the hit, zero for a miss.
    pub fn emission(&self) -> Color {
        self.material.map_or(Color::ZERO, Material::emission)
    }

    pub fn is_emissive(&self) -> bool {
        self.happened && self.material.is_some_and(Material::has_emission)
    }
}

/// Flip `n` so it faces against `direction`.
#[inline]
pub fn face_forward(direction: Vec3, n: Vec3) -> Vec3 {
    if direction.dot(n) > 0.0 {
        -n
    } else {
        n
    }
}

/// A point drawn on the surface of an emitter.
#[derive(Clone, Copy, Debug)]
pub struct LightSample {
    pub position: Vec3,
    /// Outward geometric normal at `position`
    pub normal: Vec3,
    /// Emitted radiance
    pub emission: Color,
    /// Density with respect to surface area
    pub pdf: f32,
}
