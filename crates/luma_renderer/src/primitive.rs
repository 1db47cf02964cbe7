//! The trait every renderable surface implements.

use crate::intersection::{Intersection, LightSample};
use luma_math::{Bounds3, Ray};
use rand::RngCore;

/// Hits closer than this along a ray are ignored (self-intersection guard).
pub const RAY_EPSILON: f32 = 0.0001;

/// A surface the BVH can index and the integrator can light from.
pub trait Primitive: Send + Sync {
    /// World-space bounding box.
    fn bounds(&self) -> Bounds3;

    /// Nearest hit along `ray` beyond [`RAY_EPSILON`], or a default miss.
    fn intersect(&self, ray: &Ray) -> Intersection<'_>;

    /// Total surface area.
    fn area(&self) -> f32;

    /// Whether the surface emits light.
    fn has_emit(&self) -> bool;

    /// Draw a point uniformly over the surface.
    ///
    /// The pdf is `1 / area()`. Returns `None` for surfaces with no area.
    fn sample(&self, rng: &mut dyn RngCore) -> Option<LightSample>;
}
