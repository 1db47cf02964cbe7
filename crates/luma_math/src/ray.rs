use crate::Vec3;

/// A ray in 3D space with a unit direction.
///
/// The reciprocal of the direction is computed once at construction so the
/// slab test in [`crate::Bounds3::intersects_ray`] multiplies instead of
/// dividing. The direction can only be replaced through
/// [`Ray::with_direction`], which keeps the two in sync.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    inv_direction: Vec3,
}

impl Ray {
    /// Create a new ray. The direction is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let direction = direction.normalize();
        Self {
            origin,
            direction,
            inv_direction: direction.recip(),
        }
    }

    /// Same origin, new direction (normalized, reciprocal recomputed).
    pub fn with_direction(&self, direction: Vec3) -> Self {
        Self::new(self.origin, direction)
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the unit direction of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Componentwise `1 / direction`.
    #[inline]
    pub fn inv_direction(&self) -> Vec3 {
        self.inv_direction
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_normalizes_direction() {
        let ray = Ray::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 3.0, 4.0));

        assert_eq!(ray.origin(), Vec3::new(1.0, 2.0, 3.0));
        assert!((ray.direction().length() - 1.0).abs() < 1e-6);
        assert!((ray.direction() - Vec3::new(0.0, 0.6, 0.8)).length() < 1e-6);
    }

    #[test]
    fn test_ray_inverse_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.6, -0.8));
        let inv = ray.inv_direction();

        assert!(inv.x.is_infinite());
        assert!((inv.y - 1.0 / 0.6).abs() < 1e-5);
        assert!((inv.z + 1.0 / 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_ray_with_direction_recomputes_inverse() {
        let ray = Ray::new(Vec3::ONE, Vec3::X);
        let turned = ray.with_direction(Vec3::new(0.0, -2.0, 0.0));

        assert_eq!(turned.origin(), Vec3::ONE);
        assert_eq!(turned.direction(), Vec3::NEG_Y);
        assert_eq!(turned.inv_direction().y, -1.0);
        assert!(turned.inv_direction().x.is_infinite());
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }
}
