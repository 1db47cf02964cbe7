use crate::{Ray, Vec3};

/// Axis-aligned bounding box used by the BVH.
///
/// [`Bounds3::EMPTY`] has `p_min = +inf` and `p_max = -inf` on every axis, so
/// a union with any point or box yields exactly that point or box. Once a box
/// has absorbed at least one point, `p_min <= p_max` holds componentwise.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds3 {
    pub p_min: Vec3,
    pub p_max: Vec3,
}

impl Bounds3 {
    /// Box containing nothing.
    pub const EMPTY: Bounds3 = Bounds3 {
        p_min: Vec3::splat(f32::INFINITY),
        p_max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Degenerate box around a single point.
    pub fn from_point(p: Vec3) -> Self {
        Self { p_min: p, p_max: p }
    }

    /// Create a box from two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            p_min: a.min(b),
            p_max: a.max(b),
        }
    }

    /// Smallest box enclosing both boxes.
    pub fn union(a: &Bounds3, b: &Bounds3) -> Self {
        Self {
            p_min: a.p_min.min(b.p_min),
            p_max: a.p_max.max(b.p_max),
        }
    }

    /// Smallest box enclosing `b` and the point `p`.
    pub fn union_point(b: &Bounds3, p: Vec3) -> Self {
        Self {
            p_min: b.p_min.min(p),
            p_max: b.p_max.max(p),
        }
    }

    /// Overlap region of two boxes. Disjoint boxes give `p_min > p_max` on
    /// at least one axis.
    pub fn intersection(&self, other: &Bounds3) -> Self {
        Self {
            p_min: self.p_min.max(other.p_min),
            p_max: self.p_max.min(other.p_max),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.p_min.cmpgt(self.p_max).any()
    }

    pub fn diagonal(&self) -> Vec3 {
        self.p_max - self.p_min
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    ///
    /// X wins ties with Y or Z only when strictly larger than both; Y wins a
    /// tie with Z only when strictly larger.
    pub fn max_extent(&self) -> usize {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    /// `2 * (dx*dy + dx*dz + dy*dz)`. Only meaningful as a relative cost.
    pub fn surface_area(&self) -> f32 {
        let d = self.diagonal();
        2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        0.5 * self.p_min + 0.5 * self.p_max
    }

    /// Position of `p` relative to the box: `p_min` maps to 0, `p_max` to 1.
    /// Flat axes are left unscaled.
    pub fn offset(&self, p: Vec3) -> Vec3 {
        let mut o = p - self.p_min;
        let d = self.diagonal();
        if d.x > 0.0 {
            o.x /= d.x;
        }
        if d.y > 0.0 {
            o.y /= d.y;
        }
        if d.z > 0.0 {
            o.z /= d.z;
        }
        o
    }

    pub fn overlaps(&self, other: &Bounds3) -> bool {
        self.p_max.cmpge(other.p_min).all() && self.p_min.cmple(other.p_max).all()
    }

    /// Inclusive point containment.
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.p_min).all() && p.cmple(self.p_max).all()
    }

    /// Slab test against a ray.
    ///
    /// A ray starting inside (or on the surface of) the box always reports a
    /// hit. Otherwise the per-axis entry/exit distances are intersected and
    /// a hit means the interval is non-empty (`t_enter <= t_exit`, so grazing
    /// rays count) and not entirely behind the origin.
    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        if self.contains(ray.origin()) {
            return true;
        }

        let origin = ray.origin();
        let inv_dir = ray.inv_direction();

        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        for axis in 0..3 {
            let mut t0 = (self.p_min[axis] - origin[axis]) * inv_dir[axis];
            let mut t1 = (self.p_max[axis] - origin[axis]) * inv_dir[axis];
            if inv_dir[axis] < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
        }

        t_enter <= t_exit && t_exit >= 0.0
    }
}

impl Default for Bounds3 {
    fn default() -> Self {
        Self::EMPTY
    }
}
