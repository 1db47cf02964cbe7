//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree with exactly one primitive per leaf. Each node caches its
//! bounds, the total surface area of its subtree and the part of that area
//! which emits light, so the same tree answers nearest-hit queries and draws
//! points on emitters proportionally to their area.

use std::sync::Arc;
use std::time::Instant;

use crate::intersection::{Intersection, LightSample};
use crate::primitive::Primitive;
use crate::sampling::gen_f32;
use luma_core::SplitKind;
use luma_math::{Bounds3, Ray};
use rand::RngCore;

/// Number of candidate split positions the SAH evaluates.
const SAH_BUCKETS: usize = 10;

/// Fixed traversal cost added to every SAH candidate.
const SAH_TRAVERSAL_COST: f32 = 0.125;

/// Largest accepted `max_prims_in_node`.
const MAX_PRIMS_LIMIT: usize = 255;

/// How interior nodes partition their primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitMethod {
    /// Split at the median of the centroid-sorted list
    Naive,
    /// Surface area heuristic over evenly spaced candidates
    #[default]
    Sah,
}

impl From<SplitKind> for SplitMethod {
    fn from(kind: SplitKind) -> Self {
        match kind {
            SplitKind::Naive => SplitMethod::Naive,
            SplitKind::Sah => SplitMethod::Sah,
        }
    }
}

/// BVH node - either an interior node with two children or a leaf.
pub enum BvhNode {
    /// Leaf holding a single primitive.
    Leaf {
        bounds: Bounds3,
        area: f32,
        emit_area: f32,
        primitive: Arc<dyn Primitive>,
    },
    /// Internal node with two children.
    Interior {
        bounds: Bounds3,
        area: f32,
        emit_area: f32,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    fn leaf(primitive: Arc<dyn Primitive>) -> Self {
        let area = primitive.area();
        BvhNode::Leaf {
            bounds: primitive.bounds(),
            area,
            emit_area: if primitive.has_emit() { area } else { 0.0 },
            primitive,
        }
    }

    fn interior(left: BvhNode, right: BvhNode) -> Self {
        BvhNode::Interior {
            bounds: Bounds3::union(&left.bounds(), &right.bounds()),
            area: left.area() + right.area(),
            emit_area: left.emit_area() + right.emit_area(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn bounds(&self) -> Bounds3 {
        match self {
            BvhNode::Leaf { bounds, .. } | BvhNode::Interior { bounds, .. } => *bounds,
        }
    }

    /// Surface area of every primitive below this node.
    pub fn area(&self) -> f32 {
        match self {
            BvhNode::Leaf { area, .. } | BvhNode::Interior { area, .. } => *area,
        }
    }

    /// Surface area of the emitting primitives below this node.
    pub fn emit_area(&self) -> f32 {
        match self {
            BvhNode::Leaf { emit_area, .. } | BvhNode::Interior { emit_area, .. } => *emit_area,
        }
    }
}

#[derive(Default)]
struct BuildStats {
    leaves: usize,
    interiors: usize,
}

/// Immutable BVH over a set of shared primitives.
pub struct Bvh {
    root: Option<BvhNode>,
    split_method: SplitMethod,
    max_prims_in_node: usize,
    leaf_count: usize,
    interior_count: usize,
}

impl Bvh {
    /// Build a hierarchy over `primitives`.
    ///
    /// `max_prims_in_node` is clamped to 255 and recorded; leaves always
    /// hold exactly one primitive.
    pub fn build(
        primitives: &[Arc<dyn Primitive>],
        max_prims_in_node: usize,
        split_method: SplitMethod,
    ) -> Self {
        let start = Instant::now();
        let max_prims_in_node = max_prims_in_node.min(MAX_PRIMS_LIMIT);
        if max_prims_in_node > 1 {
            log::warn!(
                "max_prims_in_node = {} requested; leaves hold a single primitive",
                max_prims_in_node
            );
        }

        let mut stats = BuildStats::default();
        let root = if primitives.is_empty() {
            None
        } else {
            Some(recursive_build(primitives.to_vec(), split_method, &mut stats))
        };

        log::debug!(
            "BVH built over {} primitives ({:?}): {} leaves, {} interior nodes in {:.2?}",
            primitives.len(),
            split_method,
            stats.leaves,
            stats.interiors,
            start.elapsed()
        );

        Self {
            root,
            split_method,
            max_prims_in_node,
            leaf_count: stats.leaves,
            interior_count: stats.interiors,
        }
    }

    /// Nearest hit along `ray`.
    pub fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        match &self.root {
            Some(root) => intersect_node(root, ray),
            None => Intersection::default(),
        }
    }

    /// Draw a point on an emitter, choosing emitters proportionally to area.
    ///
    /// `target` lies in `[0, emit_area())` and steers the descent. The pdf of
    /// the returned sample is `1 / emit_area()`. `None` when nothing emits.
    pub fn sample_emitter(&self, target: f32, rng: &mut dyn RngCore) -> Option<LightSample> {
        let root = self.root.as_ref()?;
        let total = root.emit_area();
        if !(total > 0.0) {
            return None;
        }

        let primitive = descend(root, target, BvhNode::emit_area);
        let mut sample = primitive.sample(rng)?;
        sample.pdf = 1.0 / total;
        Some(sample)
    }

    /// [`Bvh::sample_emitter`] with a uniformly drawn target.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Option<LightSample> {
        let target = gen_f32(rng) * self.emit_area();
        self.sample_emitter(target, rng)
    }

    /// Draw a point uniformly over all primitives, emitting or not.
    ///
    /// The pdf of the returned sample is `1 / area()`.
    pub fn sample_surface(&self, rng: &mut dyn RngCore) -> Option<LightSample> {
        let root = self.root.as_ref()?;
        let total = root.area();
        if !(total > 0.0) {
            return None;
        }

        let target = gen_f32(rng) * total;
        let primitive = descend(root, target, BvhNode::area);
        let mut sample = primitive.sample(rng)?;
        sample.pdf = 1.0 / total;
        Some(sample)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Bounds of the whole tree (empty box for an empty tree).
    pub fn bounds(&self) -> Bounds3 {
        self.root.as_ref().map_or(Bounds3::EMPTY, BvhNode::bounds)
    }

    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    pub fn area(&self) -> f32 {
        self.root.as_ref().map_or(0.0, BvhNode::area)
    }

    pub fn emit_area(&self) -> f32 {
        self.root.as_ref().map_or(0.0, BvhNode::emit_area)
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    pub fn interior_count(&self) -> usize {
        self.interior_count
    }

    pub fn split_method(&self) -> SplitMethod {
        self.split_method
    }

    pub fn max_prims_in_node(&self) -> usize {
        self.max_prims_in_node
    }

    /// Primitive of every leaf, left to right.
    pub fn leaf_primitives(&self) -> Vec<&Arc<dyn Primitive>> {
        let mut out = Vec::with_capacity(self.leaf_count);
        let mut stack: Vec<&BvhNode> = self.root.iter().collect();
        while let Some(node) = stack.pop() {
            match node {
                BvhNode::Leaf { primitive, .. } => out.push(primitive),
                BvhNode::Interior { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        out
    }
}

fn recursive_build(
    mut primitives: Vec<Arc<dyn Primitive>>,
    split_method: SplitMethod,
    stats: &mut BuildStats,
) -> BvhNode {
    match primitives.len() {
        1 => {
            stats.leaves += 1;
            return BvhNode::leaf(primitives.remove(0));
        }
        2 => {
            let right = primitives.remove(1);
            let left = primitives.remove(0);
            stats.leaves += 2;
            stats.interiors += 1;
            return BvhNode::interior(BvhNode::leaf(left), BvhNode::leaf(right));
        }
        _ => {}
    }

    let centroids = centroid_bounds(&primitives);
    let axis = centroids.max_extent();
    primitives.sort_by(|a, b| {
        a.bounds().centroid()[axis].total_cmp(&b.bounds().centroid()[axis])
    });

    let n = primitives.len();
    let mid = match split_method {
        SplitMethod::Naive => n / 2,
        SplitMethod::Sah => sah_split(&primitives, &centroids).unwrap_or(n / 2),
    };

    let right_primitives = primitives.split_off(mid);
    let left = recursive_build(primitives, split_method, stats);
    let right = recursive_build(right_primitives, split_method, stats);
    stats.interiors += 1;

    BvhNode::interior(left, right)
}

fn centroid_bounds(primitives: &[Arc<dyn Primitive>]) -> Bounds3 {
    primitives.iter().fold(Bounds3::EMPTY, |acc, p| {
        Bounds3::union_point(&acc, p.bounds().centroid())
    })
}

/// Cheapest SAH split index over a centroid-sorted list.
///
/// Candidates that leave a side empty or produce a non-finite cost are
/// skipped; `None` when no candidate qualifies.
fn sah_split(primitives: &[Arc<dyn Primitive>], centroids: &Bounds3) -> Option<usize> {
    let n = primitives.len();
    let total_area = centroids.surface_area();

    let mut best = None;
    let mut min_cost = f32::INFINITY;
    for i in 1..SAH_BUCKETS {
        let mid = n * i / SAH_BUCKETS;
        if mid == 0 || mid >= n {
            continue;
        }

        let left = centroid_bounds(&primitives[..mid]);
        let right = centroid_bounds(&primitives[mid..]);
        let cost = SAH_TRAVERSAL_COST
            + (mid as f32 * left.surface_area() + (n - mid) as f32 * right.surface_area())
                / total_area;

        if cost.is_finite() && cost < min_cost {
            min_cost = cost;
            best = Some(mid);
        }
    }
    best
}

fn intersect_node<'a>(node: &'a BvhNode, ray: &Ray) -> Intersection<'a> {
    if !node.bounds().intersects_ray(ray) {
        return Intersection::default();
    }

    match node {
        BvhNode::Leaf { primitive, .. } => primitive.intersect(ray),
        BvhNode::Interior { left, right, .. } => {
            let hit_left = intersect_node(left, ray);
            let hit_right = intersect_node(right, ray);

            if hit_left.happened && hit_right.happened {
                if hit_left.distance < hit_right.distance {
                    hit_left
                } else {
                    hit_right
                }
            } else if hit_right.happened {
                hit_right
            } else {
                hit_left
            }
        }
    }
}

/// Walk to a leaf, choosing each child with probability proportional to
/// `weight`. Children of zero weight are never entered unless both are.
fn descend<'a>(
    mut node: &'a BvhNode,
    mut target: f32,
    weight: fn(&BvhNode) -> f32,
) -> &'a Arc<dyn Primitive> {
    loop {
        match node {
            BvhNode::Leaf { primitive, .. } => return primitive,
            BvhNode::Interior { left, right, .. } => {
                let lw = weight(left);
                let rw = weight(right);
                if (target < lw && lw > 0.0) || rw <= 0.0 {
                    node = left.as_ref();
                } else {
                    target -= lw;
                    node = right.as_ref();
                }
            }
        }
    }
}
