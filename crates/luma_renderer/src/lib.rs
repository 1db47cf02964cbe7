//! Luma Renderer - CPU path tracing
//!
//! A Monte Carlo path tracer with next-event estimation and Russian roulette
//! termination, built around a BVH that answers both nearest-hit queries and
//! area-weighted emitter sampling.
//!
//! # Example
//!
//! ```ignore
//! use luma_core::SceneDescription;
//! use luma_renderer::{build_camera, build_scene, render, RenderConfig};
//!
//! let description = SceneDescription::load("cornell.json")?;
//! let scene = build_scene(&description)?;
//! let camera = build_camera(&description);
//! let image = render(&scene, &camera, &RenderConfig::default());
//! image.save("binary.ppm")?;
//! ```

mod assemble;
mod bucket;
mod bvh;
mod camera;
mod error;
mod integrator;
mod intersection;
mod material;
mod mesh;
mod primitive;
mod renderer;
mod sampling;
mod scene;
mod sphere;
mod triangle;

pub use assemble::{build_camera, build_scene};
pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{Bvh, BvhNode, SplitMethod};
pub use camera::Camera;
pub use error::RenderError;
pub use integrator::MIN_BOUNCE_PDF;
pub use intersection::{face_forward, Intersection, LightSample};
pub use material::{Color, Diffuse, Material, Microfacet, EPSILON};
pub use mesh::TriangleMesh;
pub use primitive::{Primitive, RAY_EPSILON};
pub use renderer::{color_to_rgb, render, render_pixel, to_byte, ImageBuffer, RenderConfig, OUTPUT_GAMMA};
pub use sampling::{gen_f32, to_world, uniform_hemisphere, uniform_sphere};
pub use scene::Scene;
pub use sphere::Sphere;
pub use triangle::Triangle;

/// Re-export common math types from luma_math
pub use luma_math::{Bounds3, Ray, Vec3};
