//! Luma Core - renderer-agnostic scene data.
//!
//! This crate provides:
//!
//! - **Scene description**: the serde model of a JSON scene file
//! - **Meshes**: triangle soups loaded from OBJ files
//! - **Errors**: the `Error` type shared by loading code
//!
//! # Example
//!
//! ```ignore
//! use luma_core::SceneDescription;
//!
//! let description = SceneDescription::load("cornell.json")?;
//! println!("{} objects, {} materials",
//!     description.objects.len(),
//!     description.materials.len());
//! ```

pub mod description;
pub mod error;
pub mod mesh;

// Re-export commonly used types
pub use description::{
    BvhSettings, CameraDescription, MaterialDescription, ObjectDescription, SceneDescription,
    SplitKind, TransformDescription,
};
pub use error::{Error, Result};
pub use mesh::Mesh;
