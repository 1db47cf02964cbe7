//! JSON scene description.
//!
//! Everything the renderer needs to assemble a scene: image and camera
//! parameters, integrator settings, named materials, and a list of objects
//! referring to those materials by name. Vectors are plain `[f32; 3]` arrays
//! in the file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use luma_math::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub width: u32,
    pub height: u32,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub background: [f32; 3],
    /// Probability of continuing a path at each bounce
    pub russian_roulette: f32,
    pub samples_per_pixel: u32,
    pub camera: CameraDescription,
    pub bvh: BvhSettings,
    pub materials: HashMap<String, MaterialDescription>,
    pub objects: Vec<ObjectDescription>,

    /// Directory mesh paths are resolved against. Set by [`SceneDescription::load`].
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self {
            width: 784,
            height: 784,
            fov: 40.0,
            background: [0.0, 0.0, 0.0],
            russian_roulette: 0.8,
            samples_per_pixel: 16,
            camera: CameraDescription::default(),
            bvh: BvhSettings::default(),
            materials: HashMap::new(),
            objects: Vec::new(),
            base_dir: PathBuf::new(),
        }
    }
}

impl SceneDescription {
    /// Read and validate a scene file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut description = Self::from_json(&text)?;
        description.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        log::info!(
            "Loaded scene description {}: {} objects, {} materials",
            path.display(),
            description.objects.len(),
            description.materials.len()
        );
        Ok(description)
    }

    /// Parse and validate a scene from a JSON string.
    pub fn from_json(text: &str) -> Result<Self> {
        let description: Self = serde_json::from_str(text)?;
        description.validate()?;
        Ok(description)
    }

    /// Check parameter ranges and material references.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidScene(format!(
                "image size {}x{} is empty",
                self.width, self.height
            )));
        }
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(Error::InvalidScene(format!("fov {} out of range", self.fov)));
        }
        if !(self.russian_roulette > 0.0 && self.russian_roulette <= 1.0) {
            return Err(Error::InvalidScene(format!(
                "russian_roulette {} must be in (0, 1]",
                self.russian_roulette
            )));
        }
        for object in &self.objects {
            let name = object.material();
            if !self.materials.contains_key(name) {
                return Err(Error::UnknownMaterial(name.to_string()));
            }
        }
        Ok(())
    }

    /// Resolve a mesh path relative to the scene file.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDescription {
    pub look_from: [f32; 3],
    pub look_at: [f32; 3],
    pub vup: [f32; 3],
}

impl Default for CameraDescription {
    fn default() -> Self {
        Self {
            look_from: [278.0, 273.0, -800.0],
            look_at: [278.0, 273.0, 0.0],
            vup: [0.0, 1.0, 0.0],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitKind {
    /// Equal primitive counts on both sides
    Naive,
    /// Surface area heuristic
    Sah,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BvhSettings {
    pub split: SplitKind,
    pub max_prims_in_node: usize,
}

impl Default for BvhSettings {
    fn default() -> Self {
        Self {
            split: SplitKind::Sah,
            max_prims_in_node: 1,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MaterialDescription {
    Diffuse {
        kd: [f32; 3],
        #[serde(default)]
        emission: [f32; 3],
    },
    Microfacet {
        kd: [f32; 3],
        ks: [f32; 3],
        ior: f32,
        roughness: f32,
        #[serde(default)]
        emission: [f32; 3],
    },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformDescription {
    pub translate: [f32; 3],
    pub scale: Option<[f32; 3]>,
    /// Degrees
    pub rotate_x: f32,
    /// Degrees
    pub rotate_y: f32,
}

impl TransformDescription {
    /// Model matrix: translate * scale * rotate_y * rotate_x.
    pub fn to_matrix(&self) -> Mat4 {
        let scale = self.scale.map(Vec3::from).unwrap_or(Vec3::ONE);
        Mat4::from_translation(Vec3::from(self.translate))
            * Mat4::from_scale(scale)
            * Mat4::from_rotation_y(self.rotate_y.to_radians())
            * Mat4::from_rotation_x(self.rotate_x.to_radians())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectDescription {
    Mesh {
        path: PathBuf,
        material: String,
        #[serde(default)]
        transform: TransformDescription,
    },
    Triangle {
        vertices: [[f32; 3]; 3],
        material: String,
    },
    /// Parallelogram spanned by two edges from a corner
    Quad {
        corner: [f32; 3],
        edge_u: [f32; 3],
        edge_v: [f32; 3],
        material: String,
    },
    Sphere {
        center: [f32; 3],
        radius: f32,
        material: String,
    },
}

impl ObjectDescription {
    /// Name of the material this object refers to.
    pub fn material(&self) -> &str {
        match self {
            ObjectDescription::Mesh { material, .. }
            | ObjectDescription::Triangle { material, .. }
            | ObjectDescription::Quad { material, .. }
            | ObjectDescription::Sphere { material, .. } => material,
        }
    }
}
