//! Turn a parsed scene description into a renderable scene and camera.

use std::collections::HashMap;
use std::sync::Arc;

use luma_core::{Error, MaterialDescription, Mesh, ObjectDescription, SceneDescription};
use luma_math::{Mat4, Vec3};

use crate::camera::Camera;
use crate::error::RenderError;
use crate::material::Material;
use crate::mesh::TriangleMesh;
use crate::scene::Scene;
use crate::sphere::Sphere;
use crate::triangle::Triangle;

impl From<&MaterialDescription> for Material {
    fn from(description: &MaterialDescription) -> Self {
        match description {
            MaterialDescription::Diffuse { kd, emission } => {
                Material::emissive(Vec3::from(*emission), Vec3::from(*kd))
            }
            MaterialDescription::Microfacet {
                kd,
                ks,
                ior,
                roughness,
                emission,
            } => Material::microfacet(Vec3::from(*kd), Vec3::from(*ks), *ior, *roughness)
                .with_emission(Vec3::from(*emission)),
        }
    }
}

/// Build every object of `description` and the BVH over them.
pub fn build_scene(description: &SceneDescription) -> Result<Scene, RenderError> {
    if description.objects.is_empty() {
        return Err(RenderError::NoPrimitives);
    }

    let materials: HashMap<&str, Arc<Material>> = description
        .materials
        .iter()
        .map(|(name, m)| (name.as_str(), Arc::new(Material::from(m))))
        .collect();

    let mut scene = Scene::new(description.width, description.height)
        .with_fov(description.fov)
        .with_background(Vec3::from(description.background))
        .with_russian_roulette(description.russian_roulette)
        .with_bvh(
            description.bvh.split.into(),
            description.bvh.max_prims_in_node,
        );

    for object in &description.objects {
        let name = object.material();
        let material = materials
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownMaterial(name.to_string()))?;

        match object {
            ObjectDescription::Mesh {
                path, transform, ..
            } => {
                let path = description.resolve_path(path);
                let mut mesh = Mesh::load_obj(&path)?;
                let matrix = transform.to_matrix();
                if matrix != Mat4::IDENTITY {
                    mesh = mesh.transformed(&matrix);
                }
                let mesh = TriangleMesh::new(&mesh, material).ok_or(Error::EmptyMesh(path))?;
                scene.add(Arc::new(mesh));
            }
            ObjectDescription::Triangle { vertices, .. } => {
                let [a, b, c] = (*vertices).map(Vec3::from);
                scene.add(Arc::new(Triangle::new(a, b, c, material)));
            }
            ObjectDescription::Quad {
                corner,
                edge_u,
                edge_v,
                ..
            } => {
                let halves = Triangle::quad(
                    Vec3::from(*corner),
                    Vec3::from(*edge_u),
                    Vec3::from(*edge_v),
                    material,
                );
                for half in halves {
                    scene.add(Arc::new(half));
                }
            }
            ObjectDescription::Sphere { center, radius, .. } => {
                scene.add(Arc::new(Sphere::new(Vec3::from(*center), *radius, material)));
            }
        }
    }

    log::info!(
        "Assembled {} primitives from {} objects",
        scene.primitives().len(),
        description.objects.len()
    );
    scene.build_bvh();
    Ok(scene)
}

/// Camera matching the description's resolution, field of view and pose.
pub fn build_camera(description: &SceneDescription) -> Camera {
    let pose = &description.camera;
    let mut camera = Camera::new()
        .with_resolution(description.width, description.height)
        .with_fov(description.fov)
        .with_position(
            Vec3::from(pose.look_from),
            Vec3::from(pose.look_at),
            Vec3::from(pose.vup),
        );
    camera.initialize();
    camera
}
