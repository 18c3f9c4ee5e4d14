//! TOML scene files.
//!
//! ```toml
//! [render]
//! width = 320
//! height = 240
//! max_bounces = 2
//! background = [0.1, 0.1, 0.2]
//!
//! [camera]
//! position = [0, 1, 6]
//! look_at = [0, 0, 0]
//!
//! [materials.grey]
//! diffuse = [0.5, 0.5, 0.5]
//!
//! [[nodes]]
//! name = "floor"
//! material = "grey"
//! object = { type = "plane", normal = [0, 1, 0], d = -1 }
//!
//! [[nodes]]
//! name = "sun"
//! light = { type = "directional", color = [1, 1, 1], direction = [-1, -1, -1] }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use nalgebra::{Point3, Vector3};
use serde::Deserialize;

use crate::camera::Camera;
use crate::environment::{Background, CubeMap};
use crate::error::{Error, Result};
use crate::light::Light;
use crate::material::Material;
use crate::object::{Mesh, Object, Plane, Sphere, Triangle};
use crate::picture::Color;
use crate::scene::{Scene, SceneNode};
use crate::transform::Transform;

fn point(v: [f32; 3]) -> Point3<f32> {
    Point3::from(v)
}

fn vector(v: [f32; 3]) -> Vector3<f32> {
    Vector3::from(v)
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDescription {
    #[serde(default)]
    pub render: RenderSettings,
    #[serde(default)]
    pub camera: CameraDescription,
    #[serde(default)]
    pub materials: BTreeMap<String, MaterialDescription>,
    #[serde(default)]
    pub nodes: Vec<NodeDescription>,
    /// Directory relative paths in the file are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub max_bounces: u32,
    pub shadows: bool,
    pub background: Color,
    pub cube_map: Option<CubeMapDescription>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            width: 640,
            height: 480,
            max_bounces: 3,
            shadows: true,
            background: Color::BLACK,
            cube_map: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CubeMapDescription {
    pub right: PathBuf,
    pub left: PathBuf,
    pub top: PathBuf,
    pub bottom: PathBuf,
    pub front: PathBuf,
    pub back: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraDescription {
    pub position: [f32; 3],
    pub look_at: [f32; 3],
    pub up: [f32; 3],
    pub fov: f32,
}

impl Default for CameraDescription {
    fn default() -> Self {
        let camera = Camera::default();
        CameraDescription {
            position: camera.position.into(),
            look_at: camera.look_at.into(),
            up: camera.up.into(),
            fov: camera.fov,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaterialDescription {
    pub diffuse: Color,
    pub specular: Color,
    pub shininess: f32,
}

impl Default for MaterialDescription {
    fn default() -> Self {
        let material = Material::default();
        MaterialDescription {
            diffuse: material.diffuse,
            specular: material.specular,
            shininess: material.shininess,
        }
    }
}

impl From<&MaterialDescription> for Material {
    fn from(value: &MaterialDescription) -> Self {
        Material::new(value.diffuse, value.specular, value.shininess)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ObjectDescription {
    Plane {
        normal: [f32; 3],
        #[serde(default)]
        d: f32,
    },
    Triangle {
        positions: [[f32; 3]; 3],
        /// Flat shading when absent.
        normals: Option<[[f32; 3]; 3]>,
    },
    Sphere {
        #[serde(default = "unit")]
        radius: f32,
    },
    Mesh {
        positions: Vec<[f32; 3]>,
        /// One per position; flat shading when absent.
        normals: Option<Vec<[f32; 3]>>,
        indices: Vec<[usize; 3]>,
    },
}

fn unit() -> f32 {
    1.0
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum LightDescription {
    Ambient {
        color: Color,
    },
    Directional {
        color: Color,
        direction: [f32; 3],
    },
    Point {
        color: Color,
        #[serde(default)]
        position: [f32; 3],
        #[serde(default)]
        attenuation: f32,
    },
}

impl From<&LightDescription> for Light {
    fn from(value: &LightDescription) -> Self {
        match *value {
            LightDescription::Ambient { color } => Light::Ambient { color },
            LightDescription::Directional { color, direction } => Light::Directional {
                color,
                direction: vector(direction),
            },
            LightDescription::Point {
                color,
                position,
                attenuation,
            } => Light::Point {
                color,
                position: point(position),
                attenuation,
            },
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeDescription {
    pub name: String,
    pub translation: [f32; 3],
    /// Euler angles in degrees.
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub material: Option<String>,
    pub object: Option<ObjectDescription>,
    pub light: Option<LightDescription>,
    pub children: Vec<NodeDescription>,
}

impl Default for NodeDescription {
    fn default() -> Self {
        NodeDescription {
            name: String::new(),
            translation: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            material: None,
            object: None,
            light: None,
            children: Vec::new(),
        }
    }
}

impl SceneDescription {
    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut description = Self::parse(&text).map_err(|source| Error::SceneParse {
            path: path.to_path_buf(),
            source,
        })?;
        description.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        debug!(
            target: "app",
            "Loaded {} ({} materials, {} top-level nodes)",
            path.display(),
            description.materials.len(),
            description.nodes.len()
        );
        Ok(description)
    }

    pub fn camera(&self) -> Camera {
        let camera = &self.camera;
        Camera::new(point(camera.position), point(camera.look_at), vector(camera.up), camera.fov)
    }

    /// Loads the cube map if one is configured, the flat color otherwise.
    pub fn background(&self) -> Result<Background> {
        let Some(faces) = &self.render.cube_map else {
            return Ok(Background::Flat(self.render.background));
        };
        let paths = [&faces.right, &faces.left, &faces.top, &faces.bottom, &faces.front, &faces.back]
            .map(|path| self.base_dir.join(path));
        debug!(target: "app", "Loading cube map from {}", self.base_dir.display());
        Ok(Background::CubeMap(CubeMap::open(paths)?))
    }

    pub fn build_scene(&self) -> Result<Scene> {
        Scene::from_root(&self.build_graph()?)
    }

    /// The node tree, under an unnamed identity root.
    pub fn build_graph(&self) -> Result<SceneNode> {
        let mut root = SceneNode::new("");
        for node in &self.nodes {
            root.children.push(self.build_node(node)?);
        }
        Ok(root)
    }

    fn build_node(&self, node: &NodeDescription) -> Result<SceneNode> {
        let transform = Transform::from_parts(vector(node.translation), vector(node.rotation), vector(node.scale))
            .ok_or_else(|| Error::SingularTransform {
                node: node.name.clone(),
            })?;

        let material = match &node.material {
            Some(name) => Some(
                self.materials
                    .get(name)
                    .map(Material::from)
                    .ok_or_else(|| Error::UnknownMaterial {
                        node: node.name.clone(),
                        name: name.clone(),
                    })?,
            ),
            None => None,
        };

        let object = node
            .object
            .as_ref()
            .map(|object| build_object(&node.name, object))
            .transpose()?;

        let children = node
            .children
            .iter()
            .map(|child| self.build_node(child))
            .collect::<Result<Vec<_>>>()?;

        Ok(SceneNode {
            name: node.name.clone(),
            transform,
            object,
            material,
            light: node.light.as_ref().map(Light::from),
            children,
        })
    }
}

fn build_object(node: &str, object: &ObjectDescription) -> Result<Object> {
    let object = match object {
        ObjectDescription::Plane { normal, d } => Plane::new(vector(*normal).normalize(), *d).into(),
        ObjectDescription::Triangle { positions, normals } => {
            let positions = positions.map(point);
            let triangle = match normals {
                Some(normals) => Triangle::new(positions, normals.map(vector)),
                None => Triangle::flat(positions),
            };
            triangle.into()
        }
        ObjectDescription::Sphere { radius } => Sphere::new(*radius).into(),
        ObjectDescription::Mesh {
            positions,
            normals,
            indices,
        } => build_mesh(node, positions, normals.as_deref(), indices)?.into(),
    };
    Ok(object)
}

fn build_mesh(node: &str, positions: &[[f32; 3]], normals: Option<&[[f32; 3]]>, indices: &[[usize; 3]]) -> Result<Mesh> {
    let invalid = |reason: String| Error::InvalidMesh {
        node: node.to_string(),
        reason,
    };

    if let Some(normals) = normals {
        if normals.len() != positions.len() {
            return Err(invalid(format!(
                "{} normals for {} positions",
                normals.len(),
                positions.len()
            )));
        }
    }

    let mut triangles = Vec::with_capacity(indices.len());
    for face in indices {
        if let Some(index) = face.iter().find(|&&i| i >= positions.len()) {
            return Err(invalid(format!("index {index} out of range for {} positions", positions.len())));
        }
        let corners = face.map(|i| point(positions[i]));
        triangles.push(match normals {
            Some(normals) => Triangle::new(corners, face.map(|i| vector(normals[i]))),
            None => Triangle::flat(corners),
        });
    }
    Ok(Mesh::new(triangles))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{point, vector};

    use super::*;

    const SAMPLE: &str = r#"
        [render]
        width = 32
        height = 16
        max_bounces = 1
        shadows = false
        background = [0.1, 0.2, 0.3]

        [camera]
        position = [0, 1, 6]
        look_at = [0, 1, 0]
        fov = 60

        [materials.grey]
        diffuse = [0.5, 0.5, 0.5]
        specular = [0.1, 0.1, 0.1]
        shininess = 8

        [[nodes]]
        name = "floor"
        material = "grey"
        object = { type = "plane", normal = [0, 2, 0] }

        [[nodes]]
        name = "group"
        translation = [0, 1, 0]
        material = "grey"

        [[nodes.children]]
        name = "ball"
        translation = [1, 0, 0]
        object = { type = "sphere", radius = 0.5 }

        [[nodes.children]]
        name = "lamp"
        light = { type = "point", color = [1, 1, 1], attenuation = 0.1 }

        [[nodes]]
        name = "ambient"
        light = { type = "ambient", color = [0.1, 0.1, 0.1] }
    "#;

    #[test]
    fn parses_sample() {
        let description = SceneDescription::parse(SAMPLE).unwrap();
        assert_eq!(description.render.width, 32);
        assert!(!description.render.shadows);
        assert_eq!(description.render.background, Color::new(0.1, 0.2, 0.3));
        assert_eq!(description.camera().fov, 60.0);
        assert_eq!(description.camera().up, Vector3::y());
        assert_eq!(description.materials["grey"].shininess, 8.0);
    }

    #[test]
    fn builds_flattened_scene() {
        let scene = SceneDescription::parse(SAMPLE).unwrap().build_scene().unwrap();

        let names: Vec<_> = scene.primitives.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["floor", "ball"]);
        assert_relative_eq!(scene.primitives[1].transform.world_position(), point![1.0, 1.0, 0.0]);
        assert_eq!(scene.primitives[1].material.shininess, 8.0);

        match &scene.primitives[0].object {
            Object::Plane(plane) => assert_relative_eq!(plane.normal, vector![0.0, 1.0, 0.0]),
            other => panic!("unexpected object {other:?}"),
        }

        assert_eq!(scene.lights.len(), 2);
        match &scene.lights[0] {
            Light::Point { position, attenuation, .. } => {
                assert_relative_eq!(*position, point![0.0, 1.0, 0.0]);
                assert_eq!(*attenuation, 0.1);
            }
            other => panic!("unexpected light {other:?}"),
        }
    }

    #[test]
    fn defaults_fill_missing_tables() {
        let description = SceneDescription::parse("").unwrap();
        assert_eq!(description.render.width, 640);
        assert!(description.render.shadows);
        assert_eq!(description.camera(), Camera::default());
        assert!(matches!(description.background().unwrap(), Background::Flat(color) if color == Color::BLACK));
    }

    #[test]
    fn unknown_material_is_reported() {
        let description = SceneDescription::parse(
            r#"
            [[nodes]]
            name = "ghost"
            material = "chrome"
            object = { type = "sphere" }
            "#,
        )
        .unwrap();
        assert!(matches!(
            description.build_scene(),
            Err(Error::UnknownMaterial { node, name }) if node == "ghost" && name == "chrome"
        ));
    }

    #[test]
    fn zero_scale_is_singular() {
        let description = SceneDescription::parse(
            r#"
            [[nodes]]
            name = "flat"
            scale = [1, 0, 1]
            "#,
        )
        .unwrap();
        assert!(matches!(description.build_scene(), Err(Error::SingularTransform { node }) if node == "flat"));
    }

    #[test]
    fn mesh_indices_are_checked() {
        let description = SceneDescription::parse(
            r#"
            [materials.m]
            [[nodes]]
            name = "broken"
            material = "m"
            object = { type = "mesh", positions = [[0, 0, 0], [1, 0, 0], [0, 1, 0]], indices = [[0, 1, 3]] }
            "#,
        )
        .unwrap();
        assert!(matches!(description.build_scene(), Err(Error::InvalidMesh { node, .. }) if node == "broken"));
    }

    #[test]
    fn mesh_builds_triangles() {
        let description = SceneDescription::parse(
            r#"
            [materials.m]
            [[nodes]]
            name = "quad"
            material = "m"
            object = { type = "mesh", positions = [[0, 0, 0], [1, 0, 0], [1, 1, 0], [0, 1, 0]], indices = [[0, 1, 2], [0, 2, 3]] }
            "#,
        )
        .unwrap();
        let scene = description.build_scene().unwrap();
        match &scene.primitives[0].object {
            Object::Mesh(mesh) => {
                assert_eq!(mesh.triangles.len(), 2);
                assert_eq!(mesh.triangles[1].normals[0], vector![0.0, 0.0, 1.0]);
            }
            other => panic!("unexpected object {other:?}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(SceneDescription::parse("[render]\nwidht = 3").is_err());
        assert!(SceneDescription::parse("[[nodes]]\nobject = { type = \"cone\" }").is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = SceneDescription::load(dir.path().join("nope.toml"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn cube_map_paths_are_relative_to_scene() {
        let dir = tempfile::tempdir().unwrap();
        for (i, face) in crate::environment::FACE_NAMES.iter().enumerate() {
            image::RgbImage::from_pixel(1, 1, image::Rgb([i as u8, 0, 0]))
                .save(dir.path().join(format!("{face}.png")))
                .unwrap();
        }
        let scene_path = dir.path().join("scene.toml");
        std::fs::write(
            &scene_path,
            r#"
            [render.cube_map]
            right = "right.png"
            left = "left.png"
            top = "top.png"
            bottom = "bottom.png"
            front = "front.png"
            back = "back.png"
            "#,
        )
        .unwrap();

        let background = SceneDescription::load(&scene_path).unwrap().background().unwrap();
        assert_eq!(background.color(&vector![0.0, 0.0, -1.0]).r, 5.0 / 255.0);
    }
}
