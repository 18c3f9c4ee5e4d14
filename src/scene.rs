//! Scene graph and its flattened, render-ready form.

use log::trace;

use crate::error::{Error, Result};
use crate::light::Light;
use crate::material::Material;
use crate::object::{Hittable, Object};
use crate::ray::{HitRecord, Ray};
use crate::transform::Transform;

/// A node of the scene hierarchy. Its transform is relative to its parent.
#[derive(Clone, Debug, Default)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub object: Option<Object>,
    /// Inherited by descendants that don't set their own.
    pub material: Option<Material>,
    pub light: Option<Light>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        SceneNode {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_object(mut self, object: impl Into<Object>, material: Material) -> Self {
        self.object = Some(object.into());
        self.material = Some(material);
        self
    }

    pub fn with_light(mut self, light: Light) -> Self {
        self.light = Some(light);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }
}

/// A traceable object placed in the world.
#[derive(Clone, Debug)]
pub struct Primitive {
    pub name: String,
    pub object: Object,
    pub transform: Transform,
    pub material: Material,
}

impl Primitive {
    /// Intersects a world-space ray, leaving the record in this primitive's frame.
    ///
    /// Ray parameters are frame independent, so `record.time` can be
    /// compared across primitives and evaluated on the world ray.
    pub fn intersect(&self, ray: &Ray, t_min: f32, record: &mut HitRecord) -> bool {
        let local = ray.transform(self.transform.world_to_local());
        self.object.intersect(&local, t_min, record)
    }
}

/// Everything the tracer walks: primitives and lights in world space,
/// in depth-first order of the graph.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub primitives: Vec<Primitive>,
    pub lights: Vec<Light>,
}

impl Scene {
    pub fn new(primitives: Vec<Primitive>, lights: Vec<Light>) -> Self {
        Scene { primitives, lights }
    }

    /// Flattens a scene graph, composing transforms from the root down.
    pub fn from_root(root: &SceneNode) -> Result<Self> {
        let mut scene = Scene::default();
        scene.collect(root, &Transform::identity(), None)?;
        Ok(scene)
    }

    fn collect(&mut self, node: &SceneNode, parent: &Transform, inherited: Option<&Material>) -> Result<()> {
        let world = parent.then(&node.transform).ok_or_else(|| Error::SingularTransform {
            node: node.name.clone(),
        })?;
        let material = node.material.as_ref().or(inherited);

        if let Some(object) = &node.object {
            let material = material.ok_or_else(|| Error::MissingMaterial {
                node: node.name.clone(),
            })?;
            trace!(target: "app", "Placing {} '{}'", object.kind(), node.name);
            self.primitives.push(Primitive {
                name: node.name.clone(),
                object: object.clone(),
                transform: world.clone(),
                material: *material,
            });
        }

        if let Some(light) = &node.light {
            self.lights.push(place_light(light, &world));
        }

        for child in &node.children {
            self.collect(child, &world, material)?;
        }
        Ok(())
    }
}

fn place_light(light: &Light, world: &Transform) -> Light {
    match light {
        Light::Ambient { .. } => light.clone(),
        Light::Directional { color, direction } => Light::Directional {
            color: *color,
            direction: world.to_world_vector(direction),
        },
        Light::Point {
            color,
            position,
            attenuation,
        } => Light::Point {
            color: *color,
            position: world.local_to_world().transform_point(position),
            attenuation: *attenuation,
        },
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{point, vector, Matrix4, Vector3};

    use super::*;
    use crate::object::{Plane, Sphere};
    use crate::picture::Color;

    fn moved(x: f32, y: f32, z: f32) -> Transform {
        Transform::from_parts(vector![x, y, z], Vector3::zeros(), vector![1.0, 1.0, 1.0]).unwrap()
    }

    #[test]
    fn flattens_depth_first_with_world_transforms() {
        let root = SceneNode::new("root")
            .with_transform(moved(0.0, 1.0, 0.0))
            .with_object(Sphere::new(1.0), Material::default())
            .with_child(
                SceneNode::new("child")
                    .with_transform(moved(2.0, 0.0, 0.0))
                    .with_object(Sphere::new(0.5), Material::default()),
            );
        let scene = Scene::from_root(&root).unwrap();

        let names: Vec<_> = scene.primitives.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["root", "child"]);
        assert_relative_eq!(scene.primitives[1].transform.world_position(), point![2.0, 1.0, 0.0]);
    }

    #[test]
    fn children_inherit_material() {
        let red = Material::matte(Color::new(1.0, 0.0, 0.0));
        let mut group = SceneNode::new("group");
        group.material = Some(red);
        let root = group.with_child(SceneNode {
            object: Some(Sphere::new(1.0).into()),
            ..SceneNode::new("ball")
        });

        let scene = Scene::from_root(&root).unwrap();
        assert_eq!(scene.primitives[0].material, red);
    }

    #[test]
    fn object_without_material_is_an_error() {
        let root = SceneNode {
            object: Some(Sphere::new(1.0).into()),
            ..SceneNode::new("bare")
        };
        assert!(matches!(
            Scene::from_root(&root),
            Err(Error::MissingMaterial { node }) if node == "bare"
        ));
    }

    #[test]
    fn lights_are_placed_in_world_space() {
        let root = SceneNode::new("rig").with_transform(moved(0.0, 3.0, 0.0)).with_child(
            SceneNode::new("bulb").with_light(Light::Point {
                color: Color::WHITE,
                position: point![1.0, 0.0, 0.0],
                attenuation: 0.0,
            }),
        );
        let scene = Scene::from_root(&root).unwrap();
        match &scene.lights[0] {
            Light::Point { position, .. } => assert_relative_eq!(*position, point![1.0, 3.0, 0.0]),
            other => panic!("unexpected light {other:?}"),
        }
    }

    #[test]
    fn primitive_intersects_in_its_own_frame() {
        let primitive = Primitive {
            name: "floor".into(),
            object: Plane::new(vector![0.0, 1.0, 0.0], 0.0).into(),
            transform: Transform::new(Matrix4::new_translation(&vector![0.0, -2.0, 0.0])).unwrap(),
            material: Material::default(),
        };
        let ray = Ray::new(point![0.0, 3.0, 0.0], vector![0.0, -1.0, 0.0]);
        let mut record = HitRecord::new();
        assert!(primitive.intersect(&ray, 1e-4, &mut record));
        assert_relative_eq!(record.time, 5.0);
    }
}
