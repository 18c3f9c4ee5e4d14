//! Local-to-world placement of scene nodes.
//!
//! The inverse and the normal matrix are computed once when the transform is
//! built, since every ray of a render pass needs them.

use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Vector3};

#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    local_to_world: Matrix4<f32>,
    world_to_local: Matrix4<f32>,
    normal_matrix: Matrix3<f32>,
}

impl Transform {
    /// Returns `None` if the matrix can't be inverted.
    pub fn new(local_to_world: Matrix4<f32>) -> Option<Self> {
        let world_to_local = local_to_world.try_inverse()?;
        // inverse-transpose of the linear part, keeps normals perpendicular under non-uniform scale
        let normal_matrix = world_to_local.fixed_view::<3, 3>(0, 0).transpose();
        Some(Self {
            local_to_world,
            world_to_local,
            normal_matrix,
        })
    }

    pub fn identity() -> Self {
        Self {
            local_to_world: Matrix4::identity(),
            world_to_local: Matrix4::identity(),
            normal_matrix: Matrix3::identity(),
        }
    }

    /// Builds `translation * rotation * scale`, with the rotation given as
    /// Euler angles in degrees (applied about x, then y, then z).
    pub fn from_parts(translation: Vector3<f32>, rotation_degrees: Vector3<f32>, scale: Vector3<f32>) -> Option<Self> {
        let rotation = Rotation3::from_euler_angles(
            rotation_degrees.x.to_radians(),
            rotation_degrees.y.to_radians(),
            rotation_degrees.z.to_radians(),
        );
        let matrix = Matrix4::new_translation(&translation)
            * rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&scale);
        Self::new(matrix)
    }

    /// `self` applied after `child`, i.e. the world transform of a child node.
    pub fn then(&self, child: &Transform) -> Option<Self> {
        Self::new(self.local_to_world * child.local_to_world)
    }

    pub fn local_to_world(&self) -> &Matrix4<f32> {
        &self.local_to_world
    }

    pub fn world_to_local(&self) -> &Matrix4<f32> {
        &self.world_to_local
    }

    pub fn normal_matrix(&self) -> &Matrix3<f32> {
        &self.normal_matrix
    }

    pub fn world_position(&self) -> Point3<f32> {
        self.local_to_world.transform_point(&Point3::origin())
    }

    pub fn to_world_vector(&self, vector: &Vector3<f32>) -> Vector3<f32> {
        self.local_to_world.transform_vector(vector)
    }

    /// Maps a local-frame surface normal into world space, normalised.
    pub fn to_world_normal(&self, normal: &Vector3<f32>) -> Vector3<f32> {
        (self.normal_matrix * normal).normalize()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
