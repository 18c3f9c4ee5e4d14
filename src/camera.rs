use nalgebra::{Point2, Point3, Vector3};

use crate::ray::Ray;

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub look_at: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view, in degrees.
    pub fov: f32,
}

impl Camera {
    pub fn new(position: Point3<f32>, look_at: Point3<f32>, up: Vector3<f32>, fov: f32) -> Self {
        Camera {
            position,
            look_at,
            up,
            fov,
        }
    }

    /// Fixes the camera basis for an image of the given size.
    pub fn viewport(&self, width: u32, height: u32) -> Viewport {
        let aspect_ratio = width as f32 / height.max(1) as f32;

        let forward = (self.look_at - self.position).normalize();
        let right = forward.cross(&self.up).normalize();
        let up = right.cross(&forward);

        Viewport {
            origin: self.position,
            forward: forward / (self.fov.to_radians() / 2.0).tan(),
            horizontal: right * aspect_ratio,
            vertical: up,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Camera::new(Point3::new(0.0, 0.0, 5.0), Point3::origin(), Vector3::y(), 45.0)
    }
}

pub struct Viewport {
    pub origin: Point3<f32>,
    /// Forward axis, scaled by the focal distance.
    pub forward: Vector3<f32>,
    /// Right axis, scaled by the aspect ratio.
    pub horizontal: Vector3<f32>,
    pub vertical: Vector3<f32>,
}

impl Viewport {
    /// World-space ray through a normalised device coordinate in `[-1, 1]²`.
    pub fn generate_ray(&self, ndc: &Point2<f32>) -> Ray {
        let direction = self.forward + ndc.x * self.horizontal + ndc.y * self.vertical;
        Ray::new(self.origin, direction.normalize())
    }
}
