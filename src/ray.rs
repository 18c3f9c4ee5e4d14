use nalgebra::{Matrix4, Point3, Vector3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// Maps the ray into another frame. The origin goes through the full affine
    /// transform, the direction only through its linear part.
    ///
    /// The direction is not renormalised, so a parameter `t` names the same
    /// point in both frames.
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Ray {
        Ray::new(
            matrix.transform_point(&self.origin),
            matrix.transform_vector(&self.direction),
        )
    }
}

/// Closest-hit bookkeeping for a single ray cast.
///
/// Intersection routines only write to it when they find a hit strictly
/// closer than `time`, so scanning primitives in any order leaves the
/// nearest one behind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitRecord {
    pub time: f32,
    pub normal: Vector3<f32>,
}

impl HitRecord {
    pub fn new() -> Self {
        Self {
            time: f32::INFINITY,
            normal: Vector3::zeros(),
        }
    }

    /// A record that only accepts hits closer than `time`.
    pub fn within(time: f32) -> Self {
        Self {
            time,
            ..Self::new()
        }
    }

    /// Whether `t` may replace the current hit.
    pub fn accepts(&self, t: f32, t_min: f32) -> bool {
        t_min < t && t < self.time
    }
}

impl Default for HitRecord {
    fn default() -> Self {
        Self::new()
    }
}
