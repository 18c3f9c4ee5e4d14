//! Geometric primitives and their ray intersection routines.
//!
//! Everything here works in the primitive's local frame; placing it in the
//! world is the job of the owning [`crate::scene::Primitive`].

use nalgebra::{Matrix3, Point3, Vector3};

use crate::ray::{HitRecord, Ray};

/// Something a ray can strike.
///
/// Implementations must only touch `record` when they find a hit with
/// `t_min < t < record.time`, and return whether they did.
pub trait Hittable: Send + Sync {
    fn intersect(&self, ray: &Ray, t_min: f32, record: &mut HitRecord) -> bool;
}

/// Infinite plane `dot(normal, p) = d`.
#[derive(Clone, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f32>,
    pub d: f32,
}

impl Plane {
    pub fn new(normal: Vector3<f32>, d: f32) -> Self {
        Plane { normal, d }
    }
}

impl Hittable for Plane {
    fn intersect(&self, ray: &Ray, t_min: f32, record: &mut HitRecord) -> bool {
        // exact test: nearly parallel rays yield a huge t which the range check handles
        if self.normal.dot(&ray.direction.normalize()) == 0.0 {
            return false;
        }

        // solved against the unnormalised direction so t is a parameter of `ray`
        let t = (self.d - self.normal.dot(&ray.origin.coords)) / self.normal.dot(&ray.direction);
        if !record.accepts(t, t_min) {
            return false;
        }

        record.time = t;
        record.normal = self.normal;
        true
    }
}

/// Triangle with per-vertex normals, interpolated across the face.
#[derive(Clone, Debug, PartialEq)]
pub struct Triangle {
    pub positions: [Point3<f32>; 3],
    pub normals: [Vector3<f32>; 3],
}

impl Triangle {
    pub fn new(positions: [Point3<f32>; 3], normals: [Vector3<f32>; 3]) -> Self {
        Triangle { positions, normals }
    }

    /// Triangle whose vertex normals all equal the face normal (counter-clockwise winding).
    pub fn flat(positions: [Point3<f32>; 3]) -> Self {
        let [a, b, c] = positions;
        let normal = (b - a).cross(&(c - a)).normalize();
        Triangle::new(positions, [normal; 3])
    }
}

impl Hittable for Triangle {
    fn intersect(&self, ray: &Ray, t_min: f32, record: &mut HitRecord) -> bool {
        let [a, b, c] = self.positions;
        let system = Matrix3::from_columns(&[a - b, a - c, ray.direction]);

        // zero-area triangle or a ray lying in the triangle's plane
        let Some(inverse) = system.try_inverse() else {
            return false;
        };

        let solution = inverse * (a - ray.origin);
        let (beta, gamma, t) = (solution.x, solution.y, solution.z);
        if beta < 0.0 || gamma < 0.0 || beta + gamma > 1.0 {
            return false;
        }
        if !record.accepts(t, t_min) {
            return false;
        }

        let alpha = 1.0 - beta - gamma;
        let [n0, n1, n2] = self.normals;
        record.time = t;
        record.normal = alpha * n0 + beta * n1 + gamma * n2;
        true
    }
}

/// Sphere centred on the local origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Sphere {
    pub radius: f32,
}

impl Sphere {
    pub fn new(radius: f32) -> Self {
        Sphere { radius }
    }
}

impl Hittable for Sphere {
    fn intersect(&self, ray: &Ray, t_min: f32, record: &mut HitRecord) -> bool {
        let oc = ray.origin.coords;
        let a = ray.direction.magnitude_squared();
        let half_b = oc.dot(&ray.direction);
        let c = oc.magnitude_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 || a == 0.0 {
            return false;
        }
        let sqrtd = discriminant.sqrt();

        // find the nearest root that lies in the acceptable range.
        let mut root = (-half_b - sqrtd) / a;
        if !record.accepts(root, t_min) {
            root = (-half_b + sqrtd) / a;
            if !record.accepts(root, t_min) {
                return false;
            }
        }

        record.time = root;
        record.normal = ray.at(root).coords / self.radius;
        true
    }
}

/// Triangles sharing one frame and material.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Mesh { triangles }
    }
}

impl Hittable for Mesh {
    fn intersect(&self, ray: &Ray, t_min: f32, record: &mut HitRecord) -> bool {
        // no short-circuit: every triangle gets a chance to narrow the record
        self.triangles
            .iter()
            .fold(false, |hit, triangle| triangle.intersect(ray, t_min, record) || hit)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Object {
    Plane(Plane),
    Triangle(Triangle),
    Sphere(Sphere),
    Mesh(Mesh),
}

impl Object {
    pub fn kind(&self) -> &'static str {
        match self {
            Object::Plane(_) => "plane",
            Object::Triangle(_) => "triangle",
            Object::Sphere(_) => "sphere",
            Object::Mesh(_) => "mesh",
        }
    }
}

impl Hittable for Object {
    fn intersect(&self, ray: &Ray, t_min: f32, record: &mut HitRecord) -> bool {
        match self {
            Object::Plane(plane) => plane.intersect(ray, t_min, record),
            Object::Triangle(triangle) => triangle.intersect(ray, t_min, record),
            Object::Sphere(sphere) => sphere.intersect(ray, t_min, record),
            Object::Mesh(mesh) => mesh.intersect(ray, t_min, record),
        }
    }
}

impl From<Plane> for Object {
    fn from(value: Plane) -> Self {
        Object::Plane(value)
    }
}

impl From<Triangle> for Object {
    fn from(value: Triangle) -> Self {
        Object::Triangle(value)
    }
}

impl From<Sphere> for Object {
    fn from(value: Sphere) -> Self {
        Object::Sphere(value)
    }
}

impl From<Mesh> for Object {
    fn from(value: Mesh) -> Self {
        Object::Mesh(value)
    }
}
