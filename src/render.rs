//! Whitted-style recursive ray tracing.

use std::path::Path;
use std::time::Instant;

use log::{info, trace};
use nalgebra::{point, Point3, Vector3};
use rayon::prelude::*;

use crate::camera::{Camera, Viewport};
use crate::environment::Background;
use crate::error::Result;
use crate::material::Material;
use crate::picture::{Color, Picture};
use crate::ray::{HitRecord, Ray};
use crate::scene::Scene;

/// Lower bound on accepted hit parameters, rejects hits at the ray origin.
pub const T_MIN: f32 = 1e-4;

/// How far secondary rays start off the surface they leave.
pub const SURFACE_OFFSET: f32 = 1e-4;

const LINES_PER_WORK: usize = 16;

#[derive(Clone, Debug)]
pub struct Tracer {
    pub width: u32,
    pub height: u32,
    pub max_bounces: u32,
    pub shadows: bool,
    pub background: Background,
}

/// Shading inputs at the closest hit of a ray.
struct SurfaceHit<'a> {
    point: Point3<f32>,
    normal: Vector3<f32>,
    material: &'a Material,
}

impl Tracer {
    pub fn new(width: u32, height: u32, max_bounces: u32, shadows: bool, background: Background) -> Self {
        Tracer {
            width,
            height,
            max_bounces,
            shadows,
            background,
        }
    }

    /// Renders the scene, and writes the image to `output` when one is given.
    pub fn render(&self, scene: &Scene, camera: &Camera, output: Option<&Path>) -> Result<Picture> {
        info!(
            target: "app",
            "Rendering {}x{} ({} primitives, {} lights, {} bounces, shadows {})",
            self.width,
            self.height,
            scene.primitives.len(),
            scene.lights.len(),
            self.max_bounces,
            if self.shadows { "on" } else { "off" },
        );
        let start = Instant::now();
        let picture = self.render_picture(scene, &camera.viewport(self.width, self.height));
        info!(target: "app", "Finished rendering. Took {:?}", start.elapsed());

        if let Some(path) = output {
            picture.save(path)?;
            info!(target: "app", "Saved image to {}", path.display());
        }
        Ok(picture)
    }

    /// Fills a picture, rows are split into chunks that render in parallel.
    pub fn render_picture(&self, scene: &Scene, viewport: &Viewport) -> Picture {
        let mut picture = Picture::new(self.width, self.height);
        let width = self.width as usize;
        if width == 0 {
            return picture;
        }

        picture
            .rows_mut()
            .enumerate()
            .collect::<Vec<_>>()
            .par_chunks_mut(LINES_PER_WORK)
            .for_each(|rows| {
                if let Some((first, _)) = rows.first() {
                    trace!(target: "app", "Rendering rows {}..{}", first, first + rows.len());
                }
                for (y, row) in rows.iter_mut() {
                    for (x, pixel) in row.iter_mut().enumerate() {
                        *pixel = self.render_pixel(x as u32, *y as u32, scene, viewport);
                    }
                }
            });
        picture
    }

    pub fn render_pixel(&self, x: u32, y: u32, scene: &Scene, viewport: &Viewport) -> Color {
        let ray = self.pixel_ray(x, y, viewport);
        let mut record = HitRecord::new();
        self.trace_ray(scene, &ray, self.max_bounces, &mut record)
    }

    /// Primary ray for pixel `(x, y)`, counted from the bottom-left corner.
    pub fn pixel_ray(&self, x: u32, y: u32, viewport: &Viewport) -> Ray {
        // corner aligned, not pixel centred
        let ndc = point![
            2.0 * (x as f32 / self.width as f32) - 1.0,
            2.0 * (y as f32 / self.height as f32) - 1.0
        ];
        viewport.generate_ray(&ndc)
    }

    /// Color seen along `ray`, following up to `bounces` mirror reflections.
    ///
    /// `record` collects the closest hit; it should be fresh for each ray.
    /// The result is not clamped.
    pub fn trace_ray(&self, scene: &Scene, ray: &Ray, bounces: u32, record: &mut HitRecord) -> Color {
        let Some(surface) = self.closest_hit(scene, ray, record) else {
            return self.background_color(&ray.direction);
        };
        let normal = surface.normal;
        let material = surface.material;

        let eye = -ray.direction.normalize();
        let reflected = (-eye + 2.0 * eye.dot(&normal) * normal).normalize();

        let mut color = Color::BLACK;
        for light in &scene.lights {
            let Some(illumination) = light.illumination(&surface.point) else {
                color += light.color() * material.diffuse;
                continue;
            };

            let to_light = illumination.direction;
            if to_light.dot(&normal) < 0.0 {
                continue;
            }

            if self.shadows {
                let shadow_ray = Ray::new(offset_origin(&surface.point, &normal, &to_light), to_light);
                if is_occluded(scene, &shadow_ray, illumination.distance) {
                    continue;
                }
            }

            let diffuse = normal.dot(&to_light).max(0.0);
            color += diffuse * illumination.intensity * material.diffuse;

            let specular = reflected.dot(&to_light).max(0.0).powf(material.shininess);
            color += specular * illumination.intensity * material.specular;
        }

        if bounces > 0 {
            let reflect_ray = Ray::new(offset_origin(&surface.point, &normal, &reflected), reflected);
            let mut reflections = HitRecord::new();
            color += material.specular * self.trace_ray(scene, &reflect_ray, bounces - 1, &mut reflections);
        }
        color
    }

    pub fn background_color(&self, direction: &Vector3<f32>) -> Color {
        self.background.color(direction)
    }

    /// Linear scan for the nearest primitive, with its world-space normal.
    fn closest_hit<'a>(&self, scene: &'a Scene, ray: &Ray, record: &mut HitRecord) -> Option<SurfaceHit<'a>> {
        let mut closest = None;
        for primitive in &scene.primitives {
            if primitive.intersect(ray, T_MIN, record) {
                closest = Some(primitive);
            }
        }

        closest.map(|primitive| {
            // the record still holds the normal in the winner's local frame
            record.normal = primitive.transform.to_world_normal(&record.normal);
            SurfaceHit {
                point: ray.at(record.time),
                normal: record.normal,
                material: &primitive.material,
            }
        })
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Tracer::new(640, 480, 3, true, Background::default())
    }
}

/// Whether anything blocks `ray` before it travels `distance`.
///
/// `ray.direction` must be normalised for the distance to be meaningful.
fn is_occluded(scene: &Scene, ray: &Ray, distance: f32) -> bool {
    scene.primitives.iter().any(|primitive| {
        let mut record = HitRecord::within(distance);
        primitive.intersect(ray, T_MIN, &mut record)
    })
}

/// Nudges a secondary ray's origin off the surface, onto the side it leaves towards.
fn offset_origin(point: &Point3<f32>, normal: &Vector3<f32>, direction: &Vector3<f32>) -> Point3<f32> {
    if direction.dot(normal) >= 0.0 {
        point + normal * SURFACE_OFFSET
    } else {
        point - normal * SURFACE_OFFSET
    }
}
