//! Light sources and the illumination they deliver to a surface point.

use nalgebra::{Point3, Vector3};

use crate::picture::Color;

#[derive(Clone, Debug, PartialEq)]
pub enum Light {
    /// Uniform light added to every surface, never shadowed.
    Ambient { color: Color },
    /// Parallel light travelling along `direction`.
    Directional { color: Color, direction: Vector3<f32> },
    /// Falls off with `1 / (attenuation * distance²)`; an attenuation of zero disables falloff.
    Point {
        color: Color,
        position: Point3<f32>,
        attenuation: f32,
    },
}

/// What a light contributes at one surface point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Illumination {
    /// Unit vector from the point towards the light.
    pub direction: Vector3<f32>,
    pub intensity: Color,
    pub distance: f32,
}

impl Light {
    pub fn is_ambient(&self) -> bool {
        matches!(self, Light::Ambient { .. })
    }

    pub fn color(&self) -> Color {
        match self {
            Light::Ambient { color } | Light::Directional { color, .. } | Light::Point { color, .. } => *color,
        }
    }

    /// Direction, intensity and distance of the light as seen from `point`.
    ///
    /// Ambient lights have no direction and return `None`.
    pub fn illumination(&self, point: &Point3<f32>) -> Option<Illumination> {
        match self {
            Light::Ambient { .. } => None,
            Light::Directional { color, direction } => Some(Illumination {
                direction: -direction.normalize(),
                intensity: *color,
                distance: f32::INFINITY,
            }),
            Light::Point {
                color,
                position,
                attenuation,
            } => {
                let to_light = position - point;
                let distance = to_light.norm();
                let falloff = if *attenuation > 0.0 {
                    1.0 / (attenuation * distance * distance)
                } else {
                    1.0
                };
                Some(Illumination {
                    direction: to_light / distance,
                    intensity: *color * falloff,
                    distance,
                })
            }
        }
    }
}
