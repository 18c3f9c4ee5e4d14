use crate::picture::Color;

/// Phong surface parameters read by the tracer at each hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub diffuse: Color,
    /// Also weights the mirror bounce.
    pub specular: Color,
    pub shininess: f32,
}

impl Material {
    pub fn new(diffuse: Color, specular: Color, shininess: f32) -> Self {
        Material {
            diffuse,
            specular,
            shininess,
        }
    }

    /// Purely diffuse surface, never spawns reflection rays that contribute.
    pub fn matte(diffuse: Color) -> Self {
        Material::new(diffuse, Color::BLACK, 1.0)
    }

    pub fn mirror(specular: Color, shininess: f32) -> Self {
        Material::new(Color::BLACK, specular, shininess)
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::matte(Color::gray(0.5))
    }
}
