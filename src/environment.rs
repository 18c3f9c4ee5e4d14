//! What a ray sees when it leaves the scene.

use std::path::Path;

use float_ord::FloatOrd;
use image::RgbImage;
use nalgebra::Vector3;

use crate::error::{Error, Result};
use crate::picture::Color;

/// Face order follows the OpenGL convention: +X, -X, +Y, -Y, +Z, -Z.
pub const FACE_NAMES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];

/// Six square-ish images surrounding the scene, indexed by direction.
#[derive(Clone, Debug)]
pub struct CubeMap {
    faces: [RgbImage; 6],
}

impl CubeMap {
    pub fn new(faces: [RgbImage; 6]) -> Result<Self> {
        if let Some(index) = faces.iter().position(|face| face.width() == 0 || face.height() == 0) {
            return Err(Error::EmptyCubeMapFace {
                face: FACE_NAMES[index],
            });
        }
        Ok(CubeMap { faces })
    }

    /// Loads the faces in [`FACE_NAMES`] order.
    pub fn open<P: AsRef<Path>>(paths: [P; 6]) -> Result<Self> {
        let mut faces: [RgbImage; 6] = std::array::from_fn(|_| RgbImage::new(0, 0));
        for (face, path) in faces.iter_mut().zip(&paths) {
            let path = path.as_ref();
            *face = image::open(path)
                .map_err(|source| Error::Image {
                    path: path.to_path_buf(),
                    source,
                })?
                .to_rgb8();
        }
        Self::new(faces)
    }

    /// Nearest texel in `direction`, which need not be normalised.
    pub fn texel(&self, direction: &Vector3<f32>) -> Color {
        let axis = (0..3)
            .max_by_key(|&i| FloatOrd(direction[i].abs()))
            .unwrap_or(2);
        let major = direction[axis];
        let (x, y, z) = (direction.x, direction.y, direction.z);

        let (face, sc, tc) = match (axis, major >= 0.0) {
            (0, true) => (0, -z, -y),
            (0, false) => (1, z, -y),
            (1, true) => (2, x, z),
            (1, false) => (3, x, -z),
            (_, true) => (4, x, -y),
            (_, false) => (5, -x, -y),
        };

        let major = major.abs();
        if major == 0.0 {
            return Color::BLACK;
        }
        let u = 0.5 * (sc / major + 1.0);
        let v = 0.5 * (tc / major + 1.0);

        let image = &self.faces[face];
        let px = ((u * image.width() as f32) as u32).min(image.width() - 1);
        let py = ((v * image.height() as f32) as u32).min(image.height() - 1);
        Color::from_rgb8(image.get_pixel(px, py))
    }
}

#[derive(Clone, Debug)]
pub enum Background {
    Flat(Color),
    CubeMap(CubeMap),
}

impl Background {
    pub fn color(&self, direction: &Vector3<f32>) -> Color {
        match self {
            Background::Flat(color) => *color,
            Background::CubeMap(cube_map) => cube_map.texel(direction),
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Flat(Color::BLACK)
    }
}

#[cfg(test)]
mod tests {
    use image::Rgb;
    use nalgebra::vector;

    use super::*;

    fn solid_faces() -> [RgbImage; 6] {
        std::array::from_fn(|i| RgbImage::from_pixel(2, 2, Rgb([i as u8 * 40, 0, 0])))
    }

    fn face_of(cube_map: &CubeMap, direction: Vector3<f32>) -> u8 {
        (cube_map.texel(&direction).r * 255.0).round() as u8 / 40
    }

    #[test]
    fn picks_face_by_major_axis() {
        let cube_map = CubeMap::new(solid_faces()).unwrap();
        assert_eq!(face_of(&cube_map, vector![1.0, 0.2, -0.3]), 0);
        assert_eq!(face_of(&cube_map, vector![-3.0, 0.2, 1.0]), 1);
        assert_eq!(face_of(&cube_map, vector![0.1, 0.9, 0.0]), 2);
        assert_eq!(face_of(&cube_map, vector![0.1, -0.9, 0.0]), 3);
        assert_eq!(face_of(&cube_map, vector![0.0, 0.0, 2.0]), 4);
        assert_eq!(face_of(&cube_map, vector![0.5, 0.0, -2.0]), 5);
    }

    #[test]
    fn face_coordinates_follow_opengl() {
        let mut faces = solid_faces();
        // +Z face: top-left texel is (-x, +y)
        faces[4].put_pixel(0, 0, Rgb([0, 255, 0]));
        let cube_map = CubeMap::new(faces).unwrap();
        assert_eq!(cube_map.texel(&vector![-0.9, 0.9, 1.0]).g, 1.0);
        assert_eq!(cube_map.texel(&vector![0.9, 0.9, 1.0]).g, 0.0);
    }

    #[test]
    fn empty_face_is_rejected() {
        let mut faces = solid_faces();
        faces[3] = RgbImage::new(0, 0);
        assert!(matches!(
            CubeMap::new(faces),
            Err(Error::EmptyCubeMapFace { face: "bottom" })
        ));
    }

    #[test]
    fn flat_background_ignores_direction() {
        let background = Background::Flat(Color::new(0.1, 0.2, 0.3));
        assert_eq!(background.color(&vector![0.0, 1.0, 0.0]), Color::new(0.1, 0.2, 0.3));
        assert_eq!(background.color(&vector![-5.0, 0.0, 0.1]), Color::new(0.1, 0.2, 0.3));
    }
}
