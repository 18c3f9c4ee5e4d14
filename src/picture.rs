use std::ops::{Add, AddAssign, Mul};
use std::path::Path;

use image::{Rgb, RgbImage};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Linear RGB, not clamped: shading may push channels above one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "[f32; 3]")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(value: f32) -> Self {
        Self::new(value, value, value)
    }

    pub fn from_rgb8(pixel: &Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        Color::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }
}

impl From<[f32; 3]> for Color {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Color::new(r, g, b)
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Self) -> Self::Output {
        Color::new(
            self.r + rhs.r,
            self.g + rhs.g,
            self.b + rhs.b,
        )
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul<f32> for Color {
    type Output = Color;

    fn mul(self, rhs: f32) -> Self::Output {
        Color::new(
            self.r * rhs,
            self.g * rhs,
            self.b * rhs,
        )
    }
}

impl Mul<Color> for f32 {
    type Output = Color;

    fn mul(self, rhs: Color) -> Self::Output {
        rhs * self
    }
}

/// Component-wise product, used to filter light by a surface color.
impl Mul for Color {
    type Output = Color;

    fn mul(self, rhs: Color) -> Self::Output {
        Color::new(
            self.r * rhs.r,
            self.g * rhs.g,
            self.b * rhs.b,
        )
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct RGB8 {
    r: u8,
    g: u8,
    b: u8,
}

impl From<Color> for RGB8 {
    fn from(value: Color) -> Self {
        RGB8::new_norm(value.r, value.g, value.b)
    }
}

impl From<RGB8> for Rgb<u8> {
    fn from(value: RGB8) -> Self {
        Rgb([value.r, value.g, value.b])
    }
}

fn normalize(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

impl RGB8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        RGB8 { r, g, b }
    }

    pub fn new_norm(r: f32, g: f32, b: f32) -> Self {
        RGB8::new(normalize(r), normalize(g), normalize(b))
    }
}

/// Floating point render target. Row `y = 0` is the bottom of the picture.
#[derive(Clone, Debug, PartialEq)]
pub struct Picture {
    pixels: Vec<Color>,
    size: (u32, u32),
}

impl Picture {
    pub fn new(width: u32, height: u32) -> Self {
        Picture {
            pixels: vec![Color::BLACK; width as usize * height as usize],
            size: (width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.size.0
    }

    pub fn height(&self) -> u32 {
        self.size.1
    }

    fn to_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width() as usize + x as usize
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.pixels[self.to_index(x, y)]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        let index = self.to_index(x, y);
        self.pixels[index] = color;
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Mutable rows, bottom row first.
    pub fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, Color> {
        let width = self.width().max(1) as usize;
        self.pixels.chunks_exact_mut(width)
    }

    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Clamps to `[0, 1]` and flips so the top row comes first.
    pub fn to_rgb8(&self) -> RgbImage {
        let (width, height) = self.size;
        RgbImage::from_fn(width, height, |x, y| {
            RGB8::from(self.pixel(x, height - 1 - y)).into()
        })
    }

    /// Encodes the picture, the format is picked from the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.to_rgb8().save(path).map_err(|source| Error::Image {
            path: path.to_path_buf(),
            source,
        })
    }
}
