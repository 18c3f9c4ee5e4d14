//! Whitted-style recursive ray tracer.
//!
//! Casts one ray per pixel, shades the closest hit with Phong lighting and
//! hard shadows, and follows mirror reflections up to a bounce budget.

pub mod camera;
pub mod cli;
pub mod description;
pub mod environment;
pub mod error;
pub mod light;
pub mod material;
pub mod object;
pub mod picture;
pub mod ray;
pub mod render;
pub mod scene;
pub mod transform;

pub use error::{Error, Result};
