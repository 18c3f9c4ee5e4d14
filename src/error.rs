//! Error types for scene loading and image output.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building a scene or writing an image.
///
/// The tracer itself never fails: degenerate geometry is reported as a miss.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scene file {path}")]
    SceneParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("image error on {path}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A node's transform cannot be inverted, so rays can't be mapped into its frame.
    #[error("transform of node '{node}' is not invertible")]
    SingularTransform { node: String },

    #[error("node '{node}' has an object but no material")]
    MissingMaterial { node: String },

    #[error("node '{node}' refers to unknown material '{name}'")]
    UnknownMaterial { node: String, name: String },

    #[error("mesh on node '{node}' is invalid: {reason}")]
    InvalidMesh { node: String, reason: String },

    #[error("cube map face '{face}' is empty")]
    EmptyCubeMapFace { face: &'static str },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for scene and image operations.
pub type Result<T> = std::result::Result<T, Error>;
