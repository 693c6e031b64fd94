//! Error taxonomy of the projector.
//!
//! + [`GeometryError`]: bad geometry handed to `initialize`. The projector stays
//!   uninitialized.
//!
//! + [`ProjectorError`]: contract violations by the caller (bad indices,
//!   degenerate rays, undersized buffers, use before `initialize`). These are
//!   reported, never papered over.
//!
//! + [`ConfigError`]: problems reading or interpreting a configuration file.

use thiserror::Error;

use crate::index::Index1_u;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("projection geometry has no projections")]
    NoProjections,

    #[error("detector count must be positive")]
    NoDetectors,

    #[error("detector spacing must be positive and finite, got {0} mm")]
    DetectorSpacing(f32),

    #[error("{name} must be positive and finite, got {value} mm")]
    Distance { name: &'static str, value: f32 },

    #[error("projection angle #{index} is not finite")]
    Angle { index: Index1_u },

    #[error("view #{index} is degenerate: {reason}")]
    View { index: Index1_u, reason: &'static str },

    #[error("volume must have at least one pixel in each dimension, got {nx}x{ny}")]
    EmptyVolume { nx: usize, ny: usize },

    #[error("volume window is empty or not finite: ({min_x}, {min_y}) .. ({max_x}, {max_y})")]
    Window { min_x: f32, min_y: f32, max_x: f32, max_y: f32 },

    #[error("data of length {actual} does not fit a geometry of {expected} elements")]
    DataSize { expected: usize, actual: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectorError {
    #[error("projector used before successful initialization")]
    Uninitialized,

    #[error("projection index {index} out of range (0..{count})")]
    ProjectionOutOfRange { index: usize, count: usize },

    #[error("detector index {index} out of range (0..{count})")]
    DetectorOutOfRange { index: usize, count: usize },

    #[error("ray for projection {projection}, detector {detector} has coincident source and detector")]
    DegenerateRay { projection: usize, detector: usize },

    #[error("ray touches {required} pixels but the buffer only holds {capacity}")]
    BufferOverflow { required: usize, capacity: usize },

    #[error("weight recorded for matrix row {row}, but the matrix only has {n_rows} rows")]
    RowOutOfRange { row: usize, n_rows: usize },

    #[error("{what} has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch { what: &'static str, expected: [usize; 2], actual: [usize; 2] },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("couldn't read config file `{path}`: {source}")]
    Io { path: std::path::PathBuf, source: std::io::Error },

    #[error("couldn't parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid geometry in config: {0}")]
    Geometry(#[from] GeometryError),
}
