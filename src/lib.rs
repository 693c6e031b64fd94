//! Fan-beam projector with a flat detector and a line kernel, for 2D
//! tomographic reconstruction.
//!
//! The system matrix element linking a ray to a pixel is the length of the ray
//! segment inside that pixel. [`FanFlatLineProjector`] computes these weights
//! on demand, ray by ray, and hands them to a [`Policy`] which decides what to
//! do with them.

mod exports;
pub use exports::*;

pub mod config;
pub mod error;
pub mod image;
pub mod index;
pub mod io;
pub mod policy;
pub mod projection;
pub mod projector;
pub mod ray;
pub mod sinogram;
pub mod system_matrix;
pub mod utils;
pub mod volume;
pub mod weights;
