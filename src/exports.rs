pub use units::todo::{Anglef32, Intensityf32, Lengthf32, Ratiof32, Weightf32};

pub use geometry::{Point, Vector};

pub use crate::error::{ConfigError, GeometryError, ProjectorError};
pub use crate::image::{Image, ImageData};
pub use crate::index::{BoxDim_u, Index1_u, Index2_u};
pub use crate::policy::{Policy, Prior};
pub use crate::projection::{FanFlatGeometry, FanFlatVecGeometry, FanView, ProjectionGeometry};
pub use crate::projector::{FanFlatLineProjector, Projector, Sweep};
pub use crate::ray::{Ray, RayEndpoints, angle_between};
pub use crate::sinogram::Sinogram;
pub use crate::system_matrix::{LineKernel, PixelWeight};
pub use crate::volume::VolumeGeometry;
pub use crate::weights::WeightBuffer;
