//! Projection measurements, indexed by (projection, detector).

use ndarray::{Array2, ArrayView1};

use crate::error::GeometryError;
use crate::ray::Ray;
use units::todo::Intensityf32;

#[derive(Clone, Debug, PartialEq)]
pub struct Sinogram {
    pub data: Array2<Intensityf32>,
}

impl Sinogram {

    pub fn zeros(n_projections: usize, n_detectors: usize) -> Self {
        Self { data: Array2::zeros((n_projections, n_detectors)) }
    }

    /// Row-major data: all detectors of projection 0 first.
    pub fn from_vec(n_projections: usize, n_detectors: usize, data: Vec<Intensityf32>) -> Result<Self, GeometryError> {
        let actual = data.len();
        Array2::from_shape_vec((n_projections, n_detectors), data)
            .map(|data| Self { data })
            .map_err(|_| GeometryError::DataSize { expected: n_projections * n_detectors, actual })
    }

    pub fn n_projections(&self) -> usize { self.data.nrows() }
    pub fn n_detectors  (&self) -> usize { self.data.ncols() }

    pub fn shape(&self) -> [usize; 2] { [self.n_projections(), self.n_detectors()] }

    pub fn projection(&self, p: usize) -> ArrayView1<Intensityf32> { self.data.row(p) }

    /// Values in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &Intensityf32> { self.data.iter() }
}

impl core::ops::Index<Ray> for Sinogram {
    type Output = Intensityf32;
    #[inline]
    fn index(&self, ray: Ray) -> &Self::Output { &self.data[[ray.projection, ray.detector]] }
}

impl core::ops::IndexMut<Ray> for Sinogram {
    #[inline]
    fn index_mut(&mut self, ray: Ray) -> &mut Self::Output { &mut self.data[[ray.projection, ray.detector]] }
}
