//! What to do with the weights found along each ray.
//!
//! The projector's sweep functions know how to find every (pixel, weight) pair
//! of every ray; a [`Policy`] decides what those pairs are used for. The same
//! traversal thereby serves forward projection, back projection, system matrix
//! assembly and row/column sums.
//!
//! For every ray the sweep calls
//!
//! + [`Policy::prior`]: trace this ray, skip it, or stop the whole sweep,
//!
//! + [`Policy::add_weight`] for each pixel crossed by the ray, in traversal
//!   order,
//!
//! + [`Policy::posterior`] once the ray is done (not for skipped rays, nor for
//!   the ray which stopped the sweep).
//!
//! Policies which accumulate into shared storage are not synchronized: the
//! parallel helpers on the projector give each worker its own policy and its
//! own (or an exclusively owned part of the) output.

use units::todo::{Intensityf32, Weightf32};

use crate::error::ProjectorError;
use crate::image::Image;
use crate::index::Index1_u;
use crate::ray::Ray;
use crate::sinogram::Sinogram;

/// Decision taken before tracing a ray.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prior {
    /// Trace the ray and report its weights
    Trace,
    /// Go on to the next ray without tracing this one
    Skip,
    /// Abandon the sweep
    Stop,
}

pub trait Policy {
    fn prior(&mut self, _ray: Ray) -> Prior { Prior::Trace }
    fn add_weight(&mut self, ray: Ray, pixel: Index1_u, weight: Weightf32);
    fn posterior(&mut self, _ray: Ray) {}
}

impl<P: Policy + ?Sized> Policy for &mut P {
    fn prior(&mut self, ray: Ray) -> Prior { (**self).prior(ray) }
    fn add_weight(&mut self, ray: Ray, pixel: Index1_u, weight: Weightf32) { (**self).add_weight(ray, pixel, weight) }
    fn posterior(&mut self, ray: Ray) { (**self).posterior(ray) }
}

// ----- Projections ----------------------------------------------------------------

/// Sum product of the weights and the values of the pixels crossed by each
/// ray, added to the ray's sinogram bin.
pub struct ForwardProjection<'a> {
    pub image: &'a Image,
    pub sinogram: &'a mut Sinogram,
}

impl Policy for ForwardProjection<'_> {
    #[inline]
    fn add_weight(&mut self, ray: Ray, pixel: Index1_u, weight: Weightf32) {
        self.sinogram[ray] += weight * self.image[pixel];
    }
}

/// Distribute each ray's sinogram value over the pixels it crosses,
/// proportionally to the weights.
pub struct BackProjection<'a> {
    pub sinogram: &'a Sinogram,
    pub image: &'a mut Image,
}

impl Policy for BackProjection<'_> {
    // Nothing to distribute
    fn prior(&mut self, ray: Ray) -> Prior {
        if self.sinogram[ray] == 0.0 { Prior::Skip } else { Prior::Trace }
    }

    #[inline]
    fn add_weight(&mut self, ray: Ray, pixel: Index1_u, weight: Weightf32) {
        self.image[pixel] += weight * self.sinogram[ray];
    }
}

// ----- Sums of system matrix elements ------------------------------------------

/// Row sums of the system matrix: the total length of each ray inside the
/// window.
pub struct TotalRayLength<'a> {
    pub sinogram: &'a mut Sinogram,
}

impl Policy for TotalRayLength<'_> {
    #[inline]
    fn add_weight(&mut self, ray: Ray, _pixel: Index1_u, weight: Weightf32) {
        self.sinogram[ray] += weight;
    }
}

/// Column sums of the system matrix: the total ray length through each pixel.
pub struct TotalPixelWeight<'a> {
    pub image: &'a mut Image,
}

impl Policy for TotalPixelWeight<'_> {
    #[inline]
    fn add_weight(&mut self, _ray: Ray, pixel: Index1_u, weight: Weightf32) {
        self.image[pixel] += weight;
    }
}

// ----- Explicit system matrix ------------------------------------------------------

/// Records every weight it is given, to be assembled into a [`SparseMatrix`]
/// with one row per ray and one column per pixel.
#[derive(Debug, Default)]
pub struct SystemMatrixBuilder {
    n_detectors: usize,
    triplets: Vec<(usize, Index1_u, Weightf32)>,
}

impl SystemMatrixBuilder {
    pub fn new(n_detectors: usize) -> Self { Self { n_detectors, triplets: vec![] } }

    /// Assemble the recorded weights into a matrix of `n_rays` rows. Every
    /// recorded ray must fall within those rows.
    pub fn finish(mut self, n_rays: usize, n_pixels: usize) -> Result<SparseMatrix, ProjectorError> {
        if let Some(&(row, _, _)) = self.triplets.iter().find(|&&(row, _, _)| row >= n_rays) {
            return Err(ProjectorError::RowOutOfRange { row, n_rows: n_rays });
        }
        // Stable: within a row, keep traversal order
        self.triplets.sort_by_key(|&(row, _, _)| row);
        let mut row_ptr = vec![0; n_rays + 1];
        for &(row, _, _) in &self.triplets { row_ptr[row + 1] += 1; }
        for r in 0..n_rays { row_ptr[r + 1] += row_ptr[r]; }
        let (columns, values): (Vec<_>, Vec<_>) = self.triplets.into_iter()
            .map(|(_, column, value)| (column, value))
            .unzip();
        Ok(SparseMatrix { n_rows: n_rays, n_columns: n_pixels, row_ptr, columns, values })
    }
}

impl Policy for SystemMatrixBuilder {
    fn add_weight(&mut self, ray: Ray, pixel: Index1_u, weight: Weightf32) {
        self.triplets.push((ray.index(self.n_detectors), pixel, weight));
    }
}

/// System matrix in compressed sparse row form.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseMatrix {
    pub n_rows: usize,
    pub n_columns: usize,
    pub row_ptr: Vec<usize>,
    pub columns: Vec<Index1_u>,
    pub values: Vec<Weightf32>,
}

impl SparseMatrix {

    pub fn n_non_zero(&self) -> usize { self.values.len() }

    pub fn row(&self, r: usize) -> impl Iterator<Item = (Index1_u, Weightf32)> + '_ {
        let range = self.row_ptr[r]..self.row_ptr[r + 1];
        self.columns[range.clone()].iter().copied().zip(self.values[range].iter().copied())
    }

    /// `A x`: forward projection of `x`
    pub fn mul_vec(&self, x: &[Intensityf32]) -> Vec<Intensityf32> {
        (0..self.n_rows)
            .map(|r| self.row(r).map(|(c, w)| w * x[c]).sum())
            .collect()
    }

    /// `Aᵀ y`: back projection of `y`
    pub fn transpose_mul_vec(&self, y: &[Intensityf32]) -> Vec<Intensityf32> {
        let mut result = vec![0.0; self.n_columns];
        for (r, &y_r) in y.iter().enumerate().take(self.n_rows) {
            for (c, w) in self.row(r) { result[c] += w * y_r; }
        }
        result
    }
}

// ----- Adapters ---------------------------------------------------------------------

/// Restrict another policy to the rays whose mask value is non-zero.
pub struct SinogramMask<'a, P> {
    pub mask: &'a Sinogram,
    pub policy: P,
}

impl<P: Policy> Policy for SinogramMask<'_, P> {
    fn prior(&mut self, ray: Ray) -> Prior {
        if self.mask[ray] == 0.0 { Prior::Skip } else { self.policy.prior(ray) }
    }
    fn add_weight(&mut self, ray: Ray, pixel: Index1_u, weight: Weightf32) {
        self.policy.add_weight(ray, pixel, weight)
    }
    fn posterior(&mut self, ray: Ray) { self.policy.posterior(ray) }
}
