//! Find the weights and indices of the pixels crossed by a single ray.
//!
//! The line kernel treats the ray as an infinitely thin line: the weight of a
//! pixel is the length of the ray inside it. The traversal is organised around
//! two simplifications:
//!
//! 1. Step along the *dominant axis*, the one along which the ray's direction
//!    has the larger component. Every band of pixels perpendicular to that axis
//!    is crossed by exactly one pixel's worth of ray, so one pixel is emitted per
//!    band: no gaps, no repeats, and the emission order follows the dominant
//!    coordinate upwards, whichever way the ray points.
//!
//! 2. Work in terms of the dominant coordinate only. The ray is clipped once to
//!    the interval of dominant coordinates in which it lies inside the window,
//!    after which each band's weight is the clipped width of the band times the
//!    length of ray per unit of dominant coordinate, `sqrt(1 + slope²)`. Full
//!    bands therefore get `pixel_size / cos θ`; only the bands where the ray
//!    enters or leaves get less, so the weights add up to the ray's chord
//!    through the window.
//!
//! The minor pixel index of a band is taken at the middle of the ray's piece in
//! that band. A coordinate lying exactly on a pixel boundary belongs to the
//! pixel above it (the one with the larger index). A ray running exactly along
//! the window's upper edge is outside; along its lower edge, inside.

use geometry::Point;
use units::todo::{Lengthf32, Weightf32};

use crate::index::Index1_u;
use crate::ray::RayEndpoints;
use crate::volume::VolumeGeometry;

/// One non-zero element of the system matrix row of a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelWeight {
    pub index: Index1_u,
    pub weight: Weightf32,
}

impl PixelWeight {
    pub fn new(index: Index1_u, weight: Weightf32) -> Self { Self { index, weight } }
}

/// Lazy sequence of the pixels crossed by a ray and the ray's length inside
/// each of them.
///
/// Independent of any other `LineKernel`: tracing the same ray again (or
/// cloning this one) starts from scratch.
#[derive(Clone, Debug)]
pub struct LineKernel {
    /// Dominant axis (0 = x, 1 = y)
    dominant: usize,
    /// Number of pixels along x; needed to flatten indices
    nx: usize,
    /// Number of pixels along the minor axis
    n_minor: usize,
    lo_dominant: Lengthf32,
    size_dominant: Lengthf32,
    lo_minor: Lengthf32,
    size_minor: Lengthf32,
    /// The line: minor = start_minor + slope * (dominant - start_dominant)
    start_dominant: Lengthf32,
    start_minor: Lengthf32,
    slope: f32,
    /// Length of ray per unit of dominant coordinate
    stretch: f32,
    /// Range of dominant coordinates in which the ray is inside the window
    from: Lengthf32,
    to: Lengthf32,
    /// Next band to visit, and one past the last band that can be hit
    band: usize,
    end: usize,
}

/// Trace `ray` through the pixels of `volume`.
///
/// `None` if the ray is degenerate (source and detector coincide) or if
/// `volume` fails its own `check`. A ray which misses the window produces an
/// empty sequence.
pub fn trace(ray: &RayEndpoints, volume: &VolumeGeometry) -> Option<LineKernel> {
    LineKernel::new(ray, volume)
}

impl LineKernel {

    pub fn new(ray: &RayEndpoints, volume: &VolumeGeometry) -> Option<Self> {
        if ray.is_degenerate() || volume.check().is_err() { return None }

        let direction = ray.direction();
        let d = direction.dominant_axis();
        let m = 1 - d;
        let RayEndpoints { source: s, detector: e } = *ray;

        let slope = direction[m] / direction[d];
        let stretch = (1.0 + slope * slope).sqrt();

        let (lo_dominant, hi_dominant) = (volume.min[d], volume.max[d]);
        let (lo_minor   , hi_minor   ) = (volume.min[m], volume.max[m]);

        // Extent of the segment along the dominant axis
        let (segment_lo, segment_hi) = if s[d] <= e[d] { (s[d], e[d]) } else { (e[d], s[d]) };

        // Dominant coordinates at which the line is within the window's minor
        // extent
        let (inside_lo, inside_hi) = if slope == 0.0 {
            if lo_minor <= s[m] && s[m] < hi_minor { (f32::NEG_INFINITY, f32::INFINITY) }
            else                                   { (f32::INFINITY, f32::NEG_INFINITY) }
        } else {
            let a = s[d] + (lo_minor - s[m]) / slope;
            let b = s[d] + (hi_minor - s[m]) / slope;
            (a.min(b), a.max(b))
        };

        let from = segment_lo.max(lo_dominant).max(inside_lo);
        let to   = segment_hi.min(hi_dominant).min(inside_hi);

        let size_dominant = volume.pixel_size[d];
        let n_dominant = volume.n[d];
        let (band, end) = if from < to {
            // Float to int casts saturate: anything below zero becomes zero
            let first = ((from - lo_dominant) / size_dominant).floor() as usize;
            let last  = ((to   - lo_dominant) / size_dominant).ceil () as usize;
            (first.min(n_dominant), last.min(n_dominant))
        } else {
            (0, 0)
        };

        Some(Self {
            dominant: d,
            nx: volume.n[0],
            n_minor: volume.n[m],
            lo_dominant, size_dominant,
            lo_minor, size_minor: volume.pixel_size[m],
            start_dominant: s[d],
            start_minor: s[m],
            slope, stretch,
            from, to,
            band, end,
        })
    }

    /// Index of the axis along which this ray is traversed (0 = x, 1 = y)
    pub fn dominant_axis(&self) -> usize { self.dominant }

    /// Where the line is at the given dominant coordinate
    fn point_at(&self, dominant: Lengthf32) -> Point {
        let minor = self.start_minor + self.slope * (dominant - self.start_dominant);
        if self.dominant == 0 { Point::new(dominant, minor) }
        else                  { Point::new(minor, dominant) }
    }

    fn minor_index(&self, minor: Lengthf32) -> usize {
        let j = ((minor - self.lo_minor) / self.size_minor).floor() as usize;
        j.min(self.n_minor - 1)
    }
}

impl Iterator for LineKernel {
    type Item = PixelWeight;

    fn next(&mut self) -> Option<Self::Item> {
        while self.band < self.end {
            let k = self.band;
            self.band += 1;

            // Part of this band which the ray crosses inside the window
            let band_lo = self.lo_dominant +  k      as f32 * self.size_dominant;
            let band_hi = self.lo_dominant + (k + 1) as f32 * self.size_dominant;
            let lo = band_lo.max(self.from);
            let hi = band_hi.min(self.to);
            if hi <= lo { continue }

            let middle = self.point_at(0.5 * (lo + hi));
            let minor = if self.dominant == 0 { middle.y } else { middle.x };
            let j = self.minor_index(minor);
            let (ix, iy) = if self.dominant == 0 { (k, j) } else { (j, k) };

            return Some(PixelWeight::new(ix + iy * self.nx, (hi - lo) * self.stretch));
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.end - self.band))
    }
}
