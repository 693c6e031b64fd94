//! Rays from the X-ray source to the centre of a detector cell.

use geometry::{Dot, Point, Vector};
use units::todo::{Anglef32, Lengthf32};

use crate::projection::FanFlatVecGeometry;

/// Identifies one ray of the sinogram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ray {
    pub projection: usize,
    pub detector: usize,
}

impl Ray {
    pub fn new(projection: usize, detector: usize) -> Self { Self { projection, detector } }

    /// Position of this ray in a row-major sinogram with `n_detectors` columns
    pub fn index(&self, n_detectors: usize) -> usize { self.projection * n_detectors + self.detector }
}

/// End points of a ray, in volume coordinates (mm).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayEndpoints {
    pub source: Point,
    pub detector: Point,
}

impl RayEndpoints {
    pub fn new(source: Point, detector: Point) -> Self { Self { source, detector } }

    pub fn direction(&self) -> Vector { self.detector - self.source }

    pub fn length(&self) -> Lengthf32 { self.direction().norm() }

    /// Source and detector coincide: the ray has no direction.
    pub fn is_degenerate(&self) -> bool {
        let d = self.direction();
        d.x == 0.0 && d.y == 0.0
    }
}

impl FanFlatVecGeometry {
    /// End points of the ray through detector cell `detector` in view
    /// `projection`. Indices are not checked here: the projector validates them
    /// before asking.
    pub fn ray(&self, projection: usize, detector: usize) -> RayEndpoints {
        let view = &self.views[projection];
        RayEndpoints::new(view.source, view.detector_cell(detector, self.detector_count))
    }
}

/// Vectors shorter than this have no meaningful direction.
const MIN_NORM: f32 = 1e-12;

/// Unsigned angle between two directions, in `[0, π]`.
///
/// If either vector is (nearly) zero, the angle is taken to be zero.
pub fn angle_between(a: Vector, b: Vector) -> Anglef32 {
    if a.norm() < MIN_NORM || b.norm() < MIN_NORM { return 0.0 }
    // atan2 of |a×b| and a·b is symmetric in a and b and well conditioned near
    // 0 and π, unlike acos of the normalized dot product.
    a.cross(b).abs().atan2(a.dot(b))
}

/// Weight of each view in an angular integration: half the angular gap to the
/// previous view plus half the gap to the next one, measured between the
/// source directions as seen from the centre of rotation.
///
/// The first and last views have only one neighbour and get that whole gap.
/// A lone view gets zero.
pub fn angular_weights(views: &FanFlatVecGeometry) -> Vec<Anglef32> {
    let directions: Vec<Vector> = views.views.iter()
        .map(|v| v.source - Point::zero())
        .collect();
    let gaps: Vec<Anglef32> = directions.windows(2)
        .map(|pair| angle_between(pair[0], pair[1]))
        .collect();
    let n = directions.len();
    (0..n)
        .map(|i| {
            match (i.checked_sub(1).and_then(|j| gaps.get(j)), gaps.get(i)) {
                (Some(&before), Some(&after)) => (before + after) / 2.0,
                (Some(&gap), None) | (None, Some(&gap)) => gap,
                (None, None) => 0.0,
            }
        })
        .collect()
}
