//! Fan-beam projection geometries with a flat detector.
//!
//! Two flavours are supported:
//!
//! + [`FanFlatGeometry`]: a circular trajectory described by a list of angles
//!   and the source/detector distances from the centre of rotation.
//!
//! + [`FanFlatVecGeometry`]: an explicit source position, detector centre and
//!   detector pixel step for every view.
//!
//! The projector only ever consumes the vector form: the circular form is
//! converted with [`FanFlatGeometry::view`].

use geometry::{Point, Vector};
use units::{Angle, Length, mm_, radian_, todo::{Anglef32, Lengthf32}};

use crate::error::GeometryError;

/// Circular fan-beam trajectory with a flat detector.
#[derive(Clone, Debug, PartialEq)]
pub struct FanFlatGeometry {
    /// Projection angles in radians
    pub angles: Vec<Anglef32>,
    pub detector_count: usize,
    pub detector_spacing: Lengthf32,
    /// Distance from the source to the centre of rotation
    pub source_origin: Lengthf32,
    /// Distance from the centre of rotation to the detector
    pub origin_detector: Lengthf32,
}

impl FanFlatGeometry {

    pub fn new(
        angles: impl IntoIterator<Item = Angle>,
        detector_count: usize,
        detector_spacing: Length,
        source_origin: Length,
        origin_detector: Length,
    ) -> Self {
        Self {
            angles: angles.into_iter().map(radian_).collect(),
            detector_count,
            detector_spacing: mm_(detector_spacing),
            source_origin   : mm_(source_origin),
            origin_detector : mm_(origin_detector),
        }
    }

    /// `count` angles spread uniformly over `arc`, starting at zero and
    /// excluding the end of the arc.
    pub fn evenly_spaced(
        count: usize,
        arc: Angle,
        detector_count: usize,
        detector_spacing: Length,
        source_origin: Length,
        origin_detector: Length,
    ) -> Self {
        let step = arc / count as f32;
        let angles = (0..count).map(|i| step * i as f32);
        Self::new(angles, detector_count, detector_spacing, source_origin, origin_detector)
    }

    pub fn check(&self) -> Result<(), GeometryError> {
        use GeometryError as E;
        if self.angles.is_empty() { return Err(E::NoProjections) }
        if self.detector_count == 0 { return Err(E::NoDetectors) }
        if !(self.detector_spacing > 0.0 && self.detector_spacing.is_finite()) {
            return Err(E::DetectorSpacing(self.detector_spacing))
        }
        for (name, value) in [("source-origin distance"  , self.source_origin),
                              ("origin-detector distance", self.origin_detector)] {
            if !(value > 0.0 && value.is_finite()) { return Err(E::Distance { name, value }) }
        }
        if let Some(index) = self.angles.iter().position(|a| !a.is_finite()) {
            return Err(E::Angle { index })
        }
        Ok(())
    }

    /// Source, detector centre and detector step of the view at angle θ.
    ///
    /// At θ = 0 the source sits on the negative y-axis, the detector on the
    /// positive y-axis, and detector indices increase along +x. Increasing θ
    /// rotates the whole set-up anticlockwise.
    pub fn view(&self, projection: usize) -> FanView {
        let (sin, cos) = self.angles[projection].sin_cos();
        FanView {
            source         : Point ::new( sin * self.source_origin  , -cos * self.source_origin  ),
            detector_centre: Point ::new(-sin * self.origin_detector,  cos * self.origin_detector),
            detector_step  : Vector::new( cos * self.detector_spacing,  sin * self.detector_spacing),
        }
    }

    pub fn to_vec(&self) -> FanFlatVecGeometry {
        FanFlatVecGeometry {
            detector_count: self.detector_count,
            views: (0..self.angles.len()).map(|p| self.view(p)).collect(),
        }
    }
}

/// Placement of source and detector for a single projection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FanView {
    pub source: Point,
    /// Centre of the detector row (not of any particular detector cell)
    pub detector_centre: Point,
    /// Displacement from one detector cell to the next
    pub detector_step: Vector,
}

impl FanView {
    /// Centre of detector cell `detector` on a row of `detector_count` cells.
    ///
    /// Cell `i` spans `(i - N/2) .. (i - N/2 + 1)` detector steps from the
    /// row's centre.
    pub fn detector_cell(&self, detector: usize, detector_count: usize) -> Point {
        let offset = detector as f32 - detector_count as f32 / 2.0 + 0.5;
        self.detector_centre.along(self.detector_step, offset)
    }
}

/// Fan-beam geometry with an explicit placement for every view.
#[derive(Clone, Debug, PartialEq)]
pub struct FanFlatVecGeometry {
    pub detector_count: usize,
    pub views: Vec<FanView>,
}

impl FanFlatVecGeometry {
    pub fn check(&self) -> Result<(), GeometryError> {
        use GeometryError as E;
        if self.views.is_empty() { return Err(E::NoProjections) }
        if self.detector_count == 0 { return Err(E::NoDetectors) }
        for (index, view) in self.views.iter().enumerate() {
            let FanView { source, detector_centre, detector_step } = *view;
            if !(source.is_finite() && detector_centre.is_finite() && detector_step.is_finite()) {
                return Err(E::View { index, reason: "non-finite coordinates" })
            }
            if detector_step.norm() == 0.0 {
                return Err(E::View { index, reason: "zero detector step" })
            }
            if (detector_centre - source).norm() == 0.0 {
                return Err(E::View { index, reason: "source on detector" })
            }
            // Rays from the source to any of these would have no direction
            if (0..self.detector_count).any(|i| view.detector_cell(i, self.detector_count) == source) {
                return Err(E::View { index, reason: "source on a detector cell" })
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProjectionGeometry {
    FanFlat(FanFlatGeometry),
    FanFlatVec(FanFlatVecGeometry),
}

impl ProjectionGeometry {
    pub fn n_projections(&self) -> usize {
        match self {
            Self::FanFlat   (g) => g.angles.len(),
            Self::FanFlatVec(g) => g.views .len(),
        }
    }

    pub fn n_detectors(&self) -> usize {
        match self {
            Self::FanFlat   (g) => g.detector_count,
            Self::FanFlatVec(g) => g.detector_count,
        }
    }

    pub fn check(&self) -> Result<(), GeometryError> {
        match self {
            Self::FanFlat   (g) => g.check(),
            Self::FanFlatVec(g) => g.check(),
        }
    }

    pub fn to_vec(&self) -> FanFlatVecGeometry {
        match self {
            Self::FanFlat   (g) => g.to_vec(),
            Self::FanFlatVec(g) => g.clone(),
        }
    }
}

impl From<FanFlatGeometry> for ProjectionGeometry {
    fn from(g: FanFlatGeometry) -> Self { Self::FanFlat(g) }
}

impl From<FanFlatVecGeometry> for ProjectionGeometry {
    fn from(g: FanFlatVecGeometry) -> Self { Self::FanFlatVec(g) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use rstest::rstest;
    use units::{mm, radian, turn};

    fn fan(angles: &[f32], detectors: usize) -> FanFlatGeometry {
        FanFlatGeometry::new(angles.iter().copied().map(radian), detectors, mm(2.0), mm(100.0), mm(50.0))
    }

    #[test]
    fn view_at_zero_degrees() {
        let view = fan(&[0.0], 4).view(0);
        assert_eq!(view.source,          Point ::new(0.0, -100.0));
        assert_eq!(view.detector_centre, Point ::new(0.0,   50.0));
        assert_eq!(view.detector_step,   Vector::new(2.0,    0.0));
    }

    #[test]
    fn view_at_quarter_turn() {
        let view = fan(&[std::f32::consts::FRAC_PI_2], 4).view(0);
        let FanView { source: s, detector_centre: d, detector_step: u } = view;
        assert_float_eq!([s.x, s.y], [100.0,   0.0], abs <= [1e-4, 1e-4]);
        assert_float_eq!([d.x, d.y], [-50.0,   0.0], abs <= [1e-4, 1e-4]);
        assert_float_eq!([u.x, u.y], [  0.0,   2.0], abs <= [1e-6, 1e-6]);
    }

    // Cells are symmetric about the centre of the row
    #[rstest(/**/ n, detector, expected_x,
             case(4, 0, -3.0),
             case(4, 1, -1.0),
             case(4, 2,  1.0),
             case(4, 3,  3.0),
             case(3, 0, -2.0),
             case(3, 1,  0.0),
             case(3, 2,  2.0),
    )]
    fn detector_cell_centres(n: usize, detector: usize, expected_x: f32) {
        let view = fan(&[0.0], n).view(0);
        assert_eq!(view.detector_cell(detector, n), Point::new(expected_x, 50.0));
    }

    #[test]
    fn evenly_spaced_angles() {
        let g = FanFlatGeometry::evenly_spaced(4, turn(1.0), 8, mm(1.0), mm(10.0), mm(10.0));
        let expected = [0.0, 0.25, 0.5, 0.75].map(|t| t * std::f32::consts::TAU);
        assert_float_eq!(g.angles, expected.to_vec(), abs_all <= 1e-5);
    }

    #[rstest(/**/ detectors, spacing, dso,   dod,  valid,
             case(8,         1.0,     10.0,  10.0, true),
             case(0,         1.0,     10.0,  10.0, false),
             case(8,         0.0,     10.0,  10.0, false),
             case(8,        -1.0,     10.0,  10.0, false),
             case(8,         1.0,      0.0,  10.0, false),
             case(8,         1.0,     10.0, -10.0, false),
             case(8,         1.0, f32::INFINITY, 10.0, false),
    )]
    fn check_fan_flat(detectors: usize, spacing: f32, dso: f32, dod: f32, valid: bool) {
        let g = FanFlatGeometry::new([radian(0.0)], detectors, mm(spacing), mm(dso), mm(dod));
        assert_eq!(g.check().is_ok(), valid);
    }

    #[test]
    fn check_rejects_empty_and_nan_angles() {
        assert_eq!(fan(&[], 4).check(), Err(GeometryError::NoProjections));
        assert_eq!(fan(&[0.0, f32::NAN], 4).check(), Err(GeometryError::Angle { index: 1 }));
    }

    #[test]
    fn check_vec_geometry() {
        let good = fan(&[0.0, 1.0], 4).to_vec();
        assert!(good.check().is_ok());
        let mut bad = good.clone();
        bad.views[1].detector_step = Vector::new(0.0, 0.0);
        assert!(matches!(bad.check(), Err(GeometryError::View { index: 1, .. })));
        let mut bad = good;
        bad.views[0].source = bad.views[0].detector_centre;
        assert!(matches!(bad.check(), Err(GeometryError::View { index: 0, .. })));
    }

    #[test]
    fn source_on_a_detector_cell_is_rejected() {
        // Cell 1 of 2 is centred half a step beyond the detector centre
        let views = FanFlatVecGeometry {
            detector_count: 2,
            views: vec![
                FanView {
                    source: Point::new(0.0, -10.0),
                    detector_centre: Point::new(0.0, 10.0),
                    detector_step: Vector::new(1.0, 0.0),
                },
                FanView {
                    source: Point::new(0.5, 10.0),
                    detector_centre: Point::new(0.0, 10.0),
                    detector_step: Vector::new(1.0, 0.0),
                },
            ],
        };
        assert_eq!(views.check(), Err(GeometryError::View { index: 1, reason: "source on a detector cell" }));
    }

    #[test]
    fn enum_dispatch() {
        let g: ProjectionGeometry = fan(&[0.0, 1.0, 2.0], 5).into();
        assert_eq!((g.n_projections(), g.n_detectors()), (3, 5));
        let v: ProjectionGeometry = g.to_vec().into();
        assert_eq!((v.n_projections(), v.n_detectors()), (3, 5));
        assert_eq!(v.to_vec(), g.to_vec());
    }
}
