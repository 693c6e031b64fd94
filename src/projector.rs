//! Overall structure of forward and backward projections.
//!
//! [`FanFlatLineProjector`] owns copies of a fan-beam projection geometry and a
//! reconstruction grid. Given those, it can
//!
//! + resolve the end points of any ray (`resolve_ray`),
//!
//! + trace any ray through the grid with the line kernel (`trace_ray`,
//!   `compute_single_ray_weights`),
//!
//! + sweep over all rays, all rays of one projection, or a single ray, handing
//!   the weights to a [`Policy`] (`project_all`, `project_projection`,
//!   `project_ray`).
//!
//! The sweeps are sequential and visit rays in ascending (projection, detector)
//! order. Rays are independent, so sweeps may be run in parallel as long as the
//! policies' outputs are kept apart: `forward_project` and `back_project` show
//! two ways of doing that with `rayon`.

use std::ops::Range;

use ndarray::{ArrayViewMut1, Axis};
use rayon::prelude::*;

use geometry::Vector;
use units::todo::{Anglef32, Weightf32};

use crate::{
    error::{GeometryError, ProjectorError},
    image::{Image, ImageData},
    index::Index1_u,
    policy::{BackProjection, Policy, Prior, SparseMatrix, SystemMatrixBuilder},
    projection::{FanFlatVecGeometry, ProjectionGeometry},
    ray::{Ray, RayEndpoints, angle_between, angular_weights},
    sinogram::Sinogram,
    system_matrix::{LineKernel, PixelWeight},
    volume::VolumeGeometry,
    weights::WeightBuffer,
};

/// Abstract interface for 2D projectors, independent of the kernel used to
/// calculate the system matrix elements.
pub trait Projector {
    /// Stable name, used by registries to construct projectors by name.
    /// For [`FanFlatLineProjector`] this is `"line_fanflat"`; its
    /// human-readable name, `"fan-flat line kernel, 2D"`, is
    /// [`FanFlatLineProjector::DESCRIPTION`].
    fn get_type(&self) -> &'static str;

    /// Copy the geometries. If they are unusable, the projector is left
    /// uninitialized.
    fn initialize(&mut self, projection: &ProjectionGeometry, volume: &VolumeGeometry) -> Result<(), GeometryError>;

    /// Back to the uninitialized state, dropping the copied geometries
    fn clear(&mut self);

    fn is_initialized(&self) -> bool;

    /// Number of pixels which any ray of the given projection can touch, at
    /// most. Buffers of this size will never overflow.
    fn projection_weights_count(&self, projection: usize) -> Result<usize, ProjectorError>;

    /// Place the weights of a single ray in `buffer`, returning how many there
    /// are.
    fn compute_single_ray_weights(
        &self,
        projection: usize,
        detector: usize,
        buffer: &mut WeightBuffer,
    ) -> Result<usize, ProjectorError>;
}

/// How a sweep ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sweep {
    /// Every requested ray was offered to the policy
    Completed,
    /// The policy asked to stop
    Stopped,
}

/// Fan-beam projector with a flat detector and a line kernel.
#[derive(Clone, Debug, Default)]
pub struct FanFlatLineProjector {
    geometry: Option<Geometry>,
}

#[derive(Clone, Debug)]
struct Geometry {
    projection: ProjectionGeometry,
    volume: VolumeGeometry,
    /// Per-view placement of source and detector, derived from `projection`
    views: FanFlatVecGeometry,
}

impl FanFlatLineProjector {

    pub const TYPE: &'static str = "line_fanflat";
    pub const DESCRIPTION: &'static str = "fan-flat line kernel, 2D";

    pub fn new(projection: &ProjectionGeometry, volume: &VolumeGeometry) -> Result<Self, GeometryError> {
        let mut projector = Self::default();
        projector.initialize(projection, volume)?;
        Ok(projector)
    }

    fn geometry(&self) -> Result<&Geometry, ProjectorError> {
        self.geometry.as_ref().ok_or(ProjectorError::Uninitialized)
    }

    pub fn projection_geometry(&self) -> Option<&ProjectionGeometry> { self.geometry.as_ref().map(|g| &g.projection) }
    pub fn volume_geometry    (&self) -> Option<&VolumeGeometry>     { self.geometry.as_ref().map(|g| &g.volume) }

    pub fn n_projections(&self) -> Result<usize, ProjectorError> { Ok(self.geometry()?.views.views.len()) }
    pub fn n_detectors  (&self) -> Result<usize, ProjectorError> { Ok(self.geometry()?.views.detector_count) }

    /// Source point and detector cell centre of a ray, in volume coordinates.
    pub fn resolve_ray(&self, projection: usize, detector: usize) -> Result<RayEndpoints, ProjectorError> {
        let g = self.geometry()?;
        g.check_ray(projection, detector)?;
        Ok(g.views.ray(projection, detector))
    }

    /// Pixels crossed by a ray, with the ray's length inside each of them, in
    /// order of increasing coordinate along the ray's dominant axis.
    pub fn trace_ray(&self, projection: usize, detector: usize) -> Result<LineKernel, ProjectorError> {
        let g = self.geometry()?;
        g.check_ray(projection, detector)?;
        g.trace(projection, detector)
    }

    // ----- Policy-driven sweeps ----------------------------------------------------

    /// Offer every ray of every projection to `policy`.
    pub fn project_all<P: Policy>(&self, policy: &mut P) -> Result<Sweep, ProjectorError> {
        let g = self.geometry()?;
        g.project_block(0..g.views.views.len(), 0..g.views.detector_count, policy)
    }

    /// Offer every ray of a single projection to `policy`.
    pub fn project_projection<P: Policy>(&self, projection: usize, policy: &mut P) -> Result<Sweep, ProjectorError> {
        let g = self.geometry()?;
        g.check_projection(projection)?;
        g.project_block(projection..projection + 1, 0..g.views.detector_count, policy)
    }

    /// Offer a single ray to `policy`.
    pub fn project_ray<P: Policy>(&self, projection: usize, detector: usize, policy: &mut P) -> Result<Sweep, ProjectorError> {
        let g = self.geometry()?;
        g.check_ray(projection, detector)?;
        g.project_block(projection..projection + 1, detector..detector + 1, policy)
    }

    // ----- Derived quantities ---------------------------------------------------------

    /// Unsigned angle between two directions, zero if either is degenerate.
    pub fn angle_between(a: Vector, b: Vector) -> Anglef32 { angle_between(a, b) }

    /// Weight of each view in an angular integration over the trajectory.
    pub fn angular_weights(&self) -> Result<Vec<Anglef32>, ProjectorError> {
        Ok(angular_weights(&self.geometry()?.views))
    }

    /// The whole system matrix, one row per ray (`projection * n_detectors +
    /// detector`), one column per pixel.
    pub fn system_matrix(&self) -> Result<SparseMatrix, ProjectorError> {
        let g = self.geometry()?;
        let mut builder = SystemMatrixBuilder::new(g.views.detector_count);
        self.project_all(&mut builder)?;
        builder.finish(g.views.views.len() * g.views.detector_count, g.volume.n_pixels())
    }

    // ----- Parallel projections ----------------------------------------------------------

    /// Sinogram of `image`.
    ///
    /// Each projection is handled by a single worker which owns the
    /// corresponding sinogram row outright, so no synchronization is needed.
    pub fn forward_project(&self, image: &Image) -> Result<Sinogram, ProjectorError> {
        let g = self.geometry()?;
        g.check_image(image)?;
        let mut sinogram = Sinogram::zeros(g.views.views.len(), g.views.detector_count);
        sinogram.data
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .try_for_each(|(projection, row)| {
                let mut policy = ForwardRow { image, row };
                self.project_projection(projection, &mut policy).map(|_| ())
            })?;
        Ok(sinogram)
    }

    /// Adjoint of `forward_project`.
    ///
    /// Each worker accumulates into its own image; the per-worker images are
    /// summed at the end.
    pub fn back_project(&self, sinogram: &Sinogram) -> Result<Image, ProjectorError> {
        let g = self.geometry()?;
        let expected = [g.views.views.len(), g.views.detector_count];
        if sinogram.shape() != expected {
            return Err(ProjectorError::ShapeMismatch { what: "sinogram", expected, actual: sinogram.shape() });
        }
        let volume = g.volume;
        (0..expected[0])
            .into_par_iter()
            // Closure preparing the state needed by `fold`: will be called by
            // `fold` at the start of every job that is launched.
            .try_fold(|| Image::empty(volume), |mut image, projection| {
                self.project_projection(projection, &mut BackProjection { sinogram, image: &mut image })?;
                Ok::<_, ProjectorError>(image)
            })
            // Sum the backprojections calculated on each thread
            .try_reduce(|| Image::empty(volume), |a, b| {
                Ok(Image { volume, data: elementwise_add(a.data, b.data) })
            })
    }
}

impl Projector for FanFlatLineProjector {

    fn get_type(&self) -> &'static str { Self::TYPE }

    fn initialize(&mut self, projection: &ProjectionGeometry, volume: &VolumeGeometry) -> Result<(), GeometryError> {
        // Whatever happens, no trace of the previous geometry may remain
        self.geometry = None;
        let checked = projection.check().and_then(|_| volume.check());
        if let Err(e) = checked {
            log::warn!("{} projector not initialized: {e}", Self::TYPE);
            return Err(e);
        }
        let views = projection.to_vec();
        // The conversion to vectors can still produce unusable views
        if let Err(e) = views.check() {
            log::warn!("{} projector not initialized: {e}", Self::TYPE);
            return Err(e);
        }
        log::debug!("{} projector: {} projections x {} detectors onto {}x{} pixels of {:?} mm",
                    Self::TYPE, views.views.len(), views.detector_count,
                    volume.n[0], volume.n[1], (volume.pixel_size.x, volume.pixel_size.y));
        self.geometry = Some(Geometry { projection: projection.clone(), volume: *volume, views });
        Ok(())
    }

    fn clear(&mut self) {
        log::debug!("{} projector cleared", Self::TYPE);
        self.geometry = None;
    }

    fn is_initialized(&self) -> bool { self.geometry.is_some() }

    fn projection_weights_count(&self, projection: usize) -> Result<usize, ProjectorError> {
        let g = self.geometry()?;
        g.check_projection(projection)?;
        // One pixel per band along the dominant axis, which is either of them
        let [nx, ny] = g.volume.n;
        Ok(nx.max(ny))
    }

    fn compute_single_ray_weights(
        &self,
        projection: usize,
        detector: usize,
        buffer: &mut WeightBuffer,
    ) -> Result<usize, ProjectorError> {
        // Throw away previous ray's values
        buffer.clear();
        let mut required = 0;
        for element in self.trace_ray(projection, detector)? {
            required += 1;
            // Keep counting once full, to report the size that was needed
            let _ = buffer.try_push(element);
        }
        if required > buffer.capacity() {
            return Err(ProjectorError::BufferOverflow { required, capacity: buffer.capacity() });
        }
        Ok(required)
    }
}

impl Geometry {

    fn check_projection(&self, projection: usize) -> Result<(), ProjectorError> {
        let count = self.views.views.len();
        if projection >= count {
            return Err(ProjectorError::ProjectionOutOfRange { index: projection, count });
        }
        Ok(())
    }

    fn check_ray(&self, projection: usize, detector: usize) -> Result<(), ProjectorError> {
        self.check_projection(projection)?;
        let count = self.views.detector_count;
        if detector >= count {
            return Err(ProjectorError::DetectorOutOfRange { index: detector, count });
        }
        Ok(())
    }

    fn check_image(&self, image: &Image) -> Result<(), ProjectorError> {
        if image.volume.n != self.volume.n || image.data.len() != self.volume.n_pixels() {
            return Err(ProjectorError::ShapeMismatch { what: "image", expected: self.volume.n, actual: image.volume.n });
        }
        Ok(())
    }

    fn trace(&self, projection: usize, detector: usize) -> Result<LineKernel, ProjectorError> {
        LineKernel::new(&self.views.ray(projection, detector), &self.volume)
            .ok_or(ProjectorError::DegenerateRay { projection, detector })
    }

    /// Policy-driven sweep over a block of rays. Indices must already have been
    /// checked.
    fn project_block<P: Policy>(
        &self,
        projections: Range<usize>,
        detectors: Range<usize>,
        policy: &mut P,
    ) -> Result<Sweep, ProjectorError> {
        for projection in projections {
            log::trace!("projecting view {projection}");
            for detector in detectors.clone() {
                let ray = Ray::new(projection, detector);
                match policy.prior(ray) {
                    Prior::Trace => {}
                    Prior::Skip  => continue,
                    Prior::Stop  => return Ok(Sweep::Stopped),
                }
                for PixelWeight { index, weight } in self.trace(projection, detector)? {
                    policy.add_weight(ray, index, weight);
                }
                policy.posterior(ray);
            }
        }
        Ok(Sweep::Completed)
    }
}

/// Forward projection into a single, exclusively owned, sinogram row.
struct ForwardRow<'a, 'r> {
    image: &'a Image,
    row: ArrayViewMut1<'r, f32>,
}

impl Policy for ForwardRow<'_, '_> {
    #[inline]
    fn add_weight(&mut self, ray: Ray, pixel: Index1_u, weight: Weightf32) {
        self.row[ray.detector] += weight * self.image[pixel];
    }
}

pub fn elementwise_add(a: ImageData, b: ImageData) -> ImageData {
    a.iter().zip(b.iter()).map(|(l,r)| l+r).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use units::{mm, radian, turn};
    use crate::projection::FanFlatGeometry;

    #[fixture]
    fn projector() -> FanFlatLineProjector {
        let projection = FanFlatGeometry::evenly_spaced(8, turn(1.0), 16, mm(1.5), mm(100.0), mm(60.0));
        let volume = VolumeGeometry::new((mm(20.0), mm(16.0)), (10, 8));
        FanFlatLineProjector::new(&projection.into(), &volume).unwrap()
    }

    #[rstest]
    fn lifecycle(projector: FanFlatLineProjector) {
        let mut projector = projector;
        assert!(projector.is_initialized());
        assert_eq!(projector.get_type(), "line_fanflat");
        assert_eq!(FanFlatLineProjector::DESCRIPTION, "fan-flat line kernel, 2D");
        assert_eq!(projector.n_projections(), Ok(8));
        assert_eq!(projector.n_detectors(), Ok(16));
        projector.clear();
        assert!(!projector.is_initialized());
        assert_eq!(projector.projection_geometry(), None);
        assert_eq!(projector.resolve_ray(0, 0), Err(ProjectorError::Uninitialized));
        let mut buffer = WeightBuffer::with_capacity(10);
        assert_eq!(projector.compute_single_ray_weights(0, 0, &mut buffer), Err(ProjectorError::Uninitialized));
        assert_eq!(projector.project_all(&mut SystemMatrixBuilder::new(16)), Err(ProjectorError::Uninitialized));
    }

    #[rstest]
    fn failed_initialization_leaves_projector_uninitialized(projector: FanFlatLineProjector) {
        let mut projector = projector;
        let bad_volume = VolumeGeometry::new((mm(20.0), mm(16.0)), (0, 8));
        let projection = projector.projection_geometry().unwrap().clone();
        assert_eq!(projector.initialize(&projection, &bad_volume),
                   Err(GeometryError::EmptyVolume { nx: 0, ny: 8 }));
        assert!(!projector.is_initialized());

        let volume = VolumeGeometry::new((mm(20.0), mm(16.0)), (10, 8));
        let bad_projection: ProjectionGeometry =
            FanFlatGeometry::new([radian(0.0)], 4, mm(-1.0), mm(100.0), mm(60.0)).into();
        assert!(projector.initialize(&bad_projection, &volume).is_err());
        assert!(!projector.is_initialized());

        assert!(projector.initialize(&projection, &volume).is_ok());
        assert!(projector.is_initialized());
    }

    #[rstest(/**/ projection, detector, expected,
             case(8, 0, ProjectorError::ProjectionOutOfRange { index: 8, count: 8 }),
             case(0, 16, ProjectorError::DetectorOutOfRange { index: 16, count: 16 }),
    )]
    fn out_of_range_indices(projector: FanFlatLineProjector, projection: usize, detector: usize, expected: ProjectorError) {
        assert_eq!(projector.resolve_ray(projection, detector), Err(expected.clone()));
        assert_eq!(projector.trace_ray(projection, detector).err(), Some(expected.clone()));
        let mut buffer = WeightBuffer::with_capacity(100);
        assert_eq!(projector.compute_single_ray_weights(projection, detector, &mut buffer), Err(expected.clone()));
        assert_eq!(projector.project_ray(projection, detector, &mut SystemMatrixBuilder::new(16)), Err(expected));
    }

    #[rstest]
    fn buffer_overflow_is_reported(projector: FanFlatLineProjector) {
        // The central ray of the first view crosses the whole grid vertically
        let mut buffer = WeightBuffer::with_capacity(3);
        let result = projector.compute_single_ray_weights(0, 8, &mut buffer);
        assert_eq!(result, Err(ProjectorError::BufferOverflow { required: 8, capacity: 3 }));
        assert_eq!(buffer.len(), 3);

        let mut buffer = WeightBuffer::with_capacity(projector.projection_weights_count(0).unwrap());
        assert_eq!(projector.compute_single_ray_weights(0, 8, &mut buffer), Ok(8));
        let total: f32 = buffer.iter().map(|w| w.weight).sum();
        // The ray is slightly tilted
        assert_float_eq!(total, 16.0, rmax <= 1e-4);
    }

    #[test]
    fn ray_missing_the_grid_stores_nothing() {
        // With 4 mm cells, the outermost detectors look past the 20 mm wide grid
        let projection = FanFlatGeometry::evenly_spaced(1, turn(1.0), 16, mm(4.0), mm(100.0), mm(60.0));
        let volume = VolumeGeometry::new((mm(20.0), mm(16.0)), (10, 8));
        let projector = FanFlatLineProjector::new(&projection.into(), &volume).unwrap();
        let mut buffer = WeightBuffer::with_capacity(projector.projection_weights_count(0).unwrap());
        assert_eq!(projector.compute_single_ray_weights(0, 0, &mut buffer), Ok(0));
        assert!(buffer.is_empty());
    }

    // Policy recording the order of the calls it receives
    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
        skip: Option<Ray>,
        stop: Option<Ray>,
    }

    impl Policy for Recorder {
        fn prior(&mut self, ray: Ray) -> Prior {
            self.log.push(format!("prior {} {}", ray.projection, ray.detector));
            if Some(ray) == self.stop { return Prior::Stop }
            if Some(ray) == self.skip { return Prior::Skip }
            Prior::Trace
        }
        fn add_weight(&mut self, _ray: Ray, _pixel: Index1_u, _weight: Weightf32) {
            if self.log.last().map_or(true, |l| l != "weight") { self.log.push("weight".into()) }
        }
        fn posterior(&mut self, ray: Ray) {
            self.log.push(format!("posterior {} {}", ray.projection, ray.detector));
        }
    }

    #[rstest]
    fn lifecycle_hooks_in_order(projector: FanFlatLineProjector) {
        let mut recorder = Recorder { skip: Some(Ray::new(3, 7)), ..Default::default() };
        assert_eq!(projector.project_ray(3, 8, &mut recorder), Ok(Sweep::Completed));
        assert_eq!(recorder.log, vec!["prior 3 8", "weight", "posterior 3 8"]);

        recorder.log.clear();
        assert_eq!(projector.project_ray(3, 7, &mut recorder), Ok(Sweep::Completed));
        assert_eq!(recorder.log, vec!["prior 3 7"]);
    }

    #[rstest]
    fn sweeps_visit_rays_in_ascending_order(projector: FanFlatLineProjector) {
        let mut recorder = Recorder::default();
        assert_eq!(projector.project_projection(2, &mut recorder), Ok(Sweep::Completed));
        let priors: Vec<_> = recorder.log.iter().filter(|l| l.starts_with("prior")).cloned().collect();
        let expected: Vec<_> = (0..16).map(|d| format!("prior 2 {d}")).collect();
        assert_eq!(priors, expected);

        let mut recorder = Recorder::default();
        projector.project_all(&mut recorder).unwrap();
        let priors: Vec<_> = recorder.log.iter().filter(|l| l.starts_with("prior")).cloned().collect();
        let expected: Vec<_> = (0..8).flat_map(|p| (0..16).map(move |d| format!("prior {p} {d}"))).collect();
        assert_eq!(priors, expected);
    }

    #[rstest]
    fn stop_ends_the_sweep(projector: FanFlatLineProjector) {
        let mut recorder = Recorder { stop: Some(Ray::new(1, 2)), ..Default::default() };
        assert_eq!(projector.project_all(&mut recorder), Ok(Sweep::Stopped));
        assert_eq!(recorder.log.last().map(String::as_str), Some("prior 1 2"));
        let priors = recorder.log.iter().filter(|l| l.starts_with("prior")).count();
        assert_eq!(priors, 16 + 3);
    }

    #[rstest]
    fn count_bounds_every_ray(projector: FanFlatLineProjector) {
        for p in 0..8 {
            let bound = projector.projection_weights_count(p).unwrap();
            let most = (0..16).map(|d| projector.trace_ray(p, d).unwrap().count()).max().unwrap();
            assert!(most <= bound, "projection {p}: {most} > {bound}");
        }
    }

    #[rstest]
    fn parallel_forward_matches_sequential(projector: FanFlatLineProjector) {
        let volume = *projector.volume_geometry().unwrap();
        let image = Image::new(volume, (0..80).map(|i| (i % 7) as f32).collect()).unwrap();
        let parallel = projector.forward_project(&image).unwrap();
        let mut sequential = Sinogram::zeros(8, 16);
        projector.project_all(&mut crate::policy::ForwardProjection { image: &image, sinogram: &mut sequential }).unwrap();
        assert_float_eq!(parallel.data.into_raw_vec(), sequential.data.into_raw_vec(), rmax_all <= 1e-6);
    }

    #[rstest]
    fn parallel_back_matches_sequential(projector: FanFlatLineProjector) {
        let sinogram = Sinogram::from_vec(8, 16, (0..128).map(|i| (i % 5) as f32).collect()).unwrap();
        let parallel = projector.back_project(&sinogram).unwrap();
        let volume = *projector.volume_geometry().unwrap();
        let mut sequential = Image::empty(volume);
        projector.project_all(&mut BackProjection { sinogram: &sinogram, image: &mut sequential }).unwrap();
        assert_float_eq!(parallel.data, sequential.data, rmax_all <= 1e-5);
    }

    #[rstest]
    fn shapes_are_checked(projector: FanFlatLineProjector) {
        let wrong = Image::ones(VolumeGeometry::new((mm(20.0), mm(16.0)), (5, 4)));
        assert!(matches!(projector.forward_project(&wrong), Err(ProjectorError::ShapeMismatch { .. })));
        let wrong = Sinogram::zeros(8, 15);
        assert!(matches!(projector.back_project(&wrong), Err(ProjectorError::ShapeMismatch { .. })));
    }

    #[rstest]
    fn angular_weights_of_full_circle(projector: FanFlatLineProjector) {
        let weights = projector.angular_weights().unwrap();
        let step = std::f32::consts::TAU / 8.0;
        assert_float_eq!(weights, vec![step; 8], abs_all <= 1e-5);
    }

    #[test]
    fn source_on_a_detector_cell_fails_initialization() {
        use crate::projection::{FanFlatVecGeometry, FanView};
        use geometry::{Point, Vector};
        // Source sits on the centre of detector cell 1
        let views = FanFlatVecGeometry {
            detector_count: 2,
            views: vec![FanView {
                source: Point::new(0.5, 10.0),
                detector_centre: Point::new(0.0, 10.0),
                detector_step: Vector::new(1.0, 0.0),
            }],
        };
        let volume = VolumeGeometry::new((mm(4.0), mm(4.0)), (4, 4));
        let mut projector = FanFlatLineProjector::default();
        assert_eq!(projector.initialize(&views.into(), &volume),
                   Err(GeometryError::View { index: 0, reason: "source on a detector cell" }));
        assert!(!projector.is_initialized());
        let mut recorder = Recorder::default();
        assert_eq!(projector.project_all(&mut recorder), Err(ProjectorError::Uninitialized));
        assert!(recorder.log.is_empty());
    }
}
