//! The size and granularity of the pixel grid in which images are
//! reconstructed.

use geometry::{Point, Vector};
use units::{Length, mm_, todo::Lengthf32};

use crate::error::GeometryError;
use crate::index::{BoxDim_u, Index1_u, Index2_u, index1_to_2, index2_to_1};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeGeometry {
    /// Number of pixels along x and y
    pub n: BoxDim_u,
    /// Lower-left corner of the window
    pub min: Point,
    /// Upper-right corner of the window
    pub max: Point,
    pub pixel_size: Vector,
}

impl VolumeGeometry {

    /// Window of the given full size, centred on the origin (the centre of
    /// rotation).
    pub fn new(
        full_size: (Length, Length),
        (nx, ny): (usize, usize),
    ) -> Self {
        let (dx, dy) = full_size;
        let half_width = Vector::new(mm_(dx) / 2.0, mm_(dy) / 2.0);
        let origin = Point::zero();
        Self::from_corners(origin - half_width, origin + half_width, [nx, ny])
    }

    /// Arbitrary axis-aligned window.
    pub fn with_window(
        (min_x, min_y): (Length, Length),
        (max_x, max_y): (Length, Length),
        (nx, ny): (usize, usize),
    ) -> Self {
        Self::from_corners(
            Point::new(mm_(min_x), mm_(min_y)),
            Point::new(mm_(max_x), mm_(max_y)),
            [nx, ny],
        )
    }

    fn from_corners(min: Point, max: Point, n: BoxDim_u) -> Self {
        let full_width = max - min;
        let pixel_size = Vector::new(full_width.x / n[0] as Lengthf32,
                                     full_width.y / n[1] as Lengthf32);
        Self { n, min, max, pixel_size }
    }

    /// Internal consistency: non-empty grid, finite non-empty window.
    pub fn check(&self) -> Result<(), GeometryError> {
        let [nx, ny] = self.n;
        if nx == 0 || ny == 0 {
            return Err(GeometryError::EmptyVolume { nx, ny });
        }
        let Self { min, max, pixel_size, .. } = *self;
        let window_ok = min.is_finite() && max.is_finite()
            && max.x > min.x && max.y > min.y
            && pixel_size.x > 0.0 && pixel_size.y > 0.0;
        if !window_ok {
            return Err(GeometryError::Window { min_x: min.x, min_y: min.y, max_x: max.x, max_y: max.y });
        }
        Ok(())
    }

    pub fn n_pixels(&self) -> usize { self.n[0] * self.n[1] }

    pub fn centre(&self) -> Point { self.min + (self.max - self.min) * 0.5 }

    pub fn half_width(&self) -> Vector { (self.max - self.min) * 0.5 }

    /// Find centre of pixel with given 2D index
    pub fn pixel_centre(&self, [ix, iy]: Index2_u) -> Point {
        let s = self.pixel_size;
        Point::new(self.min.x + (ix as Lengthf32 + 0.5) * s.x,
                   self.min.y + (iy as Lengthf32 + 0.5) * s.y)
    }

    /// Find centre of pixel with given 1D index
    pub fn pixel_centre1(&self, i: Index1_u) -> Point {
        self.pixel_centre(index1_to_2(i, self.n))
    }

    pub fn index1(&self, i: Index2_u) -> Index1_u { index2_to_1(i, self.n) }

    /// Where the segment from `p1` to `p2` first enters the window, if at all.
    pub fn entry(&self, p1: Point, p2: Point) -> Option<Point> {

        use ncollide2d::query::RayCast;
        use ncollide2d::shape::Cuboid;

        type Ray      = ncollide2d::query::Ray    <Lengthf32>;
        type Isometry = ncollide2d::math::Isometry<Lengthf32>;

        let direction = (p2 - p1).normalize()?;
        let length    = (p2 - p1).norm();
        let ray: Ray = Ray::new(p1.into(), direction.into());
        let centre = self.centre();
        let iso: Isometry = Isometry::translation(centre.x, centre.y);
        Cuboid::new(self.half_width().into())
            .toi_with_ray(&iso, &ray, length, true)
            .map(|toi| ray.origin + ray.dir * toi)
            .map(Into::into)
    }

    /// Length of the segment from `p1` to `p2` that lies inside the window.
    pub fn chord_length(&self, p1: Point, p2: Point) -> Lengthf32 {
        match (self.entry(p1, p2), self.entry(p2, p1)) {
            (Some(a), Some(b)) => (a - b).norm(),
            _ => 0.0,
        }
    }

}
