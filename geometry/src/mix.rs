//! Conversions to and from `ncollide2d`'s types, used for ray casting against
//! the reconstruction window.

use crate::{Point, Vector};

impl From<ncollide2d::math::Point<f32>> for Point {
    fn from(p: ncollide2d::math::Point<f32>) -> Self { Self::new(p.x, p.y) }
}

impl From<ncollide2d::math::Vector<f32>> for Vector {
    fn from(v: ncollide2d::math::Vector<f32>) -> Self { Self::new(v.x, v.y) }
}

impl From<Point> for ncollide2d::math::Point<f32> {
    fn from(p: Point) -> Self { Self::new(p.x, p.y) }
}

impl From<Vector> for ncollide2d::math::Vector<f32> {
    fn from(v: Vector) -> Self { Self::new(v.x, v.y) }
}
