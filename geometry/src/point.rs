use std::ops::{Add, Index, Sub};
use units::todo::Lengthf32;
use crate::Vector;

/// A position in the plane of the fan, in millimetres.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: Lengthf32,
    pub y: Lengthf32,
}

impl Point {
    pub fn new(x: Lengthf32, y: Lengthf32) -> Self { Self { x, y } }
    pub fn zero() -> Self { Self::new(0.0, 0.0) }

    pub fn is_finite(&self) -> bool { self.x.is_finite() && self.y.is_finite() }

    /// Point reached after moving `t` times `v` away from `self`
    pub fn along(self, v: Vector, t: f32) -> Self { self + v * t }
}

impl Sub for Point {
    type Output = Vector;
    fn sub(self, rhs: Self) -> Self::Output {
        Vector {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Add<Vector> for Point {
    type Output = Self;
    fn add(self, rhs: Vector) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub<Vector> for Point {
    type Output = Self;
    fn sub(self, rhs: Vector) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Index<usize> for Point {
    type Output = Lengthf32;
    fn index(&self, index: usize) -> &Self::Output {
        match index {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("index {index} is out of bounds [0,1]")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn point_minus_point_is_vector() {
        let lhs = Point::new(3.0, 20.0);
        let rhs = Point::new(2.0, 40.0);
        assert_eq!(lhs - rhs, Vector::new(1.0, -20.0));
    }

    #[test]
    fn point_plus_vector_is_point() {
        let p = Point::new(1.0, 2.0) + Vector::new(0.5, -2.0);
        assert_eq!(p, Point::new(1.5, 0.0));
        assert_eq!(Point::new(1.0, 1.0).along(Vector::new(2.0, 0.0), 1.5), Point::new(4.0, 1.0));
    }

    #[test]
    fn index_for_point() {
        let p = Point::new(7.0, -3.0);
        assert_eq!((p[0], p[1]), (7.0, -3.0));
    }
}
