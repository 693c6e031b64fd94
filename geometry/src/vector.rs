use std::ops::{Add, Index, Mul, Neg, Sub};
use units::todo::Lengthf32;

/// A displacement in the plane of the fan, in millimetres.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector {
    pub x: Lengthf32,
    pub y: Lengthf32,
}

pub trait Dot<RHS> {
    type Output;
    fn dot(self, other: RHS) -> Self::Output;
}

impl Dot<Vector> for Vector {
    type Output = f32;
    fn dot(self, other: Vector) -> f32 { self.x * other.x + self.y * other.y }
}

impl Mul<f32> for Vector {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self::Output {
        Vector {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl Add for Vector {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Vector {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Vector {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Vector {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Neg for Vector {
    type Output = Self;
    fn neg(self) -> Self::Output { Vector { x: -self.x, y: -self.y } }
}

impl Index<usize> for Vector {
    type Output = Lengthf32;
    fn index(&self, index: usize) -> &Self::Output {
        match index {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("index {index} is out of bounds [0,1]")
        }
    }
}

impl Vector {

    pub fn new(x: Lengthf32, y: Lengthf32) -> Self { Self { x, y } }

    pub fn norm(self) -> Lengthf32 { self.x.hypot(self.y) }

    /// `None` when there is no direction to speak of.
    pub fn normalize(self) -> Option<Self> {
        let norm = self.norm();
        if norm > 0.0 && norm.is_finite() { Some(self * (1.0 / norm)) }
        else                              { None }
    }

    /// z-component of the 3D cross product (a.k.a. perp-dot product)
    pub fn cross(self, other: Self) -> f32 { self.x * other.y - self.y * other.x }

    /// Rotated by +90 degrees
    pub fn perp(self) -> Self { Self::new(-self.y, self.x) }

    pub fn is_finite(&self) -> bool { self.x.is_finite() && self.y.is_finite() }

    /// Index of the component with the larger magnitude. Ties go to x.
    pub fn dominant_axis(self) -> usize {
        if self.x.abs() >= self.y.abs() { 0 } else { 1 }
    }

}
