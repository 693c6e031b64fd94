//! Planar points and vectors for fan-beam geometry, in millimetres.

mod point;
mod vector;

pub use point::Point;
pub use vector::{Vector, Dot};

mod mix;
mod circle;

pub use circle::circle_line_intersection_length;
