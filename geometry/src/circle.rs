use units::todo::Lengthf32;
use crate::{Point, Dot};

/// Compute the length of the intersection of the line passing through points
/// `p1` and `p2` with a circle of radius `r` centred on the origin.
pub fn circle_line_intersection_length(p1: Point, p2: Point, r: Lengthf32) -> Lengthf32 {
    let v = p2 - p1;
    let w = p1 - Point::zero();
    // Viète coefficients of |w + t v|² = r²
    let a = v.dot(v);
    let b = 2. * v.dot(w);
    let c = w.dot(w) - r * r;
    // Check discriminant to see if line missed circle
    let b_squared = b * b;
    let four_a_c = 4. * a * c;
    if a == 0.0 || b_squared <= four_a_c { return 0.0 }
    let delta_t = (b_squared - four_a_c).sqrt() / a;
    delta_t * v.norm()
}
