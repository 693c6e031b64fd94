//! Dimensioned quantities used at the boundaries of the projector: geometry
//! descriptors and configuration files speak `uom`; the tracer itself works in
//! millimetres and radians stored in plain `f32`s (see [`todo`]).

pub mod todo;

pub use uom;
pub use uom::si::Quantity;

/// Quantities whose base unit of length is the millimetre, so that the
/// conversions at the boundary with the `f32` world (`mm`, `mm_`) are exact.
pub mod mmps {
  pub mod f32 {
    use uom::{ISQ, system, si::Quantity};
    ISQ!(uom::si, f32, (millimeter, kilogram, picosecond, ampere, kelvin, mole, candela));
  }
}

pub use mmps::f32::{Angle, Length, Ratio};

mod units {
  pub use uom::si::{length::{micrometer, millimeter, centimeter},
                    ratio ::ratio,
                    angle ::{radian, degree, revolution},
  };
}

/// The full circle constant (τ) Equal to 2π.
pub const TWOPI: f32 = std::f32::consts::TAU;

// Making values from float literals seems to be very long-winded, so provide
// some pithily-named convenience constructors.

/// Generate a function called NAME which returns QUANTITY by interpreting its
/// argument as UNIT
///
/// wrap!(NAME QUANTITY UNIT);
macro_rules! wrap {
  ($name:ident $quantity:ident $unit:ident ) => {
    pub fn $name(x: f32) -> $quantity { $quantity::new::<units::$unit>(x) }
  };
}

wrap!(um     Length   micrometer);
wrap!(mm     Length   millimeter);
wrap!(cm     Length   centimeter);
wrap!(ratio  Ratio         ratio);
wrap!(radian Angle        radian);
wrap!(degree Angle        degree);
wrap!(turn   Angle    revolution);

// Reverse direction of the above.
pub fn mm_    (x: Length) -> f32 { x.get::<units::millimeter>() }
pub fn ratio_ (x: Ratio ) -> f32 { x.get::<units::ratio>() }
pub fn radian_(x: Angle ) -> f32 { x.get::<units::radian>() }
pub fn degree_(x: Angle ) -> f32 { x.get::<units::degree>() }
pub fn turn_  (x: Angle ) -> f32 { x.get::<units::revolution>() }

#[macro_export]
macro_rules! assert_uom_eq {
  ($unit:ident, $lhs:expr, $rhs:expr, $algo:ident <= $tol:expr) => {
    float_eq::assert_float_eq!($lhs.get::<$unit>(), $rhs.get::<$unit>(), $algo <= $tol)
  };
}
