//! Pixel and sinogram index types, and conversion between 1D and 2D indices.
//!
//! Images are stored with x varying fastest: `i1 = ix + iy * nx`, with `iy = 0`
//! being the row at the minimum y of the reconstruction window.

#[allow(non_camel_case_types)] pub type Index1_u = usize;
#[allow(non_camel_case_types)] pub type Index2_u = [usize; 2];
#[allow(non_camel_case_types)] pub type BoxDim_u = [usize; 2];

use std::ops::{Add, Div, Mul, Rem};

pub fn index2_to_1<T>([ix, iy]: [T; 2], [nx, _ny]: [T; 2]) -> T
where
    T: Mul<Output = T> + Add<Output = T>
{
    ix + iy * nx
}

pub fn index1_to_2<T>(i: T, [nx, _ny]: [T; 2]) -> [T; 2]
where
    T: Div<Output = T> +
    Rem<Output = T> +
    Copy
{
    [i % nx, i / nx]
}
