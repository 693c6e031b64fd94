use crate::error::GeometryError;
use crate::index::{Index1_u, Index2_u, index2_to_1};
use crate::volume::VolumeGeometry;
use units::todo::Intensityf32;

pub type ImageData = Vec<Intensityf32>;

/// Pixel values on a reconstruction grid, x varying fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub volume: VolumeGeometry,
    pub data: ImageData,
}

impl Image {

    pub fn new(volume: VolumeGeometry, data: ImageData) -> Result<Self, GeometryError> {
        let expected = volume.n_pixels();
        if data.len() != expected {
            return Err(GeometryError::DataSize { expected, actual: data.len() });
        }
        Ok(Self { volume, data })
    }

    pub fn ones(volume: VolumeGeometry) -> Self {
        Self { data: vec![1.0; volume.n_pixels()], volume }
    }

    pub fn empty(volume: VolumeGeometry) -> Self {
        Self { data: Self::zeros_buffer(volume), volume }
    }

    /// A new empty data store with matching size
    pub fn zeros_buffer(volume: VolumeGeometry) -> ImageData { vec![0.0; volume.n_pixels()] }

    /// Disc of `value` of radius `r` (mm), centred on the origin, zero
    /// elsewhere. Pixels count as inside if their centre is.
    pub fn disc(volume: VolumeGeometry, r: f32, value: Intensityf32) -> Self {
        let data = (0..volume.n_pixels())
            .map(|i| volume.pixel_centre1(i))
            .map(|c| if c.x * c.x + c.y * c.y <= r * r { value } else { 0.0 })
            .collect();
        Self { volume, data }
    }
}

impl core::ops::IndexMut<Index1_u> for Image {
    #[inline]
    fn index_mut(&mut self, i: Index1_u) -> &mut Self::Output { &mut self.data[i] }
}

impl core::ops::Index<Index1_u> for Image {
    type Output = Intensityf32;
    #[inline]
    fn index(&self, i: Index1_u) -> &Self::Output { &self.data[i] }
}

impl core::ops::IndexMut<Index2_u> for Image {
    fn index_mut(&mut self, i2: Index2_u) -> &mut Self::Output {
        let i1 = index2_to_1(i2, self.volume.n);
        &mut self.data[i1]
    }
}

impl core::ops::Index<Index2_u> for Image {
    type Output = Intensityf32;
    fn index(&self, i2: Index2_u) -> &Self::Output {
        let i1 = index2_to_1(i2, self.volume.n);
        &self.data[i1]
    }
}
