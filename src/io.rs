//! Read / write images and sinograms as raw little-endian `f32` streams

use std::error::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use units::todo::Intensityf32;

use crate::image::Image;
use crate::sinogram::Sinogram;
use crate::volume::VolumeGeometry;

type IORes<T> = std::io::Result<T>;

pub fn write_bin<'a>(data: impl Iterator<Item = &'a Intensityf32>, path: &Path) -> IORes<()> {
    let mut buf = BufWriter::new(File::create(path)?);
    for datum in data {
        buf.write_all(&datum.to_le_bytes())?;
    }
    buf.flush()
}

pub fn read_bin<'a>(path: &Path) -> IORes<impl Iterator<Item = IORes<Intensityf32>> + 'a> {
    let mut buf = BufReader::new(File::open(path)?);
    let mut buffer = [0; 4];

    Ok(std::iter::from_fn(move || {
        use std::io::ErrorKind::UnexpectedEof;
        match buf.read_exact(&mut buffer) {
            Ok(()) => Some(Ok(f32::from_le_bytes(buffer))),
            Err(e) if e.kind() == UnexpectedEof => None,
            Err(e) => Some(Err(e)),
        }
    }))
}

/// Pixel values, x varying fastest, in a file whose length must match `volume`
pub fn read_image(path: &Path, volume: VolumeGeometry) -> Result<Image, Box<dyn Error>> {
    let data = read_bin(path)?.collect::<Result<Vec<_>, _>>()?;
    Ok(Image::new(volume, data)?)
}

/// One row of detector values per projection
pub fn write_sinogram(sinogram: &Sinogram, path: &Path) -> IORes<()> {
    write_bin(sinogram.iter(), path)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::GeometryError;
    use units::mm;

    #[test]
    fn bin_io_roundtrip() -> std::io::Result<()> {
        use tempfile::tempdir;
        #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};

        // Harmless temporary location for output file
        let dir = tempdir()?;
        let file_path = dir.path().join("test.bin");

        let original_data = vec![1.23, 4.56, 7.89];
        write_bin(original_data.iter(), &file_path)?;
        let reloaded_data: Vec<_> = read_bin(&file_path)?
            .collect::<Result<_, _>>()?;

        assert_eq!(original_data, reloaded_data);
        Ok(())
    }

    #[test]
    fn sinogram_is_written_row_by_row() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sinogram.raw");
        let sinogram = Sinogram::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
        write_sinogram(&sinogram, &path)?;
        assert_eq!(std::fs::metadata(&path)?.len(), 6 * 4);
        // The same bytes are a valid 3x2 image
        let volume = VolumeGeometry::new((mm(3.0), mm(2.0)), (3, 2));
        let image = read_image(&path, volume)?;
        assert_eq!(image.data, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        Ok(())
    }

    #[test]
    fn image_size_must_match() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("image.raw");
        write_bin([1.0, 2.0, 3.0].iter(), &path)?;
        let volume = VolumeGeometry::new((mm(2.0), mm(2.0)), (2, 2));
        let error = read_image(&path, volume).err().ok_or("expected an error")?;
        assert_eq!(error.downcast_ref::<GeometryError>(),
                   Some(&GeometryError::DataSize { expected: 4, actual: 3 }));
        Ok(())
    }
}
