//! Height rasters and their file formats

use image::{ImageBuffer, ImageFormat, Luma};
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// Errors writing a height raster to disk.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Raster is empty")]
    Empty,
}

/// File format for [`HeightRaster::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RasterFormat {
    /// 16-bit grayscale PNG
    #[default]
    Png16,
    /// Headerless little-endian `u16` samples
    R16,
}

impl fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterFormat::Png16 => write!(f, "png"),
            RasterFormat::R16 => write!(f, "r16"),
        }
    }
}

impl FromStr for RasterFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" | "png16" => Ok(RasterFormat::Png16),
            "r16" | "raw" => Ok(RasterFormat::R16),
            other => Err(format!("unknown raster format '{}' (expected png or r16)", other)),
        }
    }
}

/// Fixed-point elevation raster, `value = 32768 + meters`, row 0 north.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightRaster {
    width: u32,
    height: u32,
    data: Vec<u16>,
}

impl HeightRaster {
    /// Wraps encoded samples. Returns `None` if the length does not match.
    pub fn new(width: u32, height: u32, data: Vec<u16>) -> Option<Self> {
        (data.len() == width as usize * height as usize).then(|| Self::from_data(width, height, data))
    }

    pub(crate) fn from_data(width: u32, height: u32, data: Vec<u16>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u16] {
        &self.data
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Lowest and highest encoded value, or `None` for an empty raster.
    pub fn value_range(&self) -> Option<(u16, u16)> {
        let min = self.data.iter().min()?;
        let max = self.data.iter().max()?;
        Some((*min, *max))
    }

    /// Writes the raster in `format`.
    pub fn write(&self, path: &Path, format: RasterFormat) -> Result<(), ExportError> {
        match format {
            RasterFormat::Png16 => self.write_png16(path),
            RasterFormat::R16 => self.write_r16(path),
        }
    }

    /// Writes a 16-bit grayscale PNG.
    pub fn write_png16(&self, path: &Path) -> Result<(), ExportError> {
        if self.data.is_empty() {
            return Err(ExportError::Empty);
        }
        let image: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_raw(self.width, self.height, self.data.clone()).ok_or(ExportError::Empty)?;
        image.save_with_format(path, ImageFormat::Png)?;
        info!(path = %path.display(), width = self.width, height = self.height, "Wrote PNG height raster");
        Ok(())
    }

    /// Writes raw little-endian samples, row by row.
    pub fn write_r16(&self, path: &Path) -> Result<(), ExportError> {
        if self.data.is_empty() {
            return Err(ExportError::Empty);
        }
        let mut out = BufWriter::new(File::create(path)?);
        for value in &self.data {
            out.write_all(&value.to_le_bytes())?;
        }
        out.flush()?;
        info!(path = %path.display(), width = self.width, height = self.height, "Wrote R16 height raster");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn raster() -> HeightRaster {
        HeightRaster::new(3, 2, vec![0, 1, 2, 32768, 40000, 65535]).unwrap()
    }

    #[test]
    fn test_new_checks_length() {
        assert!(HeightRaster::new(2, 2, vec![0; 3]).is_none());
    }

    #[test]
    fn test_value_range() {
        assert_eq!(raster().value_range(), Some((0, 65535)));
        assert_eq!(HeightRaster::new(0, 0, vec![]).unwrap().value_range(), None);
    }

    #[test]
    fn test_write_r16_little_endian() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("height.r16");

        raster().write_r16(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[6..8], &[0x00, 0x80]);
        assert_eq!(&bytes[10..12], &[0xff, 0xff]);
    }

    #[test]
    fn test_write_png16_preserves_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("height.png");

        raster().write(&path, RasterFormat::Png16).unwrap();

        let image = image::open(&path).unwrap().into_luma16();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(1, 1).0[0], 40000);
        assert_eq!(image.get_pixel(2, 1).0[0], 65535);
    }

    #[test]
    fn test_empty_raster_is_not_written() {
        let dir = TempDir::new().unwrap();
        let empty = HeightRaster::new(0, 0, vec![]).unwrap();
        assert!(matches!(
            empty.write_png16(&dir.path().join("x.png")),
            Err(ExportError::Empty)
        ));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PNG".parse::<RasterFormat>(), Ok(RasterFormat::Png16));
        assert_eq!("r16".parse::<RasterFormat>(), Ok(RasterFormat::R16));
        assert!("tiff".parse::<RasterFormat>().is_err());
    }
}
