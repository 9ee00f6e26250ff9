//! PNG payload decoding

use super::tile::{ElevationTile, TILE_SIZE};
use crate::coord::TileCoordinate;
use image::codecs::png::PngDecoder;
use image::{ColorType, ImageDecoder};
use std::io::Cursor;
use thiserror::Error;

/// Offset that makes the packed unsigned value signed.
const ELEVATION_BIAS: f32 = 32768.0;

/// Reasons a payload is not a usable terrarium tile.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// Payload is not a readable PNG.
    #[error("invalid PNG data: {0}")]
    InvalidPng(String),

    /// Image is not exactly one tile in size.
    #[error("PNG has wrong dimensions {width}x{height}, expected {expected}x{expected}")]
    WrongDimensions { width: u32, height: u32, expected: u32 },

    /// Image is not 4-channel with at most 8 bits per channel.
    #[error("PNG holds elevation in an unsupported format ({channels} channels, {bits} bits per channel)")]
    UnsupportedFormat { channels: u8, bits: u16 },
}

/// Unpacks one terrarium pixel to meters.
#[inline]
pub fn decode_pixel(r: u8, g: u8, b: u8) -> f32 {
    (r as f32 * 256.0 + g as f32 + b as f32 / 256.0) - ELEVATION_BIAS
}

/// Packs an elevation in meters into a terrarium pixel (alpha = 255).
///
/// Values outside the encodable range saturate.
#[inline]
pub fn encode_pixel(elevation: f32) -> [u8; 4] {
    let v = ((elevation + ELEVATION_BIAS) * 256.0)
        .round()
        .clamp(0.0, 16_777_215.0) as u32;
    [(v >> 16) as u8, (v >> 8) as u8, v as u8, 255]
}

/// Decodes a provider payload into an [`ElevationTile`].
///
/// The image must be `TILE_SIZE` square and RGBA with 8-bit channels. The PNG
/// decoder widens sub-byte palette images, so those arrive here as RGBA8 too.
///
/// # Errors
///
/// Returns a [`DecodeError`] describing the first violated expectation.
pub fn decode_tile(coordinate: TileCoordinate, bytes: &[u8]) -> Result<ElevationTile, DecodeError> {
    let decoder =
        PngDecoder::new(Cursor::new(bytes)).map_err(|e| DecodeError::InvalidPng(e.to_string()))?;

    let (width, height) = decoder.dimensions();
    if width != TILE_SIZE || height != TILE_SIZE {
        return Err(DecodeError::WrongDimensions {
            width,
            height,
            expected: TILE_SIZE,
        });
    }

    let color = decoder.color_type();
    if color != ColorType::Rgba8 {
        let channels = color.channel_count();
        return Err(DecodeError::UnsupportedFormat {
            channels,
            bits: color.bits_per_pixel() / channels.max(1) as u16,
        });
    }

    let mut raw = vec![0u8; decoder.total_bytes() as usize];
    decoder
        .read_image(&mut raw)
        .map_err(|e| DecodeError::InvalidPng(e.to_string()))?;

    let samples = raw
        .chunks_exact(4)
        .map(|px| decode_pixel(px[0], px[1], px[2]))
        .collect();

    ElevationTile::from_samples(coordinate, samples).ok_or_else(|| {
        DecodeError::InvalidPng("decoded pixel count does not match dimensions".to_string())
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgb, Rgba, RgbaImage};

    /// Encodes a tile-sized RGBA PNG with every pixel set to `pixel`.
    pub(crate) fn solid_png(size: u32, pixel: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(size, size, Rgba(pixel));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    /// Terrarium PNG of a tile at constant elevation.
    pub(crate) fn elevation_png(elevation: f32) -> Vec<u8> {
        solid_png(TILE_SIZE, encode_pixel(elevation))
    }

    fn coord() -> TileCoordinate {
        TileCoordinate::new(15, 1, 2)
    }

    #[test]
    fn test_sea_level_pixel() {
        let tile = decode_tile(coord(), &solid_png(256, [128, 0, 0, 255])).unwrap();
        assert_eq!(tile.sample(0, 0), 0.0);
        assert_eq!(tile.sample(255, 255), 0.0);
    }

    #[test]
    fn test_black_pixel_is_minimum() {
        let tile = decode_tile(coord(), &solid_png(256, [0, 0, 0, 255])).unwrap();
        assert_eq!(tile.sample(10, 10), -32768.0);
    }

    #[test]
    fn test_fractional_blue_channel() {
        // 128*256 + 1 + 128/256 - 32768 = 1.5
        let tile = decode_tile(coord(), &solid_png(256, [128, 1, 128, 0])).unwrap();
        assert_eq!(tile.sample(3, 4), 1.5);
    }

    #[test]
    fn test_alpha_is_ignored() {
        let opaque = decode_tile(coord(), &solid_png(256, [130, 10, 0, 255])).unwrap();
        let clear = decode_tile(coord(), &solid_png(256, [130, 10, 0, 0])).unwrap();
        assert_eq!(opaque.samples(), clear.samples());
    }

    #[test]
    fn test_rejects_wrong_dimensions() {
        let err = decode_tile(coord(), &solid_png(128, [128, 0, 0, 255])).unwrap_err();
        assert_eq!(
            err,
            DecodeError::WrongDimensions {
                width: 128,
                height: 128,
                expected: 256
            }
        );
    }

    #[test]
    fn test_rejects_three_channel_image() {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(256, 256, Rgb([128, 0, 0]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();

        let err = decode_tile(coord(), out.get_ref()).unwrap_err();
        assert_eq!(err, DecodeError::UnsupportedFormat { channels: 3, bits: 8 });
    }

    #[test]
    fn test_rejects_sixteen_bit_image() {
        let img: ImageBuffer<Rgba<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(256, 256, Rgba([0, 0, 0, 65535]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();

        let err = decode_tile(coord(), out.get_ref()).unwrap_err();
        assert_eq!(err, DecodeError::UnsupportedFormat { channels: 4, bits: 16 });
    }

    #[test]
    fn test_rejects_garbage() {
        let err = decode_tile(coord(), b"<html>503 Slow Down</html>").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidPng(_)));
    }

    #[test]
    fn test_encode_pixel_matches_decode() {
        for elevation in [0.0f32, -32768.0, 8848.0, -10994.5, 123.25] {
            let [r, g, b, a] = encode_pixel(elevation);
            assert_eq!(a, 255);
            assert_eq!(decode_pixel(r, g, b), elevation);
        }
    }

    #[test]
    fn test_decoded_tile_keeps_coordinate() {
        let tile = decode_tile(coord(), &elevation_png(42.0)).unwrap();
        assert_eq!(tile.coordinate(), coord());
        assert_eq!(tile.elevation_range(), (42.0, 42.0));
    }
}
