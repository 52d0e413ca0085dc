//! Tile raster types and wire-format decoding
//!
//! Tiles arrive from the remote service as PNG. The brightness layer is
//! single-channel; it decodes to its luminance channel. The land-mask layer
//! arrives with more channels and is reconciled to the brightness grid by
//! taking the last channel of the decoded image (255 = land, 0 = ocean,
//! intermediate values = antialiased coastline).

use crate::coord::TileAddress;
use chrono::NaiveDate;
use image::DynamicImage;
use ndarray::Array2;
use thiserror::Error;

/// Canonical tile edge length in pixels.
pub const TILE_SIZE: usize = 512;

/// Errors that can occur while decoding a tile response.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Response bytes were not a decodable image
    #[error("unparseable tile response: {0}")]
    Image(#[from] image::error::ImageError),
}

/// One fetched brightness tile: a single-channel intensity raster tagged
/// with its layer, address, and observation date. Immutable once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct TileImage {
    /// Layer the tile was fetched from
    pub layer: String,
    /// Position in the tile pyramid
    pub address: TileAddress,
    /// Observation date; `None` for undated layers
    pub date: Option<NaiveDate>,
    /// Intensity values in [0, 255], row-major
    pub pixels: Array2<u8>,
}

impl TileImage {
    /// Decodes a brightness-layer PNG response into a tile.
    pub fn from_png(
        layer: impl Into<String>,
        address: TileAddress,
        date: Option<NaiveDate>,
        bytes: &[u8],
    ) -> Result<Self, DecodeError> {
        let img = image::load_from_memory(bytes)?;
        let luma = img.to_luma8();
        let pixels = Array2::from_shape_fn(
            (luma.height() as usize, luma.width() as usize),
            |(row, col)| luma.get_pixel(col as u32, row as u32)[0],
        );

        Ok(Self {
            layer: layer.into(),
            address,
            date,
            pixels,
        })
    }

    /// Tile height and width in pixels.
    pub fn dim(&self) -> (usize, usize) {
        self.pixels.dim()
    }
}

/// A land/sea mask tile, date-independent.
#[derive(Debug, Clone, PartialEq)]
pub struct LandMask {
    /// Position in the tile pyramid
    pub address: TileAddress,
    /// 255 = land, 0 = ocean, row-major
    pub pixels: Array2<u8>,
}

impl LandMask {
    /// Decodes a mask-layer PNG response, keeping only the last channel.
    pub fn from_png(address: TileAddress, bytes: &[u8]) -> Result<Self, DecodeError> {
        let img = image::load_from_memory(bytes)?;
        let pixels = last_channel(&img);

        Ok(Self { address, pixels })
    }

    /// Mask height and width in pixels.
    pub fn dim(&self) -> (usize, usize) {
        self.pixels.dim()
    }
}

/// Extracts the last channel of a decoded image as a 2D array.
fn last_channel(img: &DynamicImage) -> Array2<u8> {
    match img {
        DynamicImage::ImageLuma8(buf) => Array2::from_shape_fn(
            (buf.height() as usize, buf.width() as usize),
            |(row, col)| buf.get_pixel(col as u32, row as u32)[0],
        ),
        DynamicImage::ImageLumaA8(buf) => Array2::from_shape_fn(
            (buf.height() as usize, buf.width() as usize),
            |(row, col)| buf.get_pixel(col as u32, row as u32)[1],
        ),
        DynamicImage::ImageRgb8(buf) => Array2::from_shape_fn(
            (buf.height() as usize, buf.width() as usize),
            |(row, col)| buf.get_pixel(col as u32, row as u32)[2],
        ),
        other => {
            let buf = other.to_rgba8();
            Array2::from_shape_fn(
                (buf.height() as usize, buf.width() as usize),
                |(row, col)| buf.get_pixel(col as u32, row as u32)[3],
            )
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use std::io::Cursor;

    /// Encodes a constant-value grayscale PNG for tests.
    pub fn gray_png(size: u32, value: u8) -> Vec<u8> {
        let img = GrayImage::from_pixel(size, size, Luma([value]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn test_address() -> TileAddress {
        TileAddress::new(5, 6, 5)
    }

    #[test]
    fn test_tile_from_png() {
        let bytes = gray_png(8, 42);
        let tile = TileImage::from_png("test_layer", test_address(), None, &bytes).unwrap();

        assert_eq!(tile.dim(), (8, 8));
        assert!(tile.pixels.iter().all(|&v| v == 42));
        assert_eq!(tile.layer, "test_layer");
    }

    #[test]
    fn test_tile_from_garbage_fails() {
        let result = TileImage::from_png("test_layer", test_address(), None, b"not a png");
        assert!(matches!(result, Err(DecodeError::Image(_))));
    }

    #[test]
    fn test_mask_takes_last_channel_of_rgb() {
        // Red and green differ from blue; the mask must keep blue.
        let img = RgbImage::from_pixel(4, 4, Rgb([10, 20, 200]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let mask = LandMask::from_png(test_address(), &bytes).unwrap();
        assert!(mask.pixels.iter().all(|&v| v == 200));
    }

    #[test]
    fn test_mask_from_grayscale() {
        let bytes = gray_png(4, 255);
        let mask = LandMask::from_png(test_address(), &bytes).unwrap();
        assert!(mask.pixels.iter().all(|&v| v == 255));
    }

    #[test]
    fn test_tile_pixels_are_row_major() {
        // A 2×2 image with one bright pixel at (row 1, col 0).
        let mut img = GrayImage::new(2, 2);
        img.put_pixel(0, 1, Luma([255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let tile = TileImage::from_png("test_layer", test_address(), None, &bytes).unwrap();
        assert_eq!(tile.pixels[[1, 0]], 255);
        assert_eq!(tile.pixels[[0, 0]], 0);
        assert_eq!(tile.pixels[[0, 1]], 0);
    }
}
