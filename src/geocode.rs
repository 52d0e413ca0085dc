//! Reverse-geocoding collaborator interface
//!
//! The offline reverse-geocoding lookup is an external service; this module
//! defines the interface it must satisfy and the overlay that tags denoised
//! pixels with the places it returns. Land pixels (mask ≠ 0) are enumerated
//! with their geographic coordinates, looked up in one batch, and joined
//! back to their intensity values.

use crate::coord::{pixel_to_lat_lon, GeoCoord, TileAddress};
use ndarray::Array2;
use thiserror::Error;

/// A place record returned by the reverse geocoder for one coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    /// Place name
    pub name: String,
    /// County-level administrative division
    pub admin2: String,
    /// State/province-level administrative division
    pub admin1: String,
    /// ISO country code
    pub country_code: String,
    /// Latitude of the matched place
    pub lat: f64,
    /// Longitude of the matched place
    pub lon: f64,
}

/// Errors from the geocoding overlay.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeocodeError {
    /// The external geocoder failed
    #[error("geocoder backend error: {0}")]
    Backend(String),

    /// The geocoder returned a different number of places than asked
    #[error("geocoder returned {got} places for {expected} coordinates")]
    CountMismatch { expected: usize, got: usize },

    /// Intensity frame and mask disagree on pixel dimensions
    #[error("intensity shape {frame:?} does not match mask shape {mask:?}")]
    Shape {
        frame: (usize, usize),
        mask: (usize, usize),
    },
}

/// External reverse-geocoding service.
///
/// Implementations take a batch of coordinates and return one place record
/// per coordinate, in order.
pub trait ReverseGeocoder {
    /// Looks up the nearest known place for each coordinate.
    fn lookup(&self, coords: &[GeoCoord]) -> Result<Vec<Place>, GeocodeError>;
}

/// One tagged land pixel of a denoised frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelPlace {
    /// Denoised light-pollution intensity at the pixel
    pub intensity: f64,
    /// Nearest known place
    pub place: Place,
    /// Latitude of the pixel itself
    pub lat: f64,
    /// Longitude of the pixel itself
    pub lon: f64,
}

/// Tags every land pixel of a denoised frame with its nearest place.
///
/// Ocean pixels (mask = 0) are skipped; coastline pixels with intermediate
/// mask values count as land. The geocoder sees one batch lookup with all
/// land-pixel coordinates in row-major order, and the returned rows keep
/// that order.
///
/// # Arguments
///
/// * `address` - Address of the tile the frame was composited from
/// * `frame` - Denoised intensity values
/// * `mask` - Land/sea mask of the same tile
/// * `geocoder` - External reverse-geocoding service
pub fn tag_region<G: ReverseGeocoder>(
    address: TileAddress,
    frame: &Array2<f64>,
    mask: &Array2<u8>,
    geocoder: &G,
) -> Result<Vec<PixelPlace>, GeocodeError> {
    if frame.dim() != mask.dim() {
        return Err(GeocodeError::Shape {
            frame: frame.dim(),
            mask: mask.dim(),
        });
    }

    let (height, width) = frame.dim();
    let tile_size = height.max(width);

    let mut coords = Vec::new();
    let mut intensities = Vec::new();
    for row in 0..height {
        for col in 0..width {
            if mask[[row, col]] != 0 {
                coords.push(pixel_to_lat_lon(&address, row, col, tile_size));
                intensities.push(frame[[row, col]]);
            }
        }
    }

    let places = geocoder.lookup(&coords)?;
    if places.len() != coords.len() {
        return Err(GeocodeError::CountMismatch {
            expected: coords.len(),
            got: places.len(),
        });
    }

    Ok(places
        .into_iter()
        .zip(coords)
        .zip(intensities)
        .map(|((place, coord), intensity)| PixelPlace {
            intensity,
            place,
            lat: coord.lat,
            lon: coord.lon,
        })
        .collect())
}
