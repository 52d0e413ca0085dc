//! Provider types and errors

use crate::coord::TileAddress;
use thiserror::Error;

/// Description of one WMTS layer the tile service can request.
///
/// The nighttime-brightness layer is parameterized by an observation date;
/// the land/sea mask layer is date-independent and served from a finer
/// tile-matrix-set than the brightness layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    /// WMTS layer identifier
    pub name: String,
    /// WMTS style parameter
    pub style: String,
    /// Tile-matrix-set resolution (e.g. "500m", "250m")
    pub tile_matrix_set: String,
    /// Whether requests carry a TIME parameter
    pub dated: bool,
}

impl Layer {
    /// VIIRS day/night band nighttime brightness, one observation per day.
    pub fn nighttime() -> Self {
        Self {
            name: "VIIRS_SNPP_DayNightBand_ENCC".to_string(),
            style: "default".to_string(),
            tile_matrix_set: "500m".to_string(),
            dated: true,
        }
    }

    /// Land/sea mask, date-independent.
    ///
    /// Served at the 250m tile-matrix-set; responses carry more channels
    /// than the brightness layer and are reconciled by taking the last
    /// channel of the decoded image.
    pub fn land_mask() -> Self {
        Self {
            name: "OSM_Land_Mask".to_string(),
            style: "default".to_string(),
            tile_matrix_set: "250m".to_string(),
            dated: false,
        }
    }
}

/// Errors that can occur while fetching from the remote tile service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// HTTP request failed (connect, timeout, read)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Remote answered with a non-success status
    #[error("HTTP {status} from {url}")]
    BadStatus { status: u16, url: String },

    /// Tile address outside the pyramid at its zoom level
    #[error("tile {address} is outside the pyramid")]
    OutOfBounds { address: TileAddress },
}
