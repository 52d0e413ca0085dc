//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and tile addresses in the EPSG:4326 quad-tree pyramid served by the GIBS
//! tile service.

mod types;

pub use types::{CoordError, GeoCoord, TileAddress, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Number of tile columns in the pyramid at the given zoom level.
#[inline]
pub fn columns_at(zoom: u8) -> u32 {
    (1.25 * f64::powi(2.0, zoom as i32)) as u32
}

/// Number of tile rows in the pyramid at the given zoom level.
#[inline]
pub fn rows_at(zoom: u8) -> u32 {
    (0.625 * f64::powi(2.0, zoom as i32)) as u32
}

/// Converts a tile address to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's north-west (upper-left)
/// corner. The formula is exact for any zoom; no error cases.
#[inline]
pub fn tile_to_lat_lon(address: &TileAddress) -> GeoCoord {
    let scale = f64::powi(2.0, address.zoom as i32);
    let lat = 90.0 - address.row as f64 * 180.0 / (0.625 * scale);
    let lon = -180.0 + address.col as f64 * 360.0 / (1.25 * scale);
    GeoCoord::new(lat, lon)
}

/// Converts geographic coordinates to the tile address containing them.
///
/// Latitude bands are half-open downward (a band owns its top edge:
/// `top ≥ lat > bottom`) and longitude bands are half-open upward (a band
/// owns its west edge: `west ≤ lon < east`), so a coordinate exactly on a
/// band edge resolves to exactly one tile. The two closing edges of the
/// pyramid (latitude −90, longitude 180) are folded into the last band so
/// every valid coordinate has an address.
///
/// Zoom 0 always yields (0, 0).
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-90 to 90)
/// * `lon` - Longitude in degrees (-180 to 180)
/// * `zoom` - Pyramid level
///
/// # Returns
///
/// A `Result` containing the tile address or an error if inputs are invalid.
pub fn lat_lon_to_tile(lat: f64, lon: f64, zoom: u8) -> Result<TileAddress, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }

    // The single zoom-0 tile covers the whole pyramid.
    if zoom == 0 {
        return Ok(TileAddress::new(0, 0, 0));
    }

    let scale = f64::powi(2.0, zoom as i32);

    // Closed-form band lookup. The fractional band counts (0.625·2^z,
    // 1.25·2^z) match the forward conversion, so corner coordinates
    // round-trip exactly; flooring implements the half-open convention.
    let row = ((90.0 - lat) / 180.0 * (0.625 * scale)) as u32;
    let col = ((lon + 180.0) / 360.0 * (1.25 * scale)) as u32;

    Ok(TileAddress::new(
        zoom,
        col.min(columns_at(zoom) - 1),
        row.min(rows_at(zoom) - 1),
    ))
}

/// Geographic coordinate of one pixel inside a tile.
///
/// Pixel (0, 0) is the tile's upper-left corner; each step moves
/// 1/`tile_size` of the tile's span south (rows) or east (columns).
#[inline]
pub fn pixel_to_lat_lon(
    address: &TileAddress,
    px_row: usize,
    px_col: usize,
    tile_size: usize,
) -> GeoCoord {
    let corner = tile_to_lat_lon(address);
    let scale = f64::powi(2.0, address.zoom as i32);
    let lat_span = 180.0 / (0.625 * scale);
    let lon_span = 360.0 / (1.25 * scale);
    GeoCoord::new(
        corner.lat - lat_span / tile_size as f64 * px_row as f64,
        corner.lon + lon_span / tile_size as f64 * px_col as f64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pyramid_dimensions() {
        assert_eq!(columns_at(0), 1);
        assert_eq!(rows_at(0), 0); // fractional row count floors to zero
        assert_eq!(columns_at(3), 10);
        assert_eq!(rows_at(3), 5);
        assert_eq!(columns_at(5), 40);
        assert_eq!(rows_at(5), 20);
    }

    #[test]
    fn test_tile_to_lat_lon_origin() {
        let coord = tile_to_lat_lon(&TileAddress::new(5, 0, 0));
        assert_eq!(coord.lat, 90.0);
        assert_eq!(coord.lon, -180.0);
    }

    #[test]
    fn test_tile_to_lat_lon_zoom_five() {
        // At zoom 5 each tile spans 9°×9°.
        let coord = tile_to_lat_lon(&TileAddress::new(5, 6, 5));
        assert_eq!(coord.lat, 45.0);
        assert_eq!(coord.lon, -126.0);
    }

    #[test]
    fn test_zoom_zero_always_origin() {
        for (lat, lon) in [(90.0, -180.0), (0.0, 0.0), (-90.0, 180.0), (51.5, -0.13)] {
            let tile = lat_lon_to_tile(lat, lon, 0).unwrap();
            assert_eq!(tile, TileAddress::new(0, 0, 0));
        }
    }

    #[test]
    fn test_invalid_latitude() {
        let result = lat_lon_to_tile(90.5, 0.0, 5);
        assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
    }

    #[test]
    fn test_invalid_longitude() {
        let result = lat_lon_to_tile(0.0, -180.01, 5);
        assert!(matches!(result, Err(CoordError::InvalidLongitude(_))));
    }

    #[test]
    fn test_roundtrip_at_tile_corners() {
        // Converting a tile corner back to a tile must recover the address
        // exactly: the corner is on the band edges the tile owns.
        for zoom in 1..=7u8 {
            for col in [0, columns_at(zoom) / 2, columns_at(zoom) - 1] {
                for row in [0, rows_at(zoom) / 2, rows_at(zoom) - 1] {
                    let address = TileAddress::new(zoom, col, row);
                    let corner = tile_to_lat_lon(&address);
                    let back = lat_lon_to_tile(corner.lat, corner.lon, zoom).unwrap();
                    assert_eq!(back, address, "round-trip failed at {}", address);
                }
            }
        }
    }

    #[test]
    fn test_band_edge_resolves_to_one_band() {
        // Latitude 45 at zoom 5 is the top edge of row 5; it must resolve
        // to row 5, not row 4.
        let tile = lat_lon_to_tile(45.0, -126.0, 5).unwrap();
        assert_eq!(tile.row, 5);
        assert_eq!(tile.col, 6);

        // Just above the edge belongs to the band above.
        let tile = lat_lon_to_tile(45.0 + 1e-9, -126.0, 5).unwrap();
        assert_eq!(tile.row, 4);
    }

    #[test]
    fn test_closing_edges_fold_into_last_band() {
        let south = lat_lon_to_tile(-90.0, 0.0, 5).unwrap();
        assert_eq!(south.row, rows_at(5) - 1);

        let east = lat_lon_to_tile(0.0, 180.0, 5).unwrap();
        assert_eq!(east.col, columns_at(5) - 1);
    }

    #[test]
    fn test_is_in_bounds() {
        assert!(TileAddress::new(5, 39, 19).is_in_bounds());
        assert!(!TileAddress::new(5, 40, 19).is_in_bounds());
        assert!(!TileAddress::new(5, 39, 20).is_in_bounds());
        assert!(TileAddress::new(0, 0, 0).is_in_bounds());
        assert!(!TileAddress::new(0, 1, 0).is_in_bounds());
    }

    #[test]
    fn test_pixel_to_lat_lon_steps_through_tile() {
        let address = TileAddress::new(5, 6, 5);
        let corner = pixel_to_lat_lon(&address, 0, 0, 512);
        assert_eq!(corner.lat, 45.0);
        assert_eq!(corner.lon, -126.0);

        // 512 pixels span the whole 9° tile.
        let last = pixel_to_lat_lon(&address, 512, 512, 512);
        assert!((last.lat - 36.0).abs() < 1e-9);
        assert!((last.lon - (-117.0)).abs() < 1e-9);
    }
}
