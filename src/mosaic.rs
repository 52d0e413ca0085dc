//! Mosaic assembly
//!
//! Stitches a rectangular grid of adjacent denoised frames and their land
//! masks into one larger intensity/mask pair. Frames are concatenated
//! column-wise within each row, then rows vertically, intensity and mask in
//! lockstep.

use ndarray::{s, Array2};
use thiserror::Error;
use tracing::debug;

/// Errors raised when a mosaic grid violates its shape preconditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeMismatchError {
    /// The grid has no tiles
    #[error("mosaic grid is empty")]
    EmptyGrid,

    /// A grid row has a different tile count than the first row
    #[error("mosaic grid is ragged: row {row} has {got} tiles, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// Frame and mask grids disagree on their layout
    #[error("mask grid is {got_rows}x{got_cols}, expected {rows}x{cols}")]
    GridLayout {
        rows: usize,
        cols: usize,
        got_rows: usize,
        got_cols: usize,
    },

    /// A tile or mask has different pixel dimensions than the first tile
    #[error("tile ({row}, {col}) has pixel size {got:?}, expected {expected:?}")]
    TileSize {
        row: usize,
        col: usize,
        expected: (usize, usize),
        got: (usize, usize),
    },
}

/// Stitches a grid of denoised frames and matching masks.
///
/// # Arguments
///
/// * `frames` - Rectangular grid of intensity tiles, outer slice = rows
/// * `masks` - Matching grid of land masks
///
/// # Returns
///
/// The stitched `(intensity, mask)` pair. A grid of R×C tiles of H×W
/// pixels yields arrays of (R·H)×(C·W).
///
/// # Errors
///
/// [`ShapeMismatchError`] when the grid is empty or ragged, the mask grid
/// does not mirror the frame grid, or any tile/mask disagrees on pixel
/// dimensions.
pub fn assemble(
    frames: &[Vec<Array2<f64>>],
    masks: &[Vec<Array2<u8>>],
) -> Result<(Array2<f64>, Array2<u8>), ShapeMismatchError> {
    let grid_rows = frames.len();
    let grid_cols = frames.first().map(|row| row.len()).unwrap_or(0);
    if grid_rows == 0 || grid_cols == 0 {
        return Err(ShapeMismatchError::EmptyGrid);
    }

    for (row, tiles) in frames.iter().enumerate() {
        if tiles.len() != grid_cols {
            return Err(ShapeMismatchError::RaggedGrid {
                row,
                expected: grid_cols,
                got: tiles.len(),
            });
        }
    }

    if masks.len() != grid_rows || masks.iter().any(|row| row.len() != grid_cols) {
        return Err(ShapeMismatchError::GridLayout {
            rows: grid_rows,
            cols: grid_cols,
            got_rows: masks.len(),
            got_cols: masks.first().map(|row| row.len()).unwrap_or(0),
        });
    }

    let (tile_h, tile_w) = frames[0][0].dim();
    for row in 0..grid_rows {
        for col in 0..grid_cols {
            for dim in [frames[row][col].dim(), masks[row][col].dim()] {
                if dim != (tile_h, tile_w) {
                    return Err(ShapeMismatchError::TileSize {
                        row,
                        col,
                        expected: (tile_h, tile_w),
                        got: dim,
                    });
                }
            }
        }
    }

    let mut intensity = Array2::<f64>::zeros((grid_rows * tile_h, grid_cols * tile_w));
    let mut mask = Array2::<u8>::zeros((grid_rows * tile_h, grid_cols * tile_w));

    for row in 0..grid_rows {
        for col in 0..grid_cols {
            let (y, x) = (row * tile_h, col * tile_w);
            intensity
                .slice_mut(s![y..y + tile_h, x..x + tile_w])
                .assign(&frames[row][col]);
            mask.slice_mut(s![y..y + tile_h, x..x + tile_w])
                .assign(&masks[row][col]);
        }
    }

    debug!(
        rows = grid_rows,
        cols = grid_cols,
        height = grid_rows * tile_h,
        width = grid_cols * tile_w,
        "Mosaic assembled"
    );

    Ok((intensity, mask))
}
