//! Core types for the tile cache.

use crate::coord::TileAddress;
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Cache key uniquely identifying a cached tile response.
///
/// Includes every parameter that selects a distinct tile: layer, zoom,
/// column, row, and observation date (`None` for undated layers). Layers
/// never collide because the layer name is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Layer name (e.g. "VIIRS_SNPP_DayNightBand_ENCC")
    pub layer: String,
    /// Tile address
    pub address: TileAddress,
    /// Observation date, or `None` for date-independent layers
    pub date: Option<NaiveDate>,
}

impl CacheKey {
    /// Creates a new cache key.
    pub fn new(layer: impl Into<String>, address: TileAddress, date: Option<NaiveDate>) -> Self {
        Self {
            layer: layer.into(),
            address,
            date,
        }
    }

    /// Composite string form: `<layer>_<zoom>_<col>_<row>_<date-or-none>`.
    pub fn composite(&self) -> String {
        let date = match self.date {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => "none".to_string(),
        };
        format!(
            "{}_{}_{}_{}_{}",
            self.layer, self.address.zoom, self.address.col, self.address.row, date
        )
    }

    /// File name of the on-disk entry for this key.
    pub fn file_name(&self) -> String {
        format!("{}.png", self.composite())
    }
}

/// Cache-related errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error during disk cache operations
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Cache configuration for both tiers.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Root directory of the disk tier
    pub cache_dir: PathBuf,
    /// Maximum entry count of the in-process tier (default: 1000)
    pub max_memory_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nightglow");

        Self {
            cache_dir,
            max_memory_entries: 1000,
        }
    }
}

impl CacheConfig {
    /// Set the disk cache directory.
    pub fn with_cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache_dir = dir;
        self
    }

    /// Set the in-process tier's maximum entry count.
    pub fn with_max_memory_entries(mut self, entries: usize) -> Self {
        self.max_memory_entries = entries;
        self
    }
}
