//! Nightglow - nighttime-lights acquisition and compositing
//!
//! This library fetches VIIRS nighttime-brightness tiles from the NASA GIBS
//! WMTS service, caches them in two tiers (in-process and on-disk), composites
//! date ranges of observations into denoised light-pollution frames, and
//! stitches adjacent frames into larger mosaics.
//!
//! # High-Level API
//!
//! Most use cases go through [`fetcher::TileService`]:
//!
//! ```ignore
//! use nightglow::fetcher::{DateSpan, ServiceConfig, TileService};
//! use nightglow::provider::{ReqwestClient, WmtsProvider};
//! use nightglow::coord::TileAddress;
//! use nightglow::denoise::{composite, DenoiseConfig};
//! use std::sync::Arc;
//!
//! let provider = WmtsProvider::new(ReqwestClient::new()?);
//! let service = Arc::new(TileService::new(provider, ServiceConfig::default()));
//!
//! let address = TileAddress::new(5, 6, 5);
//! let span = DateSpan::days("2017-10-01".parse()?, 31);
//! let frames = service.fetch_range(address, span).await?;
//! let estimate = composite(&frames, &DenoiseConfig::default())?;
//! ```

pub mod cache;
pub mod coord;
pub mod denoise;
pub mod fetcher;
pub mod geocode;
pub mod logging;
pub mod mosaic;
pub mod provider;
pub mod tile;

/// Version of the nightglow library.
///
/// Defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
