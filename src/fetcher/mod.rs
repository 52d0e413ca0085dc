//! Cached, concurrency-bounded tile fetching
//!
//! This module composes the acquisition path: the [`TileService`] checks
//! the in-process cache, falls back to the disk cache, and only then goes
//! to the network under a [`FetchGate`] permit, backfilling both tiers.
//! [`DateSpan`] describes the date ranges fanned out by
//! [`TileService::fetch_range`].

mod gate;
mod range;
mod service;

pub use gate::{FetchGate, FetchPermit, DEFAULT_CONCURRENT_FETCHES};
pub use range::{ConfigurationError, DateSpan};
pub use service::{FetchError, ServiceConfig, TileService};
