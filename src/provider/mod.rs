//! Remote tile service abstraction
//!
//! This module provides the HTTP client seam and the WMTS request builder
//! used to download nighttime-brightness and land-mask tiles from the GIBS
//! tile service.

mod http;
mod types;
mod wmts;

pub use http::{AsyncHttpClient, ReqwestClient};
pub use types::{Layer, ProviderError};
pub use wmts::{WmtsProvider, GIBS_BASE_URL};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
