//! Cached tile fetching.
//!
//! [`TileService`] composes the fetch path explicitly: the in-process cache
//! is checked first, a miss falls through to the disk cache, and a miss
//! there goes to the network under a [`FetchGate`] permit, after which both
//! tiers are backfilled. The service owns all long-lived shared state (the
//! two cache tiers and the gate); it is created once at startup and shared
//! behind an `Arc`.

use crate::cache::{CacheConfig, CacheError, CacheKey, DiskCache, MemoryCache};
use crate::coord::TileAddress;
use crate::fetcher::gate::FetchGate;
use crate::fetcher::range::{ConfigurationError, DateSpan};
use crate::provider::{AsyncHttpClient, Layer, ProviderError, WmtsProvider};
use crate::tile::{DecodeError, LandMask, TileImage};
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during a cached fetch.
///
/// Fetch failures are never swallowed and never retried automatically;
/// callers decide whether to retry.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network failure or bad response from the tile service
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Response bytes could not be decoded as a tile image
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Disk cache I/O failure
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Date span could not be resolved
    #[error(transparent)]
    Config(#[from] ConfigurationError),

    /// A range fetch task terminated abnormally
    #[error("fetch task aborted: {0}")]
    TaskAborted(String),
}

/// Configuration of a [`TileService`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Two-tier cache configuration
    pub cache: CacheConfig,
    /// Cap on simultaneous in-flight network fetches
    pub concurrent_fetches: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            concurrent_fetches: crate::fetcher::gate::DEFAULT_CONCURRENT_FETCHES,
        }
    }
}

impl ServiceConfig {
    /// Set the cache configuration.
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Set the concurrent fetch cap.
    pub fn with_concurrent_fetches(mut self, n: usize) -> Self {
        self.concurrent_fetches = n;
        self
    }
}

/// Cached tile fetching over a WMTS provider.
pub struct TileService<C: AsyncHttpClient> {
    provider: WmtsProvider<C>,
    nighttime: Layer,
    mask_layer: Layer,
    memory: MemoryCache,
    disk: DiskCache,
    gate: FetchGate,
}

impl<C: AsyncHttpClient> TileService<C> {
    /// Creates a service with the default brightness and mask layers.
    pub fn new(provider: WmtsProvider<C>, config: ServiceConfig) -> Self {
        info!(
            cache_dir = %config.cache.cache_dir.display(),
            memory_entries = config.cache.max_memory_entries,
            concurrent_fetches = config.concurrent_fetches,
            "Tile service starting"
        );

        Self {
            provider,
            nighttime: Layer::nighttime(),
            mask_layer: Layer::land_mask(),
            memory: MemoryCache::new(config.cache.max_memory_entries),
            disk: DiskCache::new(config.cache.cache_dir),
            gate: FetchGate::new(config.concurrent_fetches),
        }
    }

    /// Replaces the brightness and mask layers.
    ///
    /// Cache keys carry the layer name, so services configured with
    /// different layers never collide in a shared cache directory.
    pub fn with_layers(mut self, nighttime: Layer, mask: Layer) -> Self {
        self.nighttime = nighttime;
        self.mask_layer = mask;
        self
    }

    /// The in-process cache tier.
    pub fn memory_cache(&self) -> &MemoryCache {
        &self.memory
    }

    /// The on-disk cache tier.
    pub fn disk_cache(&self) -> &DiskCache {
        &self.disk
    }

    /// Raw response bytes for one key: memory, then disk, then network.
    async fn cached_bytes(
        &self,
        layer: &Layer,
        key: &CacheKey,
    ) -> Result<Vec<u8>, FetchError> {
        if let Some(bytes) = self.memory.get(key) {
            return Ok(bytes);
        }

        if let Some(bytes) = self.disk.get(key).await? {
            self.memory.put(key.clone(), bytes.clone());
            return Ok(bytes);
        }

        let bytes = {
            let _permit = self.gate.acquire().await;
            self.provider.fetch(layer, key.address, key.date).await?
        };
        debug!(key = %key.composite(), bytes = bytes.len(), "Tile fetched from network");

        self.disk.put(key, &bytes).await?;
        self.memory.put(key.clone(), bytes.clone());
        Ok(bytes)
    }

    /// Fetches one brightness tile, consulting both cache tiers first.
    ///
    /// # Arguments
    ///
    /// * `address` - Tile address in the pyramid
    /// * `date` - Observation date
    pub async fn fetch_tile(
        &self,
        address: TileAddress,
        date: Option<NaiveDate>,
    ) -> Result<TileImage, FetchError> {
        let key = CacheKey::new(self.nighttime.name.clone(), address, date);
        let bytes = self.cached_bytes(&self.nighttime, &key).await?;
        Ok(TileImage::from_png(
            self.nighttime.name.clone(),
            address,
            date,
            &bytes,
        )?)
    }

    /// Fetches the land/sea mask for a tile address.
    ///
    /// Masks are date-independent and cached without a date dimension.
    pub async fn fetch_mask(&self, address: TileAddress) -> Result<LandMask, FetchError> {
        let key = CacheKey::new(self.mask_layer.name.clone(), address, None);
        let bytes = self.cached_bytes(&self.mask_layer, &key).await?;
        Ok(LandMask::from_png(address, &bytes)?)
    }
}

impl<C: AsyncHttpClient + 'static> TileService<C> {
    /// Fetches one brightness tile per date in the span, concurrently.
    ///
    /// One task is spawned per date; every task goes through the cache, so
    /// overlapping ranges reuse cached days. All tasks are joined and their
    /// results read in launch order, so the returned frames are
    /// date-ascending regardless of completion order. Any sub-fetch failure
    /// fails the whole call; partial results are never returned.
    pub async fn fetch_range(
        self: &Arc<Self>,
        address: TileAddress,
        span: DateSpan,
    ) -> Result<Vec<TileImage>, FetchError> {
        let dates = span.resolve().map_err(FetchError::Config)?;
        debug!(tile = %address, days = dates.len(), "Range fetch starting");

        let handles: Vec<_> = dates
            .into_iter()
            .map(|date| {
                let service = Arc::clone(self);
                tokio::spawn(async move { service.fetch_tile(address, Some(date)).await })
            })
            .collect();

        let mut frames = Vec::with_capacity(handles.len());
        for handle in handles {
            let frame = handle
                .await
                .map_err(|e| FetchError::TaskAborted(e.to_string()))??;
            frames.push(frame);
        }

        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockAsyncHttpClient;
    use crate::tile::tests::gray_png;
    use tempfile::TempDir;

    fn service_with(
        mock: MockAsyncHttpClient,
        temp: &TempDir,
    ) -> Arc<TileService<MockAsyncHttpClient>> {
        let config = ServiceConfig::default()
            .with_cache(CacheConfig::default().with_cache_dir(temp.path().join("tiles")));
        Arc::new(TileService::new(WmtsProvider::new(mock), config))
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_fetch_tile_decodes_response() {
        let temp = TempDir::new().unwrap();
        let mock = MockAsyncHttpClient::returning(Ok(gray_png(8, 77)));
        let service = service_with(mock, &temp);

        let tile = service
            .fetch_tile(TileAddress::new(5, 6, 5), Some(date("2017-10-31")))
            .await
            .unwrap();

        assert_eq!(tile.dim(), (8, 8));
        assert!(tile.pixels.iter().all(|&v| v == 77));
        assert_eq!(tile.date, Some(date("2017-10-31")));
    }

    #[tokio::test]
    async fn test_second_fetch_is_a_cache_hit() {
        let temp = TempDir::new().unwrap();
        let mock = MockAsyncHttpClient::returning(Ok(gray_png(8, 50)));
        let calls = Arc::clone(&mock.calls);
        let service = service_with(mock, &temp);
        let address = TileAddress::new(5, 6, 5);

        let first = service.fetch_tile(address, Some(date("2017-10-31"))).await.unwrap();
        let second = service.fetch_tile(address, Some(date("2017-10-31"))).await.unwrap();

        assert_eq!(first.pixels, second.pixels);
        assert_eq!(
            calls.load(std::sync::atomic::Ordering::SeqCst),
            1,
            "second fetch must not hit the network"
        );
    }

    #[tokio::test]
    async fn test_memory_miss_falls_back_to_disk() {
        let temp = TempDir::new().unwrap();
        let mock = MockAsyncHttpClient::returning(Ok(gray_png(8, 50)));
        let calls = Arc::clone(&mock.calls);
        let service = service_with(mock, &temp);
        let address = TileAddress::new(5, 6, 5);

        service.fetch_tile(address, None).await.unwrap();
        service.memory_cache().clear();
        service.fetch_tile(address, None).await.unwrap();

        assert_eq!(
            calls.load(std::sync::atomic::Ordering::SeqCst),
            1,
            "disk tier should satisfy the second fetch"
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let temp = TempDir::new().unwrap();
        let mock =
            MockAsyncHttpClient::returning(Err(ProviderError::Http("unreachable".to_string())));
        let service = service_with(mock, &temp);

        let result = service.fetch_tile(TileAddress::new(5, 6, 5), None).await;
        assert!(matches!(result, Err(FetchError::Provider(_))));
    }

    #[tokio::test]
    async fn test_unparseable_response_is_an_error() {
        let temp = TempDir::new().unwrap();
        let mock = MockAsyncHttpClient::returning(Ok(b"<html>error page</html>".to_vec()));
        let service = service_with(mock, &temp);

        let result = service.fetch_tile(TileAddress::new(5, 6, 5), None).await;
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_mask_cached_without_date() {
        let temp = TempDir::new().unwrap();
        let mock = MockAsyncHttpClient::returning(Ok(gray_png(8, 255)));
        let service = service_with(mock, &temp);
        let address = TileAddress::new(5, 6, 5);

        let mask = service.fetch_mask(address).await.unwrap();
        assert!(mask.pixels.iter().all(|&v| v == 255));

        let expected = temp.path().join("tiles").join("OSM_Land_Mask_5_6_5_none.png");
        assert!(expected.exists());
    }

    #[tokio::test]
    async fn test_fetch_range_returns_dates_in_order() {
        let temp = TempDir::new().unwrap();
        let mock = MockAsyncHttpClient::returning(Ok(gray_png(8, 10)));
        let service = service_with(mock, &temp);

        let frames = service
            .fetch_range(
                TileAddress::new(5, 6, 5),
                DateSpan::days(date("2020-01-01"), 3),
            )
            .await
            .unwrap();

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].date, Some(date("2020-01-01")));
        assert_eq!(frames[1].date, Some(date("2020-01-02")));
        assert_eq!(frames[2].date, Some(date("2020-01-03")));
    }

    #[tokio::test]
    async fn test_fetch_range_unspecified_span_fails() {
        let temp = TempDir::new().unwrap();
        let mock = MockAsyncHttpClient::returning(Ok(gray_png(8, 10)));
        let service = service_with(mock, &temp);

        let span = DateSpan {
            start: date("2020-01-01"),
            num_days: None,
            end: None,
        };
        let result = service.fetch_range(TileAddress::new(5, 6, 5), span).await;
        assert!(matches!(
            result,
            Err(FetchError::Config(ConfigurationError::Unspecified))
        ));
    }

    #[tokio::test]
    async fn test_fetch_range_failure_fails_whole_call() {
        let temp = TempDir::new().unwrap();
        let mock =
            MockAsyncHttpClient::returning(Err(ProviderError::Http("unreachable".to_string())));
        let service = service_with(mock, &temp);

        let result = service
            .fetch_range(
                TileAddress::new(5, 6, 5),
                DateSpan::days(date("2020-01-01"), 3),
            )
            .await;
        assert!(result.is_err());
    }
}
