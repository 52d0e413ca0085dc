//! WMTS GetTile request building against the GIBS endpoint

use super::http::AsyncHttpClient;
use super::types::{Layer, ProviderError};
use crate::coord::TileAddress;
use chrono::NaiveDate;
use tracing::debug;

/// Fixed endpoint all tile requests are issued against.
pub const GIBS_BASE_URL: &str = "https://gibs-b.earthdata.nasa.gov/wmts/epsg4326/best/wmts.cgi";

/// WMTS tile provider.
///
/// Builds GetTile requests for a [`Layer`] and downloads the raw PNG
/// response. Failures are returned to the caller; there is no automatic
/// retry here, a deliberate simplicity choice.
pub struct WmtsProvider<C: AsyncHttpClient> {
    http_client: C,
    base_url: String,
}

impl<C: AsyncHttpClient> WmtsProvider<C> {
    /// Creates a new provider against the GIBS endpoint.
    pub fn new(http_client: C) -> Self {
        Self {
            http_client,
            base_url: GIBS_BASE_URL.to_string(),
        }
    }

    /// Creates a new provider with a custom base URL.
    ///
    /// Useful for testing or pointing at a mirror.
    pub fn with_base_url(http_client: C, base_url: String) -> Self {
        Self {
            http_client,
            base_url,
        }
    }

    /// Constructs the GetTile URL for a layer, address, and optional date.
    fn build_url(&self, layer: &Layer, address: TileAddress, date: Option<NaiveDate>) -> String {
        let mut url = format!(
            "{}?layer={}&style={}&tilematrixset={}&Service=WMTS&Request=GetTile&Version=1.0.0&Format=image%2Fpng&TileMatrix={}&TileCol={}&TileRow={}",
            self.base_url,
            layer.name,
            layer.style,
            layer.tile_matrix_set,
            address.zoom,
            address.col,
            address.row,
        );

        if layer.dated {
            if let Some(date) = date {
                url.push_str("&TIME=");
                url.push_str(&date.format("%Y-%m-%d").to_string());
            }
        }

        url
    }

    /// Downloads the raw tile response for one layer/address/date.
    ///
    /// # Arguments
    ///
    /// * `layer` - The layer to request
    /// * `address` - Tile address; must be inside the pyramid
    /// * `date` - Observation date; ignored for undated layers
    ///
    /// # Returns
    ///
    /// The raw response bytes (PNG) or a [`ProviderError`].
    pub async fn fetch(
        &self,
        layer: &Layer,
        address: TileAddress,
        date: Option<NaiveDate>,
    ) -> Result<Vec<u8>, ProviderError> {
        if !address.is_in_bounds() {
            return Err(ProviderError::OutOfBounds { address });
        }

        let url = self.build_url(layer, address, date);
        debug!(layer = %layer.name, tile = %address, "Fetching tile");
        self.http_client.get(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockAsyncHttpClient;

    fn mock_provider() -> WmtsProvider<MockAsyncHttpClient> {
        WmtsProvider::new(MockAsyncHttpClient::returning(Ok(vec![1, 2, 3])))
    }

    #[test]
    fn test_build_url_dated_layer() {
        let provider = mock_provider();
        let date = NaiveDate::from_ymd_opt(2017, 10, 31).unwrap();
        let url = provider.build_url(
            &Layer::nighttime(),
            TileAddress::new(5, 6, 5),
            Some(date),
        );

        assert!(url.starts_with(GIBS_BASE_URL));
        assert!(url.contains("layer=VIIRS_SNPP_DayNightBand_ENCC"));
        assert!(url.contains("style=default"));
        assert!(url.contains("tilematrixset=500m"));
        assert!(url.contains("Service=WMTS"));
        assert!(url.contains("Request=GetTile"));
        assert!(url.contains("Version=1.0.0"));
        assert!(url.contains("Format=image%2Fpng"));
        assert!(url.contains("TileMatrix=5"));
        assert!(url.contains("TileCol=6"));
        assert!(url.contains("TileRow=5"));
        assert!(url.contains("TIME=2017-10-31"));
    }

    #[test]
    fn test_build_url_mask_layer_has_no_time() {
        let provider = mock_provider();
        let date = NaiveDate::from_ymd_opt(2017, 10, 31).unwrap();
        let url = provider.build_url(
            &Layer::land_mask(),
            TileAddress::new(5, 6, 5),
            Some(date),
        );

        assert!(url.contains("layer=OSM_Land_Mask"));
        assert!(url.contains("tilematrixset=250m"));
        assert!(!url.contains("TIME="));
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let provider = mock_provider();
        let data = provider
            .fetch(&Layer::nighttime(), TileAddress::new(5, 6, 5), None)
            .await
            .unwrap();
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_rejects_out_of_bounds_address() {
        let provider = mock_provider();
        let result = provider
            .fetch(&Layer::nighttime(), TileAddress::new(5, 40, 0), None)
            .await;
        assert!(matches!(
            result,
            Err(ProviderError::OutOfBounds { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_propagates_http_error() {
        let mock = MockAsyncHttpClient::returning(Err(ProviderError::Http("down".to_string())));
        let provider = WmtsProvider::new(mock);
        let result = provider
            .fetch(&Layer::nighttime(), TileAddress::new(5, 6, 5), None)
            .await;
        assert!(result.is_err());
    }
}
