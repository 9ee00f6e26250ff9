//! The elevation model.

use super::batch::DownloadBatch;
use super::config::ElevationConfig;
use super::error::ElevationError;
use super::request::AreaRequest;
use super::tiles::TileSet;
use crate::cache::ElevationTileCache;
use crate::coord::CoordError;
use crate::job::{FetchContext, TileFetchJob};
use crate::provider::{AsyncHttpClient, AsyncReqwestClient};
use crate::raster::{HeightRaster, Reprojector};
use crate::tiling::{TileRange, TiledMapScheme};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Computes which tiles an area needs and drives their download.
pub struct ElevationModel<C> {
    config: ElevationConfig,
    scheme: TiledMapScheme,
    zoom: u8,
    context: Arc<FetchContext<C>>,
}

impl ElevationModel<AsyncReqwestClient> {
    /// Creates a model that downloads over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the zoom level is not offered by the scheme or the
    /// HTTP client cannot be built.
    pub fn from_config(config: ElevationConfig, runtime: Handle) -> Result<Self, ElevationError> {
        let client = AsyncReqwestClient::with_connect_timeout(config.connect_timeout)?;
        Self::new(config, Arc::new(client), runtime)
    }
}

impl<C: AsyncHttpClient + 'static> ElevationModel<C> {
    /// Creates a model around an HTTP client.
    ///
    /// Requests and cache writes are spawned on `runtime`.
    pub fn new(
        config: ElevationConfig,
        client: Arc<C>,
        runtime: Handle,
    ) -> Result<Self, ElevationError> {
        let scheme = TiledMapScheme::terrarium().with_url_template(config.url_template.clone());
        let zoom = scheme
            .validate_zoom(config.zoom.unwrap_or_else(|| scheme.max_zoom()))
            .map_err(|e| ElevationError::Config(e.to_string()))?;

        let context = FetchContext::new(client, ElevationTileCache::new(&config.cache_dir), runtime)
            .with_timeout(config.fetch_timeout);

        Ok(Self {
            config,
            scheme,
            zoom,
            context: Arc::new(context),
        })
    }

    pub fn config(&self) -> &ElevationConfig {
        &self.config
    }

    pub fn scheme(&self) -> &TiledMapScheme {
        &self.scheme
    }

    /// Zoom level tiles are fetched at.
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn cache(&self) -> &ElevationTileCache {
        self.context.cache()
    }

    /// Inclusive tile rectangle covering the request's footprint.
    ///
    /// # Errors
    ///
    /// Returns [`CoordError::OutOfDomain`] if a footprint corner cannot be
    /// projected.
    pub fn plan_tiles(&self, request: &AreaRequest) -> Result<TileRange, CoordError> {
        let (sw, ne) = request.projected_corners()?;
        Ok(TileRange::spanning(
            self.scheme.tile_index_for(sw, self.zoom),
            self.scheme.tile_index_for(ne, self.zoom),
        ))
    }

    /// Creates one fetch job per tile of the request, in row-major order.
    ///
    /// No job does any work until the batch is stepped.
    pub fn plan_batch(&self, request: &AreaRequest) -> Result<DownloadBatch<C>, CoordError> {
        let range = self.plan_tiles(request)?;
        let jobs = range
            .iter()
            .map(|tile| TileFetchJob::new(tile, self.scheme.url_for(tile), Arc::clone(&self.context)))
            .collect();

        info!(
            longitude = request.origin().longitude,
            latitude = request.origin().latitude,
            radius_m = request.radius_m(),
            zoom = range.zoom,
            tiles = range.len(),
            max_in_flight = self.config.max_concurrent_downloads,
            "Planned elevation batch"
        );

        Ok(DownloadBatch::new(range, jobs).with_max_in_flight(self.config.max_concurrent_downloads))
    }

    /// Downloads every tile of the request.
    ///
    /// Steps the batch until it completes, sleeping the configured idle
    /// interval whenever a step settles nothing.
    pub async fn download(
        &self,
        request: &AreaRequest,
        cancel: &CancellationToken,
    ) -> Result<TileSet, ElevationError> {
        let mut batch = self.plan_batch(request)?;

        while !batch.is_complete() {
            let report = batch.step(cancel);
            if report.is_idle() {
                tokio::time::sleep(self.config.idle_interval).await;
            } else {
                tokio::task::yield_now().await;
            }
        }

        Ok(batch.into_tile_set()?)
    }

    pub fn reprojector(&self) -> Reprojector {
        Reprojector::new(self.scheme.clone())
    }

    /// Runs the whole pipeline for one request.
    pub async fn build_height_raster(
        &self,
        request: &AreaRequest,
        cancel: &CancellationToken,
    ) -> Result<HeightRaster, ElevationError> {
        let tiles = self.download(request, cancel).await?;
        Ok(self.reprojector().reproject(&tiles, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BatchError;
    use crate::provider::{MockAsyncHttpClient, MockResponse};
    use crate::raster::ZERO_OFFSET;
    use crate::terrarium::tests::elevation_png;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::time::Duration;
    use tempfile::TempDir;

    fn model(client: MockAsyncHttpClient, dir: &TempDir) -> ElevationModel<MockAsyncHttpClient> {
        let config = ElevationConfig::new(dir.path())
            .with_url_template("http://tiles/{z}/{x}/{y}.png")
            .with_idle_interval(Duration::from_millis(5));
        ElevationModel::new(config, Arc::new(client), Handle::current()).unwrap()
    }

    #[tokio::test]
    async fn test_default_zoom_is_highest_level() {
        let dir = TempDir::new().unwrap();
        let model = model(MockAsyncHttpClient::new(MockResponse::Hang), &dir);
        assert_eq!(model.zoom(), 15);
    }

    #[tokio::test]
    async fn test_rejects_unsupported_zoom() {
        let dir = TempDir::new().unwrap();
        let config = ElevationConfig::new(dir.path()).with_zoom(16);
        let result = ElevationModel::new(
            config,
            Arc::new(MockAsyncHttpClient::new(MockResponse::Hang)),
            Handle::current(),
        );
        assert!(matches!(result, Err(ElevationError::Config(_))));
    }

    #[tokio::test]
    async fn test_plan_batch_at_origin_spans_four_tiles() {
        let dir = TempDir::new().unwrap();
        let model = model(MockAsyncHttpClient::new(MockResponse::Hang), &dir);
        let batch = model.plan_batch(&AreaRequest::new(0.0, 0.0, 100)).unwrap();

        // The origin sits on the corner of four tiles.
        assert_eq!(batch.total(), 4);
        assert_eq!(batch.range().min_x, 16383);
        assert_eq!(batch.range().max_x, 16384);
        assert_eq!(batch.max_in_flight(), 8);
    }

    #[tokio::test]
    async fn test_plan_batch_urls_follow_template() {
        let dir = TempDir::new().unwrap();
        let model = model(MockAsyncHttpClient::new(MockResponse::Hang), &dir);
        let batch = model.plan_batch(&AreaRequest::new(0.0, 0.0, 100)).unwrap();

        let urls: Vec<_> = batch
            .range()
            .iter()
            .map(|tile| model.scheme().url_for(tile))
            .collect();
        assert_eq!(
            urls,
            vec![
                "http://tiles/15/16383/16383.png",
                "http://tiles/15/16384/16383.png",
                "http://tiles/15/16383/16384.png",
                "http://tiles/15/16384/16384.png",
            ]
        );
    }

    #[tokio::test]
    async fn test_plan_batch_out_of_domain() {
        let dir = TempDir::new().unwrap();
        let model = model(MockAsyncHttpClient::new(MockResponse::Hang), &dir);
        let result = model.plan_batch(&AreaRequest::new(10.0, 85.0, 50_000));
        assert!(matches!(result, Err(CoordError::OutOfDomain { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_build_height_raster() {
        let dir = TempDir::new().unwrap();
        let model = model(
            MockAsyncHttpClient::new(MockResponse::Body(elevation_png(120.0))),
            &dir,
        );
        let request = AreaRequest::new(7.65, 45.97, 50);

        let raster = model
            .build_height_raster(&request, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(raster.width(), 100);
        assert_eq!(raster.height(), 100);
        assert!(raster.data().iter().all(|&v| v == ZERO_OFFSET + 120));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_download_cancelled() {
        let dir = TempDir::new().unwrap();
        let model = model(MockAsyncHttpClient::new(MockResponse::Hang), &dir);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = model.download(&AreaRequest::new(7.65, 45.97, 50), &cancel).await;

        assert!(matches!(
            result,
            Err(ElevationError::Batch(BatchError::Cancelled))
        ));
    }

    proptest! {
        #[test]
        fn prop_plan_batch_covers_range_without_duplicates(
            lon in -170.0f64..170.0,
            lat in -80.0f64..80.0,
            radius in 1u32..5_000,
            zoom in 8u8..16,
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let dir = TempDir::new().unwrap();
            let config = ElevationConfig::new(dir.path()).with_zoom(zoom);
            let model = ElevationModel::new(
                config,
                Arc::new(MockAsyncHttpClient::new(MockResponse::Hang)),
                runtime.handle().clone(),
            ).unwrap();

            let batch = model.plan_batch(&AreaRequest::new(lon, lat, radius)).unwrap();
            let range = batch.range();
            let expected = (range.max_x - range.min_x + 1) as usize * (range.max_y - range.min_y + 1) as usize;
            prop_assert_eq!(batch.total(), expected);

            let unique: HashSet<_> = batch.job_states().map(|(tile, _)| tile).collect();
            prop_assert_eq!(unique.len(), expected);
        }
    }
}
