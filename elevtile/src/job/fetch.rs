//! Tile fetch job

use super::state::{FetchFailure, JobState};
use crate::cache::ElevationTileCache;
use crate::coord::TileCoordinate;
use crate::provider::{AsyncHttpClient, ProviderError};
use crate::terrarium::{decode_tile, ElevationTile};
use futures::FutureExt;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Wall-clock budget for one tile request, measured from when it is issued.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

type RequestHandle = JoinHandle<Result<Vec<u8>, ProviderError>>;

/// Resources shared by every job of a batch.
pub struct FetchContext<C> {
    client: Arc<C>,
    cache: ElevationTileCache,
    runtime: Handle,
    timeout: Duration,
}

impl<C> fmt::Debug for FetchContext<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchContext")
            .field("cache", &self.cache)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl<C: AsyncHttpClient + 'static> FetchContext<C> {
    /// Creates a context with the default request timeout.
    ///
    /// Requests and cache writes are spawned onto `runtime`, which must keep
    /// running while jobs are polled.
    pub fn new(client: Arc<C>, cache: ElevationTileCache, runtime: Handle) -> Self {
        Self {
            client,
            cache,
            runtime,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache(&self) -> &ElevationTileCache {
        &self.cache
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn spawn_request(&self, url: String) -> RequestHandle {
        let client = Arc::clone(&self.client);
        self.runtime.spawn(async move { client.get(&url).await })
    }
}

/// Where a succeeded job's bytes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileSource {
    Cache,
    Network { bytes: usize },
}

/// Acquisition state machine for one tile.
///
/// At most one network request is open per job. Dropping a job aborts its
/// request.
pub struct TileFetchJob<C> {
    coordinate: TileCoordinate,
    url: String,
    state: JobState,
    context: Arc<FetchContext<C>>,
    request_started: Option<Instant>,
    request: Option<RequestHandle>,
    payload: Option<Vec<u8>>,
    payload_from_cache: bool,
    tile: Option<ElevationTile>,
    source: Option<TileSource>,
    failure: Option<FetchFailure>,
}

impl<C> fmt::Debug for TileFetchJob<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileFetchJob")
            .field("coordinate", &self.coordinate)
            .field("state", &self.state)
            .field("failure", &self.failure)
            .finish()
    }
}

impl<C: AsyncHttpClient + 'static> TileFetchJob<C> {
    /// Creates a job in [`JobState::Created`]. Nothing happens until polled.
    pub fn new(coordinate: TileCoordinate, url: String, context: Arc<FetchContext<C>>) -> Self {
        Self {
            coordinate,
            url,
            state: JobState::Created,
            context,
            request_started: None,
            request: None,
            payload: None,
            payload_from_cache: false,
            tile: None,
            source: None,
            failure: None,
        }
    }

    /// Advances the job as far as possible without waiting and returns the
    /// resulting state.
    ///
    /// Cache lookup and decoding complete within one call; an in-flight
    /// request is only checked for completion or expiry.
    pub fn poll(&mut self) -> JobState {
        loop {
            match self.state {
                JobState::Created => self.lookup_cache(),
                JobState::CacheHit => {
                    self.payload_from_cache = true;
                    self.state = JobState::Decoding;
                }
                JobState::CacheMiss => {
                    self.issue_request();
                    return self.state;
                }
                JobState::Fetching => {
                    self.poll_request();
                    if self.state == JobState::Fetching {
                        return self.state;
                    }
                }
                JobState::Decoding => self.decode_payload(),
                JobState::Succeeded | JobState::Failed | JobState::Cancelled => {
                    return self.state;
                }
            }
        }
    }

    /// Cancels the job, aborting any open request.
    ///
    /// Has no effect on a job that already settled.
    pub fn cancel(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        if let Some(request) = self.request.take() {
            request.abort();
        }
        self.payload = None;
        debug!(tile = %self.coordinate, from = %self.state, "Tile job cancelled");
        self.state = JobState::Cancelled;
    }

    fn lookup_cache(&mut self) {
        match self.context.cache.read(self.coordinate) {
            Some(bytes) => {
                debug!(tile = %self.coordinate, size_bytes = bytes.len(), "Cache hit");
                self.payload = Some(bytes);
                self.state = JobState::CacheHit;
            }
            None => {
                debug!(tile = %self.coordinate, "Cache miss");
                self.state = JobState::CacheMiss;
            }
        }
    }

    fn issue_request(&mut self) {
        debug!(tile = %self.coordinate, url = %self.url, "Requesting tile");
        self.request = Some(self.context.spawn_request(self.url.clone()));
        self.request_started = Some(Instant::now());
        self.state = JobState::Fetching;
    }

    fn poll_request(&mut self) {
        let elapsed = self
            .request_started
            .map(|started| started.elapsed())
            .unwrap_or_default();

        if elapsed > self.context.timeout {
            if let Some(request) = self.request.take() {
                request.abort();
            }
            warn!(
                tile = %self.coordinate,
                elapsed_ms = elapsed.as_millis() as u64,
                "Download time-out, check the network connection"
            );
            self.fail(FetchFailure::Timeout { elapsed });
            return;
        }

        let Some(mut request) = self.request.take() else {
            self.fail(FetchFailure::TaskAborted("no request in flight".to_string()));
            return;
        };

        if !request.is_finished() {
            self.request = Some(request);
            return;
        }

        match (&mut request).now_or_never() {
            None => self.request = Some(request),
            Some(Ok(Ok(bytes))) => {
                debug!(
                    tile = %self.coordinate,
                    size_bytes = bytes.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Tile downloaded"
                );
                self.context
                    .cache
                    .spawn_write(&self.context.runtime, self.coordinate, bytes.clone());
                self.source = Some(TileSource::Network { bytes: bytes.len() });
                self.payload = Some(bytes);
                self.payload_from_cache = false;
                self.state = JobState::Decoding;
            }
            Some(Ok(Err(e))) => {
                warn!(tile = %self.coordinate, url = %self.url, error = %e, "Download failed");
                self.fail(FetchFailure::Network(e));
            }
            Some(Err(join_error)) => {
                warn!(tile = %self.coordinate, error = %join_error, "Request task ended abnormally");
                self.fail(FetchFailure::TaskAborted(join_error.to_string()));
            }
        }
    }

    fn decode_payload(&mut self) {
        let bytes = self.payload.take().unwrap_or_default();
        match decode_tile(self.coordinate, &bytes) {
            Ok(tile) => {
                if self.payload_from_cache {
                    self.source = Some(TileSource::Cache);
                }
                self.tile = Some(tile);
                self.state = JobState::Succeeded;
            }
            Err(e) if self.payload_from_cache => {
                warn!(tile = %self.coordinate, error = %e, "Cached tile is corrupt, fetching again");
                self.payload_from_cache = false;
                self.state = JobState::CacheMiss;
            }
            Err(e) => {
                warn!(tile = %self.coordinate, error = %e, "Downloaded tile could not be decoded");
                self.fail(FetchFailure::Decode(e));
            }
        }
    }

    fn fail(&mut self, failure: FetchFailure) {
        self.payload = None;
        self.failure = Some(failure);
        self.state = JobState::Failed;
    }
}

impl<C> TileFetchJob<C> {
    pub fn coordinate(&self) -> TileCoordinate {
        self.coordinate
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// True once the job reached a terminal state.
    pub fn has_settled(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn succeeded(&self) -> bool {
        self.state == JobState::Succeeded
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        self.failure.as_ref()
    }

    /// Source of the tile bytes, once succeeded.
    pub fn source(&self) -> Option<TileSource> {
        self.source
    }

    /// Moves the decoded tile out of a succeeded job.
    pub fn take_tile(&mut self) -> Option<ElevationTile> {
        self.tile.take()
    }
}

impl<C> Drop for TileFetchJob<C> {
    fn drop(&mut self) {
        if let Some(request) = self.request.take() {
            request.abort();
        }
    }
}
