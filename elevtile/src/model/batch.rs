//! Download batches
//!
//! A [`DownloadBatch`] owns one [`TileFetchJob`] per tile of an area request
//! and is advanced by [`DownloadBatch::step`]. Each step polls the pending
//! jobs in row-major order and stops at the first one that settles, so a
//! single call never blocks and reports progress in units of one tile.
//!
//! At most `max_in_flight` jobs have a request open at any time. Jobs beyond
//! that limit stay in [`JobState::Created`] until a slot frees up, so the
//! request timeout only ever measures a request the provider is serving.
//!
//! The batch is all-or-nothing: the first job that fails cancels every other
//! pending job, and no tiles are handed out.

use super::config::DEFAULT_MAX_CONCURRENT_DOWNLOADS;
use super::error::BatchError;
use super::tiles::TileSet;
use crate::coord::TileCoordinate;
use crate::job::{FetchFailure, JobState, TileFetchJob, TileSource};
use crate::provider::AsyncHttpClient;
use crate::terrarium::ElevationTile;
use crate::tiling::TileRange;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Lifecycle of a batch as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Some jobs are still pending.
    Running,
    /// Every job succeeded.
    Succeeded,
    /// A job failed; the others were cancelled.
    Failed,
    /// The user cancelled the batch.
    Cancelled,
}

impl BatchStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, BatchStatus::Running)
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStatus::Running => write!(f, "running"),
            BatchStatus::Succeeded => write!(f, "succeeded"),
            BatchStatus::Failed => write!(f, "failed"),
            BatchStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Result of one [`DownloadBatch::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Fraction of the batch completed by this step: `1 / total` if a job
    /// settled, otherwise `0`.
    pub progress: f32,
    pub status: BatchStatus,
}

impl StepReport {
    /// True if nothing settled and the caller should idle before stepping again.
    pub fn is_idle(&self) -> bool {
        self.progress == 0.0 && !self.status.is_finished()
    }
}

/// Where the tiles of a batch came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DownloadStats {
    pub cache_hits: usize,
    pub network_fetches: usize,
    pub bytes_downloaded: u64,
}

impl DownloadStats {
    fn record(&mut self, source: Option<TileSource>) {
        match source {
            Some(TileSource::Cache) => self.cache_hits += 1,
            Some(TileSource::Network { bytes }) => {
                self.network_fetches += 1;
                self.bytes_downloaded += bytes as u64;
            }
            None => {}
        }
    }
}

/// The tile jobs for one area request.
pub struct DownloadBatch<C> {
    range: TileRange,
    jobs: Vec<TileFetchJob<C>>,
    pending: Vec<usize>,
    max_in_flight: usize,
    settled: usize,
    tiles: Vec<ElevationTile>,
    status: BatchStatus,
    error: Option<BatchError>,
    stats: DownloadStats,
    started_at: Instant,
}

impl<C> fmt::Debug for DownloadBatch<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadBatch")
            .field("range", &self.range)
            .field("settled", &self.settled)
            .field("total", &self.jobs.len())
            .field("max_in_flight", &self.max_in_flight)
            .field("status", &self.status)
            .finish()
    }
}

impl<C: AsyncHttpClient + 'static> DownloadBatch<C> {
    /// Creates a batch over `jobs`, which must cover `range` in row-major order.
    pub fn new(range: TileRange, jobs: Vec<TileFetchJob<C>>) -> Self {
        let pending = (0..jobs.len()).collect();
        Self {
            range,
            tiles: Vec::with_capacity(jobs.len()),
            jobs,
            pending,
            max_in_flight: DEFAULT_MAX_CONCURRENT_DOWNLOADS,
            settled: 0,
            status: BatchStatus::Running,
            error: None,
            stats: DownloadStats::default(),
            started_at: Instant::now(),
        }
    }

    /// Set how many requests may be open at once. Zero is treated as one.
    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        self.max_in_flight = limit.max(1);
        self
    }

    /// Advances the batch without blocking.
    ///
    /// Network requests make progress on the runtime in the background; a
    /// step only observes them. `cancel` is checked before every job poll.
    pub fn step(&mut self, cancel: &CancellationToken) -> StepReport {
        if self.status.is_finished() {
            return self.report(0.0);
        }

        let mut in_flight = self.in_flight();
        let mut index = 0;
        while index < self.pending.len() {
            if cancel.is_cancelled() {
                self.abort(BatchStatus::Cancelled, BatchError::Cancelled);
                return self.report(0.0);
            }

            let job_index = self.pending[index];
            let before = self.jobs[job_index].state();
            if before == JobState::Created && in_flight >= self.max_in_flight {
                index += 1;
                continue;
            }

            let state = self.jobs[job_index].poll();
            if state == JobState::Fetching && before != JobState::Fetching {
                in_flight += 1;
            }
            if !state.is_terminal() {
                index += 1;
                continue;
            }

            self.pending.remove(index);
            self.settled += 1;
            self.settle(job_index, state);
            return self.report(self.unit());
        }

        self.report(0.0)
    }

    fn settle(&mut self, job_index: usize, state: JobState) {
        let job = &mut self.jobs[job_index];
        match state {
            JobState::Succeeded => {
                self.stats.record(job.source());
                if let Some(tile) = job.take_tile() {
                    self.tiles.push(tile);
                }
                if self.pending.is_empty() {
                    self.status = BatchStatus::Succeeded;
                    self.log_finished();
                }
            }
            _ => {
                let tile = job.coordinate();
                let reason = job
                    .failure()
                    .cloned()
                    .unwrap_or_else(|| FetchFailure::TaskAborted(format!("job {}", state)));
                warn!(tile = %tile, error = %reason, "Tile failed, cancelling batch");
                self.abort(BatchStatus::Failed, BatchError::Failed { tile, reason });
            }
        }
    }

    fn abort(&mut self, status: BatchStatus, error: BatchError) {
        for index in self.pending.drain(..) {
            self.jobs[index].cancel();
        }
        self.settled = self.jobs.len();
        self.tiles.clear();
        self.status = status;
        self.error = Some(error);
        self.log_finished();
    }

    fn log_finished(&self) {
        info!(
            status = %self.status,
            tiles = self.jobs.len(),
            cache_hits = self.stats.cache_hits,
            network_fetches = self.stats.network_fetches,
            bytes = self.stats.bytes_downloaded,
            elapsed_ms = self.started_at.elapsed().as_millis() as u64,
            "Elevation batch finished"
        );
    }

    fn unit(&self) -> f32 {
        1.0 / self.jobs.len() as f32
    }

    fn report(&self, progress: f32) -> StepReport {
        StepReport {
            progress,
            status: self.status,
        }
    }
}

impl<C> DownloadBatch<C> {
    /// Tile rectangle covered by the batch.
    pub fn range(&self) -> TileRange {
        self.range
    }

    pub fn total(&self) -> usize {
        self.jobs.len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Number of jobs with a request currently open.
    pub fn in_flight(&self) -> usize {
        self.pending
            .iter()
            .filter(|&&index| self.jobs[index].state() == JobState::Fetching)
            .count()
    }

    /// Number of jobs in a terminal state.
    pub fn settled(&self) -> usize {
        self.settled
    }

    /// Settled fraction in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        if self.jobs.is_empty() {
            return 1.0;
        }
        self.settled as f32 / self.jobs.len() as f32
    }

    pub fn is_complete(&self) -> bool {
        self.settled == self.jobs.len()
    }

    pub fn succeeded_all(&self) -> bool {
        self.jobs.iter().all(|job| job.succeeded())
    }

    pub fn status(&self) -> BatchStatus {
        self.status
    }

    pub fn error(&self) -> Option<&BatchError> {
        self.error.as_ref()
    }

    pub fn stats(&self) -> DownloadStats {
        self.stats
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Coordinates and states of all jobs in poll order.
    pub fn job_states(&self) -> impl Iterator<Item = (TileCoordinate, JobState)> + '_ {
        self.jobs.iter().map(|job| (job.coordinate(), job.state()))
    }

    /// Consumes a finished batch and returns its tiles.
    ///
    /// # Errors
    ///
    /// Returns the batch failure, [`BatchError::Cancelled`], or
    /// [`BatchError::Incomplete`] if jobs are still pending.
    pub fn into_tile_set(mut self) -> Result<TileSet, BatchError> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        if !self.is_complete() {
            return Err(BatchError::Incomplete {
                settled: self.settled,
                total: self.jobs.len(),
            });
        }
        TileSet::new(self.range, std::mem::take(&mut self.tiles))
    }
}
