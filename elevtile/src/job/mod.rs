//! Per-tile acquisition state machine
//!
//! A [`TileFetchJob`] owns the lifecycle of one tile: cache lookup, network
//! request with a deadline, decode and cache write. Jobs never block; the
//! owner advances them with [`TileFetchJob::poll`].
//!
//! ```text
//! Created ─┬─> CacheHit ──> Decoding ──> Succeeded
//!          └─> CacheMiss ─> Fetching ─> Decoding ──> Succeeded
//!                              │            │
//!                              └─> Failed <─┘   (timeout, network, decode)
//!
//! any non-terminal state ──cancel()──> Cancelled
//! ```

mod fetch;
mod state;

pub use fetch::{FetchContext, TileFetchJob, TileSource, DEFAULT_FETCH_TIMEOUT};
pub use state::{FetchFailure, JobState};
