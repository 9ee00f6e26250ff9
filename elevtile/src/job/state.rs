//! Job states and failure reasons

use crate::provider::ProviderError;
use crate::terrarium::DecodeError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Lifecycle state of a [`TileFetchJob`](super::TileFetchJob).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    /// Not yet polled.
    Created,
    /// Cached bytes found, awaiting decode.
    CacheHit,
    /// No usable cached bytes, request not yet issued.
    CacheMiss,
    /// Network request in flight.
    Fetching,
    /// Payload received, awaiting decode.
    Decoding,
    /// Tile decoded.
    Succeeded,
    /// Permanent failure; see [`FetchFailure`].
    Failed,
    /// Aborted by the owner.
    Cancelled,
}

impl JobState {
    /// Succeeded, Failed and Cancelled are terminal.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::CacheHit => "cache-hit",
            Self::CacheMiss => "cache-miss",
            Self::Fetching => "fetching",
            Self::Decoding => "decoding",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Why a job ended in [`JobState::Failed`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchFailure {
    /// Connection error or non-success HTTP status.
    #[error("network failure: {0}")]
    Network(ProviderError),

    /// The request did not complete within the deadline.
    #[error("download timed out after {} ms", .elapsed.as_millis())]
    Timeout { elapsed: Duration },

    /// The payload is not a usable elevation tile.
    #[error("decode failure: {0}")]
    Decode(#[from] DecodeError),

    /// The background request task ended without a result.
    #[error("request task ended unexpectedly: {0}")]
    TaskAborted(String),
}

impl From<ProviderError> for FetchFailure {
    fn from(e: ProviderError) -> Self {
        FetchFailure::Network(e)
    }
}
