//! Elevation provider access
//!
//! Tiles are requested over HTTP through the [`AsyncHttpClient`] trait so the
//! fetch machinery can be exercised against scripted clients in tests.
//!
//! ```ignore
//! use elevtile::provider::{AsyncHttpClient, AsyncReqwestClient};
//! use std::time::Duration;
//!
//! let client = AsyncReqwestClient::with_connect_timeout(Duration::from_secs(5))?;
//! let png = client.get("https://s3.amazonaws.com/elevation-tiles-prod/terrarium/0/0/0.png").await?;
//! ```

mod http;
mod types;

pub use http::{AsyncHttpClient, AsyncReqwestClient};
pub use types::ProviderError;

#[cfg(test)]
pub use http::tests::{MockAsyncHttpClient, MockResponse};
