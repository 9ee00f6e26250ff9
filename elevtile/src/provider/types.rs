//! Provider types

use std::fmt;

/// Errors that can occur while requesting tiles from the elevation provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// HTTP request failed before a response arrived
    HttpError(String),
    /// Provider answered with a non-success status
    Status { status: u16, url: String },
    /// HTTP client could not be constructed
    ClientBuild(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::Status { status, url } => write!(f, "HTTP {} from {}", status, url),
            ProviderError::ClientBuild(msg) => write!(f, "Failed to create HTTP client: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}
