//! HTTP client abstraction for testability

use super::types::ProviderError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Trait for non-blocking HTTP GET requests.
///
/// The returned future must be `Send` so it can be spawned onto a Tokio
/// runtime and polled from a different thread than the one that issued it.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response body as bytes or an error.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;
}

/// Real HTTP client implementation using async reqwest.
///
/// No overall request timeout is configured here: the tile fetch job owns the
/// deadline and aborts the request itself.
#[derive(Debug, Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a new client with the given connect timeout.
    pub fn with_connect_timeout(connect_timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(concat!("elevtile/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        trace!(url = url, "HTTP GET request starting");

        let response = match self.client.get(url).send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(ProviderError::HttpError(format!("Request failed: {}", e)));
            }
        };

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| ProviderError::HttpError(format!("Failed to read response: {}", e)))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Semaphore;

    /// Scripted outcome of one mocked request.
    #[derive(Debug, Clone)]
    pub enum MockResponse {
        /// Answer immediately with a body
        Body(Vec<u8>),
        /// Answer after a delay
        Delayed(Duration, Vec<u8>),
        /// Fail immediately
        Error(ProviderError),
        /// Never answer
        Hang,
    }

    /// Mock HTTP client answering per URL, with a fallback for unknown URLs.
    pub struct MockAsyncHttpClient {
        responses: Mutex<HashMap<String, MockResponse>>,
        fallback: MockResponse,
        requests: AtomicUsize,
        active: AtomicUsize,
        peak: AtomicUsize,
        capacity: Option<Semaphore>,
    }

    /// Decrements the active request gauge when a request ends or is aborted.
    struct ActiveRequest<'a>(&'a AtomicUsize);

    impl Drop for ActiveRequest<'_> {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl MockAsyncHttpClient {
        pub fn new(fallback: MockResponse) -> Self {
            Self {
                responses: Mutex::new(HashMap::new()),
                fallback,
                requests: AtomicUsize::new(0),
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                capacity: None,
            }
        }

        /// Serve at most `permits` requests at a time; the rest queue.
        pub fn with_capacity(mut self, permits: usize) -> Self {
            self.capacity = Some(Semaphore::new(permits));
            self
        }

        pub fn with_response(self, url: impl Into<String>, response: MockResponse) -> Self {
            self.responses.lock().unwrap().insert(url.into(), response);
            self
        }

        /// Number of GET requests issued so far.
        pub fn request_count(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }

        /// Highest number of requests that were open at the same time.
        pub fn peak_concurrency(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }
    }

    impl AsyncHttpClient for MockAsyncHttpClient {
        async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let open = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(open, Ordering::SeqCst);
            let _active = ActiveRequest(&self.active);

            let _permit = match &self.capacity {
                Some(capacity) => capacity.acquire().await.ok(),
                None => None,
            };

            let response = self
                .responses
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .unwrap_or_else(|| self.fallback.clone());

            match response {
                MockResponse::Body(bytes) => Ok(bytes),
                MockResponse::Delayed(delay, bytes) => {
                    tokio::time::sleep(delay).await;
                    Ok(bytes)
                }
                MockResponse::Error(e) => Err(e),
                MockResponse::Hang => std::future::pending().await,
            }
        }
    }

    #[tokio::test]
    async fn test_mock_client_success() {
        let mock = MockAsyncHttpClient::new(MockResponse::Body(vec![1, 2, 3, 4]));

        let result = mock.get("http://example.com").await;
        assert_eq!(result.unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_client_per_url() {
        let mock = MockAsyncHttpClient::new(MockResponse::Body(vec![0]))
            .with_response(
                "http://bad",
                MockResponse::Error(ProviderError::HttpError("Test error".to_string())),
            );

        assert!(mock.get("http://bad").await.is_err());
        assert!(mock.get("http://good").await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_client_tracks_peak_concurrency() {
        let mock = MockAsyncHttpClient::new(MockResponse::Delayed(
            Duration::from_millis(20),
            vec![1],
        ));

        let (a, b) = tokio::join!(mock.get("http://a"), mock.get("http://b"));
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(mock.peak_concurrency(), 2);

        mock.get("http://c").await.unwrap();
        assert_eq!(mock.peak_concurrency(), 2);
    }

    #[test]
    fn test_status_error_display() {
        let err = ProviderError::Status {
            status: 404,
            url: "http://tiles/1/2/3.png".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404 from http://tiles/1/2/3.png");
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(AsyncReqwestClient::with_connect_timeout(Duration::from_secs(5)).is_ok());
    }
}
