//! HTTP transports used by the search service.

use async_trait::async_trait;
use url::Url;

use crate::errors::SearchError;

pub mod http;
#[cfg(test)]
pub mod mock;

pub use http::ReqwestFetcher;
#[cfg(test)]
pub use mock::MockFetcher;

/// Status and body of a fetched page.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpPage {
    pub status: u16,
    pub body: String,
}

impl HttpPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for fetching indexer feeds and tracker pages.
///
/// Implementations provide plain GET requests through different backends
/// (reqwest for production, canned pages for testing).
#[async_trait]
pub trait HttpFetcher: Send + Sync + std::fmt::Debug {
    /// GET `url` with the given query parameters appended.
    ///
    /// A non-success status is not an error; it is returned in the page.
    ///
    /// # Errors
    /// - `SearchError::Network` - No response was received
    async fn get(&self, url: &Url, query: &[(&str, &str)]) -> Result<HttpPage, SearchError>;
}
