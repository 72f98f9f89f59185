//! Mock transport implementation for testing.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use url::Url;

use super::{HttpFetcher, HttpPage};
use crate::errors::SearchError;

/// Mock transport serving canned pages keyed by URL (query string ignored).
///
/// Unknown URLs fail with a network error. Every request is recorded.
#[derive(Debug, Default)]
pub struct MockFetcher {
    pages: HashMap<String, HttpPage>,
    requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl MockFetcher {
    /// Creates a new mock transport with no pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with `status` for `url`.
    pub fn with_page(mut self, url: &str, status: u16, body: impl Into<String>) -> Self {
        self.pages.insert(
            url.to_string(),
            HttpPage {
                status,
                body: body.into(),
            },
        );
        self
    }

    /// URLs requested so far, in order, without query strings.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests.lock().iter().map(|(url, _)| url.clone()).collect()
    }

    /// Query parameters of the first request to `url`.
    pub fn query_for(&self, url: &str) -> Option<Vec<(String, String)>> {
        self.requests
            .lock()
            .iter()
            .find(|(requested, _)| requested == url)
            .map(|(_, query)| query.clone())
    }
}

#[async_trait]
impl HttpFetcher for MockFetcher {
    async fn get(&self, url: &Url, query: &[(&str, &str)]) -> Result<HttpPage, SearchError> {
        let mut key = url.clone();
        key.set_query(None);
        let key = key.to_string();

        self.requests.lock().push((
            key.clone(),
            query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));

        self.pages
            .get(&key)
            .cloned()
            .ok_or_else(|| SearchError::Network {
                reason: format!("connection refused: {key}"),
            })
    }
}
