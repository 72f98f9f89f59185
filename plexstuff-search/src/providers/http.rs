//! reqwest-backed transport for production use.

use async_trait::async_trait;
use plexstuff_core::config::SearchConfig;
use url::Url;

use super::{HttpFetcher, HttpPage};
use crate::errors::SearchError;

/// Fetches pages with a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Build a client honouring the TLS toggle, user agent and timeout.
    ///
    /// # Errors
    /// - `SearchError::Network` - The TLS backend could not be initialised
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .danger_accept_invalid_certs(!config.verify_tls);

        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| SearchError::Network {
            reason: format!("cannot build HTTP client: {e}"),
        })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(&self, url: &Url, query: &[(&str, &str)]) -> Result<HttpPage, SearchError> {
        let response = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| SearchError::Network {
                reason: format!(
                    "request to {} failed: {}",
                    url_without_query(url),
                    e.without_url()
                ),
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| SearchError::Network {
            reason: format!(
                "reading body from {} failed: {}",
                url_without_query(url),
                e.without_url()
            ),
        })?;

        tracing::trace!(url = %url_without_query(url), status, bytes = body.len(), "Fetched page");
        Ok(HttpPage { status, body })
    }
}

/// URL for log and error output; query strings may carry the API key.
fn url_without_query(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_without_query_hides_apikey() {
        let url = Url::parse("http://localhost:9117/api?apikey=secret&q=dune").unwrap();
        assert_eq!(url_without_query(&url), "http://localhost:9117/api");
    }

    #[test]
    fn test_builds_with_defaults() {
        assert!(ReqwestFetcher::new(&SearchConfig::default()).is_ok());
    }
}
