//! Torrent search against a torznab aggregator.
//!
//! One search is a single pass: fetch the indexer feed, turn each item into a
//! candidate (following its detail page when the feed has no magnet link),
//! rank by swarm size, filter by keywords and truncate.

use std::sync::Arc;

use futures::future;
use futures::stream::{self, StreamExt};
use plexstuff_core::{IndexerCredential, PlexstuffConfig, ServiceStore};
use url::Url;

use crate::errors::SearchError;
use crate::feed::{parse_feed, parse_pub_date};
use crate::filters::{KeywordFilter, episode_token, title_has_episode};
use crate::magnet::find_magnet_link;
use crate::providers::{HttpFetcher, ReqwestFetcher};
use crate::types::{Candidate, FeedItem, MagnetSource, SearchCategory, SearchQuery};

/// Path of the aggregate torznab endpoint below the Jackett base URL.
pub const TORZNAB_ENDPOINT: &str = "api/v2.0/indexers/all/results/torznab/api";

/// Torrent search service over a Jackett server.
///
/// Credentials are read from the service store on every search, so updating
/// them takes effect without rebuilding the service.
#[derive(Debug, Clone)]
pub struct TorrentSearchService {
    fetcher: Arc<dyn HttpFetcher>,
    store: Arc<dyn ServiceStore>,
    credential_override: Option<IndexerCredential>,
    detail_concurrency: usize,
}

/// A feed item that passed the title checks and still needs its magnet link.
#[derive(Debug)]
struct PendingCandidate {
    raw_title: String,
    seeders: i64,
    leechers: i64,
    size_mib: Option<f64>,
    pub_date: Option<chrono::NaiveDate>,
    source: MagnetSource,
}

impl TorrentSearchService {
    /// Creates a search service using reqwest and the given store.
    ///
    /// # Errors
    /// - `SearchError::Network` - The HTTP client could not be built
    pub fn new(config: &PlexstuffConfig, store: Arc<dyn ServiceStore>) -> Result<Self, SearchError> {
        let fetcher = ReqwestFetcher::new(&config.search)?;
        Ok(Self {
            fetcher: Arc::new(fetcher),
            store,
            credential_override: config.indexer.credential(),
            detail_concurrency: config.search.detail_concurrency.max(1),
        })
    }

    /// Creates a search service over an arbitrary transport.
    pub fn with_fetcher(
        fetcher: Arc<dyn HttpFetcher>,
        store: Arc<dyn ServiceStore>,
        detail_concurrency: usize,
    ) -> Self {
        Self {
            fetcher,
            store,
            credential_override: None,
            detail_concurrency: detail_concurrency.max(1),
        }
    }

    /// Search for books (torznab category 7020).
    ///
    /// # Errors
    /// See [`TorrentSearchService::search`].
    pub async fn search_books(
        &self,
        name: &str,
        max_results: usize,
        keywords: &[String],
    ) -> Result<Vec<Candidate>, SearchError> {
        let query = SearchQuery::new(name, SearchCategory::Books)
            .with_max_results(max_results)
            .with_keywords(keywords.iter().cloned());
        self.search(&query).await
    }

    /// Search for TV episodes or seasons.
    ///
    /// # Errors
    /// See [`TorrentSearchService::search`].
    pub async fn search_tv_shows(
        &self,
        name: &str,
        max_results: usize,
        keywords: &[String],
    ) -> Result<Vec<Candidate>, SearchError> {
        let query = SearchQuery::new(name, SearchCategory::TvShows)
            .with_max_results(max_results)
            .with_keywords(keywords.iter().cloned());
        self.search(&query).await
    }

    /// Search for movies.
    ///
    /// # Errors
    /// See [`TorrentSearchService::search`].
    pub async fn search_movies(
        &self,
        name: &str,
        max_results: usize,
        keywords: &[String],
    ) -> Result<Vec<Candidate>, SearchError> {
        let query = SearchQuery::new(name, SearchCategory::Movies)
            .with_max_results(max_results)
            .with_keywords(keywords.iter().cloned());
        self.search(&query).await
    }

    /// Run a search and return at most `query.max_results` candidates,
    /// best swarm first.
    ///
    /// Items without a title, without the episode token of an episodic
    /// query, or whose magnet link cannot be found are dropped individually.
    ///
    /// # Errors
    /// - `SearchError::InvalidQuery` - Blank name or zero result count
    /// - `SearchError::MissingCredentials` - No Jackett URL and API key stored
    /// - `SearchError::InvalidIndexerUrl` - The stored URL cannot be joined
    /// - `SearchError::Network` - The indexer could not be reached
    /// - `SearchError::ServerUnavailable` - The indexer returned a non-success status
    /// - `SearchError::Parse` - The indexer response is not a feed
    /// - `SearchError::NoResults` - Empty feed, or nothing survived filtering
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, SearchError> {
        validate_query(query)?;

        let credential = self.resolve_credentials()?;
        let base_url = normalized_base_url(&credential.url);
        let endpoint = torznab_endpoint(&base_url)?;

        tracing::info!(
            endpoint = %endpoint,
            query = %query.name,
            category = query.category.code(),
            "Searching indexer"
        );

        let page = self
            .fetcher
            .get(
                &endpoint,
                &[
                    ("apikey", credential.apikey.as_str()),
                    ("q", query.name.as_str()),
                    ("cat", query.category.code()),
                ],
            )
            .await?;

        if !page.is_success() {
            tracing::warn!(status = page.status, url = %base_url, "Indexer rejected search");
            return Err(SearchError::ServerUnavailable {
                url: base_url,
                status: page.status,
            });
        }

        let items = parse_feed(&page.body)?;
        if items.is_empty() {
            return Err(no_results(query));
        }

        let episode = episode_token(&query.name);
        let total_items = items.len();
        let pending: Vec<PendingCandidate> = items
            .into_iter()
            .filter_map(|item| prepare_candidate(item, episode.as_deref()))
            .collect();

        let candidates: Vec<Candidate> = stream::iter(pending)
            .map(|pending| self.resolve_candidate(pending))
            .buffered(self.detail_concurrency)
            .filter_map(future::ready)
            .collect()
            .await;

        tracing::debug!(
            items = total_items,
            resolved = candidates.len(),
            "Resolved magnet links"
        );

        let ranked = rank_candidates(
            candidates,
            &KeywordFilter::from_query(query),
            query.max_results,
        );
        if ranked.is_empty() {
            return Err(no_results(query));
        }

        tracing::info!(results = ranked.len(), query = %query.name, "Search finished");
        Ok(ranked)
    }

    fn resolve_credentials(&self) -> Result<IndexerCredential, SearchError> {
        if let Some(credential) = &self.credential_override {
            return Ok(credential.clone());
        }
        IndexerCredential::load(self.store.as_ref())?.ok_or(SearchError::MissingCredentials)
    }

    async fn resolve_candidate(&self, pending: PendingCandidate) -> Option<Candidate> {
        let link = match &pending.source {
            MagnetSource::Embedded(link) => link.clone(),
            MagnetSource::DetailPage(url) => self.magnet_from_detail_page(url).await?,
            MagnetSource::Unavailable => return None,
        };

        Some(Candidate::new(
            pending.raw_title,
            pending.seeders,
            pending.leechers,
            link,
            pending.size_mib,
            pending.pub_date,
        ))
    }

    async fn magnet_from_detail_page(&self, url: &Url) -> Option<String> {
        let page = match self.fetcher.get(url, &[]).await {
            Ok(page) => page,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Dropping item, detail page unreachable");
                return None;
            }
        };

        if !page.is_success() {
            tracing::debug!(url = %url, status = page.status, "Dropping item, detail page failed");
            return None;
        }

        match find_magnet_link(&page.body) {
            Ok(Some(link)) => Some(link),
            Ok(None) => {
                tracing::debug!(url = %url, "Dropping item, no magnet link on detail page");
                None
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Dropping item, detail page unreadable");
                None
            }
        }
    }
}

/// Sort by seeders + leechers (descending, stable), apply the keyword
/// filter and keep at most `max_results`.
pub fn rank_candidates(
    mut candidates: Vec<Candidate>,
    filter: &KeywordFilter,
    max_results: usize,
) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.peer_score().cmp(&a.peer_score()));
    candidates.retain(|candidate| filter.matches(&candidate.raw_title));
    candidates.truncate(max_results);
    candidates
}

fn validate_query(query: &SearchQuery) -> Result<(), SearchError> {
    if query.name.trim().is_empty() {
        return Err(SearchError::InvalidQuery {
            reason: "search name is empty".to_string(),
        });
    }
    if query.max_results == 0 {
        return Err(SearchError::InvalidQuery {
            reason: "maximum result count must be positive".to_string(),
        });
    }
    Ok(())
}

fn no_results(query: &SearchQuery) -> SearchError {
    SearchError::NoResults {
        noun: query.category.noun(),
        name: query.name.clone(),
    }
}

fn normalized_base_url(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

fn torznab_endpoint(base_url: &str) -> Result<Url, SearchError> {
    let invalid = |reason: String| SearchError::InvalidIndexerUrl {
        url: base_url.to_string(),
        reason,
    };
    let base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", base.scheme())));
    }
    base.join(TORZNAB_ENDPOINT).map_err(|e| invalid(e.to_string()))
}

fn prepare_candidate(item: FeedItem, episode: Option<&str>) -> Option<PendingCandidate> {
    let source = item.magnet_source();
    let size_mib = item.size_mib();
    let raw_title = item.title?;

    if let Some(token) = episode {
        if !title_has_episode(&raw_title, token) {
            return None;
        }
    }

    if source == MagnetSource::Unavailable {
        tracing::debug!(title = %raw_title, "Dropping item without magnet link or detail page");
        return None;
    }

    Some(PendingCandidate {
        raw_title,
        seeders: item.seeders,
        leechers: item.leechers,
        size_mib,
        pub_date: item.pub_date.as_deref().and_then(parse_pub_date),
        source,
    })
}
