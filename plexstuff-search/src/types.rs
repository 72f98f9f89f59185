//! Data types for torrent search functionality.

use chrono::NaiveDate;
use plexstuff_core::format::format_size_suffix;
use serde::{Deserialize, Serialize};
use url::Url;

/// Seeder or leecher count reported when the feed omits it.
///
/// Real counts are never negative, so unknown entries rank below any known one.
pub const UNKNOWN_PEER_COUNT: i64 = -1;

/// Torznab category searched by a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchCategory {
    Books,
    TvShows,
    Movies,
}

impl SearchCategory {
    /// Torznab `cat` parameter value.
    pub fn code(self) -> &'static str {
        match self {
            SearchCategory::Books => "7020",
            SearchCategory::TvShows => "5000",
            SearchCategory::Movies => "2000",
        }
    }

    /// Noun used in "no results" messages.
    pub fn noun(self) -> &'static str {
        match self {
            SearchCategory::Books => "BOOKS",
            SearchCategory::TvShows => "TV SHOWS",
            SearchCategory::Movies => "MOVIES",
        }
    }
}

/// A free-text search with optional keyword filters.
///
/// The keyword filters only take effect when `keywords` is non-empty:
/// `excluded` and `required` refine an include list, they are not used alone.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub name: String,
    pub category: SearchCategory,
    pub max_results: usize,
    /// Title must contain at least one of these
    pub keywords: Vec<String>,
    /// Title must contain none of these
    pub excluded: Vec<String>,
    /// Title must contain all of these
    pub required: Vec<String>,
}

impl SearchQuery {
    /// Default number of results returned.
    pub const DEFAULT_MAX_RESULTS: usize = 10;

    /// Smallest result count callers are expected to ask for.
    pub const MIN_MAX_RESULTS: usize = 5;

    pub fn new(name: impl Into<String>, category: SearchCategory) -> Self {
        Self {
            name: name.into(),
            category,
            max_results: Self::DEFAULT_MAX_RESULTS,
            keywords: Vec::new(),
            excluded: Vec::new(),
            required: Vec::new(),
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_excluded<I, S>(mut self, excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded = excluded.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_required<I, S>(mut self, required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = required.into_iter().map(Into::into).collect();
        self
    }
}

/// One `<item>` of a torznab feed, as read from the XML.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedItem {
    pub title: Option<String>,
    pub size_bytes: Option<u64>,
    pub seeders: i64,
    pub leechers: i64,
    pub pub_date: Option<String>,
    /// Value of `torznab:attr name="magneturl"`
    pub magnet_url: Option<String>,
    pub guid: Option<String>,
}

impl FeedItem {
    /// Creates an empty item with unknown peer counts.
    pub fn new() -> Self {
        Self {
            seeders: UNKNOWN_PEER_COUNT,
            leechers: UNKNOWN_PEER_COUNT,
            ..Self::default()
        }
    }

    /// Size converted to MiB.
    pub fn size_mib(&self) -> Option<f64> {
        self.size_bytes.map(|bytes| bytes as f64 / (1024.0 * 1024.0))
    }

    /// Where the magnet URI for this item has to come from.
    pub fn magnet_source(&self) -> MagnetSource {
        if let Some(link) = self.magnet_url.as_deref() {
            if link.contains("magnet") {
                return MagnetSource::Embedded(link.to_string());
            }
        }

        self.guid
            .as_deref()
            .and_then(|guid| Url::parse(guid.trim()).ok())
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .map_or(MagnetSource::Unavailable, MagnetSource::DetailPage)
    }
}

/// How a feed item's magnet URI is obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum MagnetSource {
    /// The feed carries the magnet URI directly.
    Embedded(String),
    /// The magnet URI has to be scraped from this page.
    DetailPage(Url),
    /// Neither is available; the item is dropped.
    Unavailable,
}

/// A ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Raw title with a `(N.N MiB)` / `(N.N GiB)` suffix when the size is known
    pub title: String,
    pub raw_title: String,
    pub seeders: i64,
    pub leechers: i64,
    /// Magnet URI
    pub link: String,
    pub size_mib: Option<f64>,
    pub pub_date: Option<NaiveDate>,
}

impl Candidate {
    pub fn new(
        raw_title: String,
        seeders: i64,
        leechers: i64,
        link: String,
        size_mib: Option<f64>,
        pub_date: Option<NaiveDate>,
    ) -> Self {
        let title = match size_mib {
            Some(mib) => format!("{raw_title} {}", format_size_suffix(mib)),
            None => raw_title.clone(),
        };
        Self {
            title,
            raw_title,
            seeders,
            leechers,
            link,
            size_mib,
            pub_date,
        }
    }

    /// Ranking key: seeders plus leechers, saturating at `i64::MAX`.
    pub fn peer_score(&self) -> i64 {
        self.seeders.saturating_add(self.leechers)
    }

    /// BitTorrent info hash from the `xt=urn:btih:` parameter, lower-cased.
    pub fn info_hash(&self) -> Option<String> {
        let (_, query) = self.link.split_once('?')?;
        query
            .split('&')
            .find_map(|param| param.strip_prefix("xt=urn:btih:"))
            .filter(|hash| !hash.is_empty())
            .map(str::to_lowercase)
    }

    /// Display name (`dn`) carried by the magnet URI, if it parses.
    pub fn display_name(&self) -> Option<String> {
        let magnet = magnet_url::Magnet::new(&self.link).ok()?;
        magnet.display_name().map(|s| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_codes() {
        assert_eq!(SearchCategory::Books.code(), "7020");
        assert_eq!(SearchCategory::TvShows.code(), "5000");
        assert_eq!(SearchCategory::Movies.noun(), "MOVIES");
    }

    #[test]
    fn test_candidate_title_suffix() {
        let small = Candidate::new(
            "Dune.epub".to_string(),
            3,
            1,
            "magnet:?xt=urn:btih:ABC".to_string(),
            Some(2.5),
            None,
        );
        assert_eq!(small.title, "Dune.epub (2.5 MiB)");
        assert_eq!(small.peer_score(), 4);

        let big = Candidate::new(
            "Show.S01E01".to_string(),
            -1,
            -1,
            "magnet:?xt=urn:btih:ABC".to_string(),
            Some(3072.0),
            None,
        );
        assert_eq!(big.title, "Show.S01E01 (3.0 GiB)");
        assert_eq!(big.peer_score(), -2);

        let no_size = Candidate::new(
            "Plain".to_string(),
            0,
            0,
            "magnet:?xt=urn:btih:ABC".to_string(),
            None,
            None,
        );
        assert_eq!(no_size.title, "Plain");
    }

    #[test]
    fn test_info_hash() {
        let candidate = Candidate::new(
            "x".to_string(),
            0,
            0,
            "magnet:?dn=x&xt=urn:btih:C12FE1C06BBA254A9DC9F519B335AA7C1367A88A&tr=udp%3A%2F%2Ft"
                .to_string(),
            None,
            None,
        );
        assert_eq!(
            candidate.info_hash().as_deref(),
            Some("c12fe1c06bba254a9dc9f519b335aa7c1367a88a")
        );

        let opaque = Candidate::new("x".to_string(), 0, 0, "magnet:z".to_string(), None, None);
        assert_eq!(opaque.info_hash(), None);
    }

    #[test]
    fn test_display_name() {
        let named = Candidate::new(
            "Dune.Messiah.1969.epub".to_string(),
            5,
            2,
            "magnet:?xt=urn:btih:c12fe1c06bba254a9dc9f519b335aa7c1367a88a&dn=Dune".to_string(),
            None,
            None,
        );
        assert_eq!(named.display_name().as_deref(), Some("Dune"));

        let unnamed = Candidate::new(
            "x".to_string(),
            0,
            0,
            "magnet:?xt=urn:btih:c12fe1c06bba254a9dc9f519b335aa7c1367a88a".to_string(),
            None,
            None,
        );
        assert_eq!(unnamed.display_name(), None);
    }

    #[test]
    fn test_magnet_source() {
        let mut item = FeedItem::new();
        item.magnet_url = Some("magnet:?xt=urn:btih:abc".to_string());
        item.guid = Some("https://tracker.example/details/1".to_string());
        assert_eq!(
            item.magnet_source(),
            MagnetSource::Embedded("magnet:?xt=urn:btih:abc".to_string())
        );

        item.magnet_url = Some("https://jackett.local/dl/1.torrent".to_string());
        assert!(matches!(item.magnet_source(), MagnetSource::DetailPage(_)));

        item.guid = Some("not a url".to_string());
        assert_eq!(item.magnet_source(), MagnetSource::Unavailable);

        item.guid = Some("ftp://tracker.example/1".to_string());
        assert_eq!(item.magnet_source(), MagnetSource::Unavailable);
    }

    #[test]
    fn test_size_mib() {
        let mut item = FeedItem::new();
        assert_eq!(item.size_mib(), None);
        item.size_bytes = Some(3 * 1024 * 1024);
        assert_eq!(item.size_mib(), Some(3.0));
        assert_eq!(item.seeders, UNKNOWN_PEER_COUNT);
    }
}
