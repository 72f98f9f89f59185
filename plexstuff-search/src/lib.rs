//! Plexstuff Search - torrent discovery through a torznab aggregator

#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Queries a Jackett server for candidates matching a free-text name,
//! resolves a magnet link for each, and returns them ranked by swarm size.

pub mod errors;
pub mod feed;
pub mod filters;
pub mod magnet;
pub mod providers;
pub mod service;
pub mod types;

// Re-export main types
pub use errors::SearchError;
pub use filters::KeywordFilter;
pub use providers::{HttpFetcher, HttpPage, ReqwestFetcher};
pub use service::TorrentSearchService;
pub use types::{Candidate, FeedItem, MagnetSource, SearchCategory, SearchQuery};

/// Convenience type alias for Results with SearchError.
pub type Result<T> = std::result::Result<T, SearchError>;
