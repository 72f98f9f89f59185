//! Error types for torrent search functionality.
//!
//! The `Display` text of each variant is the message shown to the user, so
//! callers can report any failure with `to_string()`.

use thiserror::Error;

/// Errors that end a search without results.
#[derive(Debug, Error)]
pub enum SearchError {
    /// No usable indexer base URL and API key were found.
    #[error("FAILURE, COULD NOT GET JACKETT SERVER CREDENTIALS")]
    MissingCredentials,

    /// The stored indexer base URL cannot be used.
    #[error("FAILURE, INVALID JACKETT SERVER URL {url}: {reason}")]
    InvalidIndexerUrl {
        /// The configured base URL
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// The indexer answered the search request with a non-success status.
    #[error("FAILURE, PROBLEM WITH JACKETT SERVER ACCESSIBLE AT {url}.")]
    ServerUnavailable {
        /// Base URL of the indexer
        url: String,
        /// HTTP status code returned
        status: u16,
    },

    /// The feed was empty or nothing survived filtering.
    #[error("FAILURE, NO {noun} SATISFYING CRITERIA FOR GETTING {name}")]
    NoResults {
        /// Category noun, e.g. `BOOKS`
        noun: &'static str,
        /// The searched name
        name: String,
    },

    /// The search request never produced a response.
    #[error("FAILURE, NETWORK ERROR: {reason}")]
    Network {
        /// The reason for the network error
        reason: String,
    },

    /// The indexer response could not be parsed as a feed.
    #[error("FAILURE, COULD NOT PARSE INDEXER RESPONSE: {reason}")]
    Parse {
        /// The reason for the parse error
        reason: String,
    },

    /// The query itself cannot be searched.
    #[error("FAILURE, INVALID SEARCH: {reason}")]
    InvalidQuery {
        /// What is wrong with the query
        reason: String,
    },

    /// The service store holding the credentials failed.
    #[error("FAILURE, COULD NOT READ SETTINGS: {0}")]
    Store(#[from] plexstuff_core::PlexstuffError),
}

impl SearchError {
    /// Checks if this error is caused by the query rather than the environment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            SearchError::InvalidQuery { .. } | SearchError::NoResults { .. }
        )
    }
}
