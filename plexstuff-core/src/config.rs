//! Centralized configuration for plexstuff.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::path::PathBuf;
use std::time::Duration;

use crate::credentials::IndexerCredential;

/// Central configuration for all plexstuff components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct PlexstuffConfig {
    pub search: SearchConfig,
    pub storage: StorageConfig,
    pub indexer: IndexerOverrides,
}

/// Torrent search and HTTP behaviour.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Verify TLS certificates of the indexer and detail pages
    pub verify_tls: bool,
    /// User agent for HTTP requests
    pub user_agent: &'static str,
    /// Detail pages fetched at once while resolving magnet links
    pub detail_concurrency: usize,
    /// Per-request timeout (None = client default)
    pub request_timeout: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            verify_tls: true,
            user_agent: "plexstuff/0.1.0",
            detail_concurrency: num_cpus::get().clamp(1, 4),
            request_timeout: None,
        }
    }
}

/// Location of the service configuration store.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// JSON file holding `service -> blob` entries
    pub store_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            store_path: base.join(".config").join("plexstuff").join("services.json"),
        }
    }
}

/// Indexer credentials supplied through the environment.
///
/// Both values must be present for the override to apply.
#[derive(Debug, Clone, Default)]
pub struct IndexerOverrides {
    pub jackett_url: Option<String>,
    pub jackett_apikey: Option<String>,
}

impl IndexerOverrides {
    /// Returns the overriding credential when both parts are set.
    pub fn credential(&self) -> Option<IndexerCredential> {
        match (&self.jackett_url, &self.jackett_apikey) {
            (Some(url), Some(apikey)) => IndexerCredential::new(url, apikey),
            _ => None,
        }
    }
}

impl PlexstuffConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary variable lookup.
    ///
    /// Unparseable values are ignored and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(verify) = lookup("PLEXSTUFF_VERIFY_TLS") {
            if let Ok(value) = verify.parse::<bool>() {
                config.search.verify_tls = value;
            }
        }

        if let Some(concurrency) = lookup("PLEXSTUFF_DETAIL_CONCURRENCY") {
            if let Ok(count) = concurrency.parse::<usize>() {
                config.search.detail_concurrency = count.max(1);
            }
        }

        if let Some(timeout) = lookup("PLEXSTUFF_REQUEST_TIMEOUT") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.search.request_timeout = Some(Duration::from_secs(seconds));
            }
        }

        if let Some(path) = lookup("PLEXSTUFF_STORE") {
            if !path.is_empty() {
                config.storage.store_path = PathBuf::from(path);
            }
        }

        config.indexer.jackett_url = lookup("PLEXSTUFF_JACKETT_URL").filter(|v| !v.is_empty());
        config.indexer.jackett_apikey =
            lookup("PLEXSTUFF_JACKETT_APIKEY").filter(|v| !v.is_empty());

        config
    }

    /// Creates a configuration for tests against local fake servers.
    pub fn for_testing(store_path: PathBuf) -> Self {
        Self {
            search: SearchConfig {
                verify_tls: false,
                detail_concurrency: 2,
                request_timeout: Some(Duration::from_secs(5)),
                ..SearchConfig::default()
            },
            storage: StorageConfig { store_path },
            indexer: IndexerOverrides::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PlexstuffConfig::default();
        assert!(config.search.verify_tls);
        assert!(config.search.detail_concurrency >= 1);
        assert!(config.search.request_timeout.is_none());
        assert!(config.storage.store_path.ends_with("plexstuff/services.json"));
        assert!(config.indexer.credential().is_none());
    }

    #[test]
    fn test_lookup_overrides() {
        let config = PlexstuffConfig::from_lookup(lookup_from(&[
            ("PLEXSTUFF_VERIFY_TLS", "false"),
            ("PLEXSTUFF_DETAIL_CONCURRENCY", "0"),
            ("PLEXSTUFF_REQUEST_TIMEOUT", "12"),
            ("PLEXSTUFF_STORE", "/tmp/store.json"),
        ]));

        assert!(!config.search.verify_tls);
        assert_eq!(config.search.detail_concurrency, 1);
        assert_eq!(config.search.request_timeout, Some(Duration::from_secs(12)));
        assert_eq!(config.storage.store_path, PathBuf::from("/tmp/store.json"));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = PlexstuffConfig::from_lookup(lookup_from(&[
            ("PLEXSTUFF_VERIFY_TLS", "sometimes"),
            ("PLEXSTUFF_REQUEST_TIMEOUT", "soon"),
        ]));

        assert!(config.search.verify_tls);
        assert!(config.search.request_timeout.is_none());
    }

    #[test]
    fn test_indexer_override_needs_both_parts() {
        let only_url =
            PlexstuffConfig::from_lookup(lookup_from(&[("PLEXSTUFF_JACKETT_URL", "http://j:9117")]));
        assert!(only_url.indexer.credential().is_none());

        let both = PlexstuffConfig::from_lookup(lookup_from(&[
            ("PLEXSTUFF_JACKETT_URL", "http://j:9117"),
            ("PLEXSTUFF_JACKETT_APIKEY", "abc"),
        ]));
        let credential = both.indexer.credential().unwrap();
        assert_eq!(credential.url, "http://j:9117");
        assert_eq!(credential.apikey, "abc");
    }
}
