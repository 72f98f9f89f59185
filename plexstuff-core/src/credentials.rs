//! Indexer credentials kept in the service store.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::store::ServiceStore;

/// Service name under which the Jackett credentials live.
pub const JACKETT_SERVICE: &str = "jackett";

/// Base URL and API key of a torznab aggregator (Jackett).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerCredential {
    pub url: String,
    pub apikey: String,
}

impl IndexerCredential {
    /// Builds a credential, rejecting blank parts.
    pub fn new(url: &str, apikey: &str) -> Option<Self> {
        let url = url.trim();
        let apikey = apikey.trim();
        if url.is_empty() || apikey.is_empty() {
            return None;
        }
        Some(Self {
            url: url.to_string(),
            apikey: apikey.to_string(),
        })
    }

    /// Reads the Jackett credentials from `store`.
    ///
    /// A missing entry, or one lacking a non-empty `url` and `apikey`, is `None`.
    ///
    /// # Errors
    /// - `PlexstuffError::Store` - The store itself could not be read
    pub fn load(store: &dyn ServiceStore) -> Result<Option<Self>> {
        let Some(blob) = store.get(JACKETT_SERVICE)? else {
            return Ok(None);
        };

        let url = blob.get("url").and_then(|v| v.as_str()).unwrap_or_default();
        let apikey = blob.get("apikey").and_then(|v| v.as_str()).unwrap_or_default();
        let credential = Self::new(url, apikey);
        if credential.is_none() {
            tracing::warn!("Stored jackett entry lacks a usable url or apikey");
        }
        Ok(credential)
    }

    /// Writes these credentials to `store`, replacing any previous entry.
    ///
    /// # Errors
    /// - `PlexstuffError::Store` - The store could not be written
    /// - `PlexstuffError::Json` - Serialization failed
    pub fn save(&self, store: &dyn ServiceStore) -> Result<()> {
        store.set(JACKETT_SERVICE, serde_json::to_value(self)?)
    }

    /// API key with everything but the last four characters hidden.
    pub fn masked_apikey(&self) -> String {
        let visible: String = self
            .apikey
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        let hidden = self.apikey.chars().count().saturating_sub(4);
        format!("{}{}", "*".repeat(hidden), visible)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_load_missing_entry() {
        let store = MemoryStore::new();
        assert_eq!(IndexerCredential::load(&store).unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let credential = IndexerCredential::new("http://localhost:9117", "secret").unwrap();
        credential.save(&store).unwrap();

        assert_eq!(IndexerCredential::load(&store).unwrap(), Some(credential));
        assert_eq!(
            store.get(JACKETT_SERVICE).unwrap(),
            Some(json!({"url": "http://localhost:9117", "apikey": "secret"}))
        );
    }

    #[test]
    fn test_incomplete_entry_is_none() {
        let store = MemoryStore::new();
        store.set(JACKETT_SERVICE, json!({"url": "http://j"})).unwrap();
        assert_eq!(IndexerCredential::load(&store).unwrap(), None);

        store
            .set(JACKETT_SERVICE, json!({"url": "  ", "apikey": "k"}))
            .unwrap();
        assert_eq!(IndexerCredential::load(&store).unwrap(), None);
    }

    #[test]
    fn test_masked_apikey() {
        let credential = IndexerCredential::new("http://j", "abcdef123456").unwrap();
        assert_eq!(credential.masked_apikey(), "********3456");

        let short = IndexerCredential::new("http://j", "ab").unwrap();
        assert_eq!(short.masked_apikey(), "ab");
    }
}
