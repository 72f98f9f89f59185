//! Credential lookup through the on-disk service store.

use std::sync::Arc;

use plexstuff_core::{IndexerCredential, JsonFileStore, PlexstuffConfig, ServiceStore};
use plexstuff_search::{SearchError, TorrentSearchService};
use tempfile::TempDir;

use crate::fake_jackett::{APIKEY, FakeJackett, FeedEntry};

fn single_entry() -> Vec<FeedEntry> {
    vec![FeedEntry {
        title: "Dune.epub",
        seeders: 4,
        peers: 1,
        size_bytes: None,
        magnet: Some("magnet:?xt=urn:btih:dune"),
    }]
}

#[tokio::test]
async fn test_missing_credentials() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("services.json");
    let config = PlexstuffConfig::for_testing(path.clone());
    let service = TorrentSearchService::new(&config, Arc::new(JsonFileStore::open(path))).unwrap();

    let err = service.search_books("Dune", 5, &[]).await.unwrap_err();
    assert!(matches!(err, SearchError::MissingCredentials));
    assert_eq!(
        err.to_string(),
        "FAILURE, COULD NOT GET JACKETT SERVER CREDENTIALS"
    );
}

#[tokio::test]
async fn test_credentials_saved_after_service_creation() {
    let jackett = FakeJackett::start(single_entry()).await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("services.json");
    let store = Arc::new(JsonFileStore::open(path.clone()));
    let config = PlexstuffConfig::for_testing(path.clone());
    let service = TorrentSearchService::new(&config, store.clone()).unwrap();

    assert!(service.search_books("Dune", 5, &[]).await.is_err());

    // Written through a second handle, as another process would.
    let other = JsonFileStore::open(path);
    IndexerCredential::new(&jackett.base_url(), APIKEY)
        .unwrap()
        .save(&other)
        .unwrap();

    let results = service.search_books("Dune", 5, &[]).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(store.services().unwrap(), vec!["jackett".to_string()]);
}

#[tokio::test]
async fn test_environment_override_wins_over_store() {
    let jackett = FakeJackett::start(single_entry()).await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("services.json");
    let store = JsonFileStore::open(path.clone());
    IndexerCredential::new("http://127.0.0.1:1", "stale")
        .unwrap()
        .save(&store)
        .unwrap();

    let base_url = jackett.base_url();
    let store_path = path.display().to_string();
    let config = PlexstuffConfig::from_lookup(|key| match key {
        "PLEXSTUFF_JACKETT_URL" => Some(base_url.clone()),
        "PLEXSTUFF_JACKETT_APIKEY" => Some(APIKEY.to_string()),
        "PLEXSTUFF_STORE" => Some(store_path.clone()),
        _ => None,
    });
    assert_eq!(config.storage.store_path, path);

    let service = TorrentSearchService::new(&config, Arc::new(store)).unwrap();
    let results = service.search_books("Dune", 5, &[]).await.unwrap();
    assert_eq!(results[0].link, "magnet:?xt=urn:btih:dune");
}

#[test]
fn test_store_file_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("services.json");

    let store = JsonFileStore::open(path.clone());
    IndexerCredential::new("http://localhost:9117", "secret-key")
        .unwrap()
        .save(&store)
        .unwrap();
    assert!(path.exists());

    let reopened = JsonFileStore::open(path);
    let credential = IndexerCredential::load(&reopened).unwrap().unwrap();
    assert_eq!(credential.url, "http://localhost:9117");
    assert_eq!(credential.apikey, "secret-key");
    assert!(!credential.masked_apikey().contains("secret-key"));
}
