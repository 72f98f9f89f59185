//! Search service against the fake Jackett server over real HTTP.

use std::path::Path;
use std::sync::Arc;

use axum::http::StatusCode;
use plexstuff_core::{IndexerCredential, JsonFileStore, PlexstuffConfig};
use plexstuff_search::{SearchCategory, SearchError, SearchQuery, TorrentSearchService};
use tempfile::TempDir;

use crate::fake_jackett::{APIKEY, FakeJackett, FeedEntry};

fn entry(title: &'static str, seeders: i64, peers: i64, magnet: Option<&'static str>) -> FeedEntry {
    FeedEntry {
        title,
        seeders,
        peers,
        size_bytes: None,
        magnet,
    }
}

/// Service whose store holds credentials for `base_url`.
fn service_for(dir: &Path, base_url: &str, apikey: &str) -> TorrentSearchService {
    let path = dir.join("services.json");
    let store = JsonFileStore::open(path.clone());
    IndexerCredential::new(base_url, apikey)
        .unwrap()
        .save(&store)
        .unwrap();
    let config = PlexstuffConfig::for_testing(path);
    TorrentSearchService::new(&config, Arc::new(store)).unwrap()
}

#[tokio::test]
async fn test_books_search_ranks_and_resolves_magnets() {
    let jackett = FakeJackett::start(vec![
        FeedEntry {
            size_bytes: Some(2_097_152),
            ..entry("Dune.epub", 50, 5, Some("magnet:?xt=urn:btih:AAA&dn=Dune"))
        },
        // id 1: detail page with two magnets
        entry("Dune Messiah.epub", 10, 1, None),
        // id 2: detail page answers 404
        entry("Children of Dune.epub", 100, 9, None),
        entry("Dune audiobook", 1, 0, Some("magnet:?xt=urn:btih:CCC")),
    ])
    .await;
    let dir = TempDir::new().unwrap();
    let service = service_for(dir.path(), &jackett.base_url(), APIKEY);

    let results = service.search_books("Dune", 10, &[]).await.unwrap();

    let titles: Vec<&str> = results.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Dune.epub (2.0 MiB)", "Dune Messiah.epub", "Dune audiobook"]
    );
    assert_eq!(results[0].link, "magnet:?xt=urn:btih:AAA&dn=Dune");
    assert_eq!(results[0].info_hash().as_deref(), Some("aaa"));
    assert_eq!(results[1].link, "magnet:?xt=urn:btih:b1");
    assert_eq!(results[1].peer_score(), 11);
    assert!(results.iter().all(|c| c.pub_date.is_some()));

    let searches = jackett.searches();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].get("q").map(String::as_str), Some("Dune"));
    assert_eq!(searches[0].get("cat").map(String::as_str), Some("7020"));
    assert_eq!(searches[0].get("apikey").map(String::as_str), Some(APIKEY));
}

#[tokio::test]
async fn test_trailing_slash_base_url() {
    let jackett = FakeJackett::start(vec![entry("Heat 1995", 3, 3, Some("magnet:?xt=urn:btih:h"))]).await;
    let dir = TempDir::new().unwrap();
    let base_url = format!("{}/", jackett.base_url());
    let service = service_for(dir.path(), &base_url, APIKEY);

    let results = service.search_movies("Heat", 5, &[]).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(
        jackett.searches()[0].get("cat").map(String::as_str),
        Some("2000")
    );
}

#[tokio::test]
async fn test_tv_episode_guard() {
    let jackett = FakeJackett::start(vec![
        entry("Show S01E03 1080p", 90, 9, Some("magnet:?xt=urn:btih:e3")),
        entry("Show.S01E02.720p", 10, 2, Some("magnet:?xt=urn:btih:e2a")),
        entry("Show S01 Complete", 80, 8, Some("magnet:?xt=urn:btih:s1")),
        entry("show s01e02 1080p", 20, 2, Some("magnet:?xt=urn:btih:e2b")),
    ])
    .await;
    let dir = TempDir::new().unwrap();
    let service = service_for(dir.path(), &jackett.base_url(), APIKEY);

    let results = service.search_tv_shows("Show S01E02", 10, &[]).await.unwrap();

    let links: Vec<&str> = results.iter().map(|c| c.link.as_str()).collect();
    assert_eq!(links, vec!["magnet:?xt=urn:btih:e2b", "magnet:?xt=urn:btih:e2a"]);
    assert_eq!(
        jackett.searches()[0].get("cat").map(String::as_str),
        Some("5000")
    );
}

#[tokio::test]
async fn test_keyword_filters_and_truncation() {
    let jackett = FakeJackett::start(vec![
        entry("Arrival 2016 1080p x265", 40, 4, Some("magnet:?xt=urn:btih:1")),
        entry("Arrival 2016 720p", 30, 3, Some("magnet:?xt=urn:btih:2")),
        entry("Arrival 2016 1080p CAM", 99, 9, Some("magnet:?xt=urn:btih:3")),
        entry("Arrival 2016 1080p x264", 20, 2, Some("magnet:?xt=urn:btih:4")),
        entry("Arrival 2016 2160p x265", 10, 1, Some("magnet:?xt=urn:btih:5")),
    ])
    .await;
    let dir = TempDir::new().unwrap();
    let service = service_for(dir.path(), &jackett.base_url(), APIKEY);

    let query = SearchQuery::new("Arrival 2016", SearchCategory::Movies)
        .with_max_results(2)
        .with_keywords(["1080p", "2160p"])
        .with_excluded(["cam"])
        .with_required(["x265"]);
    let results = service.search(&query).await.unwrap();

    let titles: Vec<&str> = results.iter().map(|c| c.raw_title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Arrival 2016 1080p x265", "Arrival 2016 2160p x265"]
    );
}

#[tokio::test]
async fn test_empty_feed_reports_no_results() {
    let jackett = FakeJackett::start(Vec::new()).await;
    let dir = TempDir::new().unwrap();
    let service = service_for(dir.path(), &jackett.base_url(), APIKEY);

    let err = service.search_movies("Nothing Here", 5, &[]).await.unwrap_err();
    assert!(matches!(err, SearchError::NoResults { .. }));
    assert_eq!(
        err.to_string(),
        "FAILURE, NO MOVIES SATISFYING CRITERIA FOR GETTING Nothing Here"
    );
}

#[tokio::test]
async fn test_all_items_dropped_reports_no_results() {
    // The only item needs its detail page, and id 0 answers 404.
    let jackett = FakeJackett::start(vec![entry("Gone", 5, 5, None)]).await;
    let dir = TempDir::new().unwrap();
    let service = service_for(dir.path(), &jackett.base_url(), APIKEY);

    let err = service.search_books("Gone", 5, &[]).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "FAILURE, NO BOOKS SATISFYING CRITERIA FOR GETTING Gone"
    );
}

#[tokio::test]
async fn test_server_error_status() {
    let jackett = FakeJackett::start_with_status(Vec::new(), StatusCode::SERVICE_UNAVAILABLE).await;
    let dir = TempDir::new().unwrap();
    let service = service_for(dir.path(), &jackett.base_url(), APIKEY);

    let err = service.search_books("Dune", 5, &[]).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        format!(
            "FAILURE, PROBLEM WITH JACKETT SERVER ACCESSIBLE AT {}/.",
            jackett.base_url()
        )
    );
}

#[tokio::test]
async fn test_wrong_apikey_is_server_problem() {
    let jackett = FakeJackett::start(vec![entry("Dune", 1, 1, Some("magnet:?xt=urn:btih:d"))]).await;
    let dir = TempDir::new().unwrap();
    let service = service_for(dir.path(), &jackett.base_url(), "not-the-key");

    let err = service.search_books("Dune", 5, &[]).await.unwrap_err();
    assert!(matches!(
        err,
        SearchError::ServerUnavailable { status: 401, .. }
    ));
}

#[tokio::test]
async fn test_unreachable_server() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let dir = TempDir::new().unwrap();
    let service = service_for(dir.path(), &format!("http://{address}"), APIKEY);

    let err = service.search_books("Dune", 5, &[]).await.unwrap_err();
    assert!(matches!(err, SearchError::Network { .. }));
    assert!(!err.to_string().contains(APIKEY));
}
