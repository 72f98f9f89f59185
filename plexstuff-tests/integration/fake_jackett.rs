//! Minimal Jackett stand-in serving a torznab feed and detail pages.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use parking_lot::Mutex;

pub const APIKEY: &str = "integration-key";

/// One `<item>` of the served feed.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub title: &'static str,
    pub seeders: i64,
    pub peers: i64,
    pub size_bytes: Option<u64>,
    /// Embedded magnet; `None` points the item at a detail page instead
    pub magnet: Option<&'static str>,
}

#[derive(Debug)]
struct FakeState {
    address: SocketAddr,
    entries: Vec<FeedEntry>,
    search_status: StatusCode,
    searches: Mutex<Vec<HashMap<String, String>>>,
}

/// Handle to a running fake server.
#[derive(Debug, Clone)]
pub struct FakeJackett {
    state: Arc<FakeState>,
}

impl FakeJackett {
    pub async fn start(entries: Vec<FeedEntry>) -> Self {
        Self::start_with_status(entries, StatusCode::OK).await
    }

    pub async fn start_with_status(entries: Vec<FeedEntry>, search_status: StatusCode) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake jackett");
        let address = listener.local_addr().expect("local address");

        let state = Arc::new(FakeState {
            address,
            entries,
            search_status,
            searches: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route(
                "/api/v2.0/indexers/all/results/torznab/api",
                get(torznab_search),
            )
            .route("/details/{id}", get(detail_page))
            .with_state(state.clone());

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("fake jackett stopped: {e}");
            }
        });

        Self { state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.state.address)
    }

    /// Query parameters of every search request received so far.
    pub fn searches(&self) -> Vec<HashMap<String, String>> {
        self.state.searches.lock().clone()
    }
}

async fn torznab_search(
    State(state): State<Arc<FakeState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.searches.lock().push(params.clone());

    if state.search_status != StatusCode::OK {
        return (state.search_status, "indexer down").into_response();
    }
    if params.get("apikey").map(String::as_str) != Some(APIKEY) {
        return (StatusCode::UNAUTHORIZED, "bad apikey").into_response();
    }

    let body = render_feed(&state);
    ([("content-type", "application/rss+xml")], body).into_response()
}

async fn detail_page(Path(id): Path<usize>) -> Response {
    // Odd ids have a detail page with two magnets; even ids are gone.
    if id % 2 == 0 {
        return (StatusCode::NOT_FOUND, "removed").into_response();
    }
    Html(format!(
        r#"<html><body>
            <a href="/download/{id}.torrent">torrent</a>
            <a href="magnet:?xt=urn:btih:a{id}">mirror</a>
            <a href="magnet:?xt=urn:btih:b{id}">magnet</a>
        </body></html>"#
    ))
    .into_response()
}

fn render_feed(state: &FakeState) -> String {
    let mut items = String::new();
    for (id, entry) in state.entries.iter().enumerate() {
        items.push_str("<item>\n");
        items.push_str(&format!("<title>{}</title>\n", entry.title));
        items.push_str(&format!(
            "<guid>http://{}/details/{id}</guid>\n",
            state.address
        ));
        items.push_str("<pubDate>Mon, 02 Jan 2023 10:00:00 +0000</pubDate>\n");
        if let Some(size) = entry.size_bytes {
            items.push_str(&format!("<size>{size}</size>\n"));
        }
        items.push_str(&format!(
            "<torznab:attr name=\"seeders\" value=\"{}\"/>\n",
            entry.seeders
        ));
        items.push_str(&format!(
            "<torznab:attr name=\"peers\" value=\"{}\"/>\n",
            entry.peers
        ));
        if let Some(magnet) = entry.magnet {
            items.push_str(&format!(
                "<torznab:attr name=\"magneturl\" value=\"{}\"/>\n",
                magnet.replace('&', "&amp;")
            ));
        }
        items.push_str("</item>\n");
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:torznab="http://torznab.com/schemas/2015/feed">
<channel>
<title>AggregateSearch</title>
{items}</channel>
</rss>"#
    )
}
