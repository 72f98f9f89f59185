//! Magnet link extraction from tracker detail pages.

use scraper::{Html, Selector};

use crate::errors::SearchError;

/// Collect every anchor `href` on the page that contains `"magnet"`.
///
/// # Errors
/// - `SearchError::Parse` - The anchor selector failed to build
pub fn magnet_hrefs(html: &str) -> Result<Vec<String>, SearchError> {
    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").map_err(|e| SearchError::Parse {
        reason: format!("anchor selector: {e}"),
    })?;

    Ok(document
        .select(&anchor_selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| href.contains("magnet"))
        .map(str::to_string)
        .collect())
}

/// Pick one magnet link out of several found on the same page.
///
/// The lexicographically greatest href wins. This is a tie-break, not a
/// quality ranking: the result is deterministic and nothing more.
pub fn select_magnet_link<I>(hrefs: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    hrefs.into_iter().max()
}

/// Scan a detail page and return its chosen magnet link.
///
/// # Errors
/// - `SearchError::Parse` - The anchor selector failed to build
pub fn find_magnet_link(html: &str) -> Result<Option<String>, SearchError> {
    Ok(select_magnet_link(magnet_hrefs(html)?))
}
