//! Torznab feed parsing.
//!
//! Jackett answers searches with an RSS document whose `<item>`s carry
//! torznab extension attributes:
//!
//! ```xml
//! <item>
//!   <title>Some.Book.epub</title>
//!   <guid>https://tracker.example/details/1</guid>
//!   <pubDate>Mon, 02 Jan 2023 10:00:00 +0000</pubDate>
//!   <size>1048576</size>
//!   <torznab:attr name="seeders" value="12"/>
//!   <torznab:attr name="peers" value="3"/>
//!   <torznab:attr name="magneturl" value="magnet:?xt=urn:btih:..."/>
//! </item>
//! ```
//!
//! Element names are matched case-insensitively.

use chrono::NaiveDate;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::errors::SearchError;
use crate::types::{FeedItem, UNKNOWN_PEER_COUNT};

/// Parse every `<item>` of a torznab feed.
///
/// Items are returned even when they lack a title; callers decide what to skip.
///
/// # Errors
/// - `SearchError::Parse` - The document is not well-formed XML
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>, SearchError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current_item: Option<FeedItem> = None;
    let mut current_element = String::new();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = element_name(&e);
                if name == "item" {
                    current_item = Some(FeedItem::new());
                } else if let Some(item) = current_item.as_mut() {
                    if name == "torznab:attr" {
                        apply_torznab_attr(item, &e);
                    }
                }
                current_element = name;
                text.clear();
            }
            Ok(Event::Empty(e)) => {
                if let Some(item) = current_item.as_mut() {
                    if element_name(&e) == "torznab:attr" {
                        apply_torznab_attr(item, &e);
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if current_item.is_some() {
                    match e.unescape() {
                        Ok(unescaped) => text.push_str(&unescaped),
                        Err(_) => text.push_str(&String::from_utf8_lossy(&e)),
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if current_item.is_some() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_lowercase();
                if name == "item" {
                    if let Some(item) = current_item.take() {
                        items.push(item);
                    }
                } else if let Some(item) = current_item.as_mut() {
                    if name == current_element {
                        apply_element_text(item, &name, text.trim());
                    }
                }
                current_element.clear();
                text.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SearchError::Parse {
                    reason: format!("XML error: {e}"),
                });
            }
            _ => {}
        }
    }

    tracing::debug!(items = items.len(), "Parsed torznab feed");
    Ok(items)
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_lowercase()
}

fn apply_element_text(item: &mut FeedItem, element: &str, text: &str) {
    if text.is_empty() {
        return;
    }
    match element {
        "title" => item.title = Some(text.to_string()),
        "guid" => item.guid = Some(text.to_string()),
        "pubdate" => item.pub_date = Some(text.to_string()),
        "size" => item.size_bytes = parse_size(text),
        _ => {}
    }
}

fn apply_torznab_attr(item: &mut FeedItem, e: &BytesStart<'_>) {
    let mut name = None;
    let mut value = None;
    for attr in e.attributes().flatten() {
        let Ok(attr_value) = attr.unescape_value() else {
            continue;
        };
        match attr.key.as_ref() {
            b"name" => name = Some(attr_value.to_lowercase()),
            b"value" => value = Some(attr_value.into_owned()),
            _ => {}
        }
    }

    let (Some(name), Some(value)) = (name, value) else {
        return;
    };
    match name.as_str() {
        "seeders" => item.seeders = parse_peer_count(&value),
        "peers" => item.leechers = parse_peer_count(&value),
        "magneturl" => item.magnet_url = Some(value),
        _ => {}
    }
}

fn parse_peer_count(value: &str) -> i64 {
    value.trim().parse().unwrap_or(UNKNOWN_PEER_COUNT)
}

fn parse_size(text: &str) -> Option<u64> {
    if let Ok(bytes) = text.parse::<u64>() {
        return Some(bytes);
    }
    text.parse::<f64>()
        .ok()
        .filter(|bytes| bytes.is_finite() && *bytes >= 0.0)
        .map(|bytes| bytes as u64)
}

/// Parse the date part of an RSS `pubDate`.
///
/// Takes the text after the last comma and reads its first three tokens as
/// `day month year` (`"Mon, 02 Jan 2023 10:00:00 +0000"` is 2 January 2023).
/// Anything that does not fit yields `None`.
pub fn parse_pub_date(text: &str) -> Option<NaiveDate> {
    let tail = text.rsplit(',').next()?.trim();
    let date_part = tail.split_whitespace().take(3).collect::<Vec<_>>().join(" ");
    NaiveDate::parse_from_str(&date_part, "%d %B %Y").ok()
}
