//! Title filters applied to search candidates.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::SearchQuery;

/// Season/episode prefix: "s01e02".
static EPISODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^s[0-9]{2}e[0-9]{2}").expect("Invalid episode pattern"));

/// Season/episode token (`s01e02`) ending the search name, lower-cased.
///
/// Only the last whitespace-delimited token is inspected. When it starts with
/// `sNNeNN` the whole token is returned and every candidate title must
/// contain it.
pub fn episode_token(name: &str) -> Option<String> {
    let last = name.split_whitespace().last()?.to_lowercase();
    EPISODE_PATTERN.is_match(&last).then_some(last)
}

/// Case-insensitive check that `title` contains the episode token.
pub fn title_has_episode(title: &str, token: &str) -> bool {
    title.to_lowercase().contains(token)
}

/// Include/exclude/require keyword predicate.
///
/// Inactive unless at least one include keyword is given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordFilter {
    any_of: Vec<String>,
    none_of: Vec<String>,
    all_of: Vec<String>,
}

impl KeywordFilter {
    pub fn new(keywords: &[String], excluded: &[String], required: &[String]) -> Self {
        fn lowered(words: &[String]) -> Vec<String> {
            words.iter().map(|w| w.to_lowercase()).collect()
        }
        Self {
            any_of: lowered(keywords),
            none_of: lowered(excluded),
            all_of: lowered(required),
        }
    }

    pub fn from_query(query: &SearchQuery) -> Self {
        Self::new(&query.keywords, &query.excluded, &query.required)
    }

    pub fn is_active(&self) -> bool {
        !self.any_of.is_empty()
    }

    /// Whether `title` passes. Always true for an inactive filter.
    pub fn matches(&self, title: &str) -> bool {
        if !self.is_active() {
            return true;
        }
        let title = title.to_lowercase();
        self.any_of.iter().any(|word| title.contains(word.as_str()))
            && !self.none_of.iter().any(|word| title.contains(word.as_str()))
            && self.all_of.iter().all(|word| title.contains(word.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_episode_token() {
        assert_eq!(episode_token("The Expanse S02E05").as_deref(), Some("s02e05"));
        assert_eq!(episode_token("the expanse s02e05x").as_deref(), Some("s02e05x"));
        assert_eq!(episode_token("The Expanse season 2"), None);
        assert_eq!(episode_token("S02E05 The Expanse"), None);
        assert_eq!(episode_token("   "), None);
    }

    #[test]
    fn test_episode_pattern() {
        assert!(EPISODE_PATTERN.is_match("s10e99"));
        assert!(!EPISODE_PATTERN.is_match("S10E99"));
        assert!(!EPISODE_PATTERN.is_match("s1e2"));
        assert_eq!(episode_token("Show S10E99").as_deref(), Some("s10e99"));
        assert_eq!(episode_token("Show s1e2"), None);
    }

    #[test]
    fn test_title_has_episode() {
        assert!(title_has_episode("The.Expanse.S02E05.1080p", "s02e05"));
        assert!(!title_has_episode("The.Expanse.S02E06.1080p", "s02e05"));
    }

    #[test]
    fn test_inactive_filter_passes_everything() {
        let filter = KeywordFilter::new(&[], &words(&["epub"]), &words(&["pdf"]));
        assert!(!filter.is_active());
        assert!(filter.matches("Dune.epub"));
    }

    #[test]
    fn test_keyword_filter() {
        let filter = KeywordFilter::new(
            &words(&["EPUB", "mobi"]),
            &words(&["sample"]),
            &words(&["herbert"]),
        );
        assert!(filter.matches("Frank Herbert - Dune.epub"));
        assert!(filter.matches("frank herbert - dune.MOBI"));
        assert!(!filter.matches("Frank Herbert - Dune.pdf"));
        assert!(!filter.matches("Frank Herbert - Dune SAMPLE.epub"));
        assert!(!filter.matches("Kevin Anderson - Dune.epub"));
        assert!(!filter.matches("Dune.epub"));
    }

    proptest! {
        #[test]
        fn prop_matching_titles_satisfy_every_clause(
            title in "[a-zA-Z ]{0,24}",
            include in prop::collection::vec("[a-z]{1,3}", 1..3),
            exclude in prop::collection::vec("[a-z]{1,3}", 0..3),
            require in prop::collection::vec("[a-z]{1,3}", 0..3),
        ) {
            let filter = KeywordFilter::new(&include, &exclude, &require);
            if filter.matches(&title) {
                let lowered = title.to_lowercase();
                prop_assert!(include.iter().any(|w| lowered.contains(w.as_str())));
                prop_assert!(exclude.iter().all(|w| !lowered.contains(w.as_str())));
                prop_assert!(require.iter().all(|w| lowered.contains(w.as_str())));
            }
        }
    }
}
