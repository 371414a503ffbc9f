//! Text and URL normalization shared by listing, storage and search.

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Look-alike characters the site uses in titles, mapped to their letters.
const CHARACTER_REPLACEMENTS: &[(char, char)] = &[('@', 'a'), ('0', 'o')];

static POSTER_SIZE_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"_\d+\.jpg$").unwrap());

/// Replace look-alike characters (`R@ja` becomes `Raja`).
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .map(|c| {
            CHARACTER_REPLACEMENTS
                .iter()
                .find(|(from, _)| *from == c)
                .map(|(_, to)| *to)
                .unwrap_or(c)
        })
        .collect()
}

/// Normalized, lowercased form used for case-insensitive matching.
pub fn normalize_for_search(text: &str) -> String {
    normalize_text(text).to_lowercase()
}

/// Rewrite a trailing `_<digits>.jpg` size suffix to `_<variant>.jpg`.
///
/// URLs without the suffix are returned unchanged.
pub fn normalize_poster_url(src: &str, variant: u32) -> String {
    POSTER_SIZE_SUFFIX
        .replace(src, format!("_{}.jpg", variant).as_str())
        .into_owned()
}

/// Case-insensitive substring query over normalized titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleQuery {
    needle: String,
}

impl TitleQuery {
    /// Build a query; blank input yields `None` (no filtering).
    pub fn new(query: &str) -> Option<Self> {
        let needle = normalize_for_search(query.trim());
        if needle.is_empty() {
            None
        } else {
            Some(Self { needle })
        }
    }

    pub fn matches(&self, title: &str) -> bool {
        normalize_for_search(title).contains(&self.needle)
    }
}
