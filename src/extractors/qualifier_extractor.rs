//! Zusatzkennzeichen (qualifier) lookup
//!
//! Independent of the code heading: a page without a recognisable title can
//! still list qualifiers.

use scraper::{Html, Selector};

use super::{element_text, following_elements, match_text};

/// Entries of the first list following the first h2/h3 whose text starts
/// with `zusatzkennzeichen`. Empty items are dropped; order and duplicates
/// are kept.
pub fn extract_qualifiers(document: &Html) -> Vec<String> {
    let (heading_selector, item_selector) =
        match (Selector::parse("h2, h3"), Selector::parse("li")) {
            (Ok(h), Ok(li)) => (h, li),
            _ => return vec![],
        };

    let Some(heading) = document.select(&heading_selector).find(|h| {
        match_text(*h)
            .to_lowercase()
            .starts_with("zusatzkennzeichen")
    }) else {
        return vec![];
    };

    let Some(list) = following_elements(document, heading)
        .find(|el| matches!(el.value().name(), "ul" | "ol"))
    else {
        return vec![];
    };

    list.select(&item_selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}
