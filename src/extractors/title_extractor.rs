//! Code heading lookup
//!
//! The page title reads like `OPS-Code 5-787.3M:` and sits in an h1 or h2.

use scraper::{ElementRef, Html, Selector};

use super::{element_text, match_text};

/// Marker removed from the heading text. Case-sensitive on purpose: it is
/// the site's own spelling.
const CODE_MARKER: &str = "OPS-Code";

/// First h1/h2 in document order whose text mentions `ops-code`
/// (case-insensitive).
pub fn find_code_heading(document: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse("h1, h2").ok()?;

    document
        .select(&selector)
        .find(|heading| match_text(*heading).to_lowercase().contains("ops-code"))
}

/// The code exactly as the heading displays it.
pub fn displayed_code(heading: ElementRef) -> String {
    code_from_heading_text(&element_text(heading))
}

/// `"OPS-Code 5-820.00: Implantation ..."` -> `"5-820.00"`
pub fn code_from_heading_text(text: &str) -> String {
    let stripped = text.replace(CODE_MARKER, "");
    let code = stripped.trim().trim_end_matches(':').trim();

    match code.split_once(':') {
        Some((head, _)) => head.trim().to_string(),
        None => code.to_string(),
    }
}
