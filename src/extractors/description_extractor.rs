//! Description lookup
//!
//! Walks forward from the code heading through the rest of the document,
//! starting inside the heading itself. The description is rarely a sibling
//! of the heading, so siblings alone are not enough.

use scraper::{ElementRef, Html};

use super::{element_text, next_elements};

/// Lowercased prefixes of boilerplate that sits between title and text
/// (chapter breadcrumb, hints, patient-facing notes).
const SKIP_PREFIXES: &[&str] = &["ops-code", "aus ", "hinweis", "bei ihnen"];

/// Start of the qualifier section. Reaching it means there is no
/// description.
const QUALIFIER_PREFIX: &str = "zusatzkennzeichen";

/// Text of the first element after the start of `heading` (its own children
/// included) that is not boilerplate, or an empty string.
pub fn extract_description(document: &Html, heading: ElementRef) -> String {
    for element in next_elements(document, heading) {
        let text = element_text(element);
        if text.is_empty() {
            continue;
        }

        let lower = text.to_lowercase();
        if SKIP_PREFIXES.iter().any(|prefix| lower.starts_with(prefix)) {
            continue;
        }
        if lower.starts_with(QUALIFIER_PREFIX) {
            break;
        }
        return text;
    }

    String::new()
}
