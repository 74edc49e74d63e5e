//! OPS page extraction
//!
//! The reference page has no documented schema, so every piece is located by
//! heading text rather than by class names or positions:
//! - title heading (`OPS-Code ...`) and the code as displayed
//! - description: first non-boilerplate element after the title
//! - qualifiers: list following the `Zusatzkennzeichen` heading

mod description_extractor;
mod qualifier_extractor;
mod title_extractor;

pub use description_extractor::*;
pub use qualifier_extractor::*;
pub use title_extractor::*;

use scraper::{ElementRef, Html};
use serde::Serialize;

/// Everything pulled out of one OPS page. All fields may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OpsPage {
    /// Code as written on the page, e.g. `5-787.3M`
    pub code: String,
    pub description: String,
    /// Zusatzkennzeichen entries in page order
    pub qualifiers: Vec<String>,
}

/// Extract code, description and qualifiers from page markup.
///
/// Never fails: malformed or unrelated markup yields empty fields.
pub fn extract_ops_page(html: &str) -> OpsPage {
    let document = Html::parse_document(html);

    let (code, description) = match find_code_heading(&document) {
        Some(heading) => (
            displayed_code(heading),
            extract_description(&document, heading),
        ),
        None => (String::new(), String::new()),
    };

    OpsPage {
        code,
        description,
        qualifiers: extract_qualifiers(&document),
    }
}

/// Element text with each text node trimmed, joined by single spaces and
/// whitespace-collapsed.
pub(crate) fn element_text(element: ElementRef) -> String {
    let joined = element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    collapse_whitespace(&joined)
}

/// Trimmed text nodes concatenated without separator. Used only to match
/// anchor headings, where markup may split a word (`Zusatz<span>kennzeichen</span>`).
pub(crate) fn match_text(element: ElementRef) -> String {
    element.text().map(str::trim).collect()
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Elements after the start of `anchor` in document order, beginning with
/// the anchor's own descendants.
pub(crate) fn next_elements<'a>(
    document: &'a Html,
    anchor: ElementRef<'a>,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    let anchor_node = *anchor;
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .skip_while(move |el| **el != anchor_node)
        .skip(1)
}

/// Elements after `anchor` in document order, excluding the anchor's own
/// subtree.
pub(crate) fn following_elements<'a>(
    document: &'a Html,
    anchor: ElementRef<'a>,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    let anchor_node = *anchor;
    next_elements(document, anchor)
        .filter(move |el| !(**el).ancestors().any(|node| node == anchor_node))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Case {
        name: &'static str,
        html: &'static str,
        code: &'static str,
        description: &'static str,
        qualifiers: &'static [&'static str],
    }

    const CASES: &[Case] = &[
        Case {
            name: "plain",
            html: include_str!("../../fixtures/plain.html"),
            code: "5-787.3M",
            description: "Entfernung von Osteosynthesematerial: Platte: Tibia proximal",
            qualifiers: &["R: Rechts", "L: Links", "B: Beidseitig"],
        },
        Case {
            name: "hint before description",
            html: include_str!("../../fixtures/hint_first.html"),
            code: "5-787.3M",
            description: "Entfernung von Osteosynthesematerial: Platte: Tibia proximal",
            qualifiers: &[],
        },
        Case {
            name: "nested layout with boilerplate",
            html: include_str!("../../fixtures/nested_layout.html"),
            code: "5-787.3M",
            description: "Entfernung von Osteosynthesematerial: Platte: Tibia proximal",
            qualifiers: &["R: Rechts", "L: Links", "B: Beidseitig"],
        },
        Case {
            name: "description inside the heading",
            html: include_str!("../../fixtures/description_in_heading.html"),
            code: "5-787.3M",
            description: "Entfernung von Osteosynthesematerial: Platte: Tibia proximal",
            qualifiers: &["R: Rechts", "L: Links"],
        },
        Case {
            name: "title with trailing label",
            html: include_str!("../../fixtures/titled_heading.html"),
            code: "5-820.00",
            description: "Implantation einer Endoprothese am Hüftgelenk: Totalendoprothese: Nicht zementiert",
            qualifiers: &["R: Rechts", "L: Links"],
        },
        Case {
            name: "qualifier heading before any description",
            html: include_str!("../../fixtures/no_description.html"),
            code: "8-98G.10",
            description: "",
            qualifiers: &["R: Rechts", "L: Links", "B: Beidseitig"],
        },
        Case {
            name: "no code heading",
            html: include_str!("../../fixtures/qualifiers_only.html"),
            code: "",
            description: "",
            qualifiers: &["R: Rechts", "L: Links"],
        },
        Case {
            name: "qualifier heading without list",
            html: include_str!("../../fixtures/no_list.html"),
            code: "1-632.0",
            description: "Diagnostische Ösophagogastroduodenoskopie: Bei normalem Situs",
            qualifiers: &[],
        },
        Case {
            name: "not an OPS page",
            html: include_str!("../../fixtures/not_found.html"),
            code: "",
            description: "",
            qualifiers: &[],
        },
    ];

    #[test]
    fn test_fixture_table() {
        for case in CASES {
            let page = extract_ops_page(case.html);
            assert_eq!(page.code, case.code, "code mismatch in {}", case.name);
            assert_eq!(
                page.description, case.description,
                "description mismatch in {}",
                case.name
            );
            assert_eq!(
                page.qualifiers, case.qualifiers,
                "qualifier mismatch in {}",
                case.name
            );
        }
    }

    #[test]
    fn test_heading_then_paragraph() {
        let html = r#"
        <html><body>
            <h1>OPS-Code 5-787.3M:</h1>
            <p>Entfernung von Osteosynthesematerial</p>
        </body></html>
        "#;

        let page = extract_ops_page(html);
        assert_eq!(page.code, "5-787.3M");
        assert_eq!(page.description, "Entfernung von Osteosynthesematerial");
        assert!(page.qualifiers.is_empty());
    }

    #[test]
    fn test_garbage_input() {
        for html in ["", "not html at all", "<<<>>>", "<h1>", "</p></div>"] {
            assert_eq!(extract_ops_page(html), OpsPage::default());
        }
    }

    #[test]
    fn test_element_text_normalizes() {
        let document = Html::parse_fragment("<p>  Ent<b>fernung</b>\n\n   von   <i>Material</i> </p>");
        let selector = scraper::Selector::parse("p").unwrap();
        let p = document.select(&selector).next().unwrap();
        assert_eq!(element_text(p), "Ent fernung von Material");
    }

    #[test]
    fn test_next_elements_enter_own_subtree() {
        let document = Html::parse_document(
            r#"<div><h1>A <span>inner</span></h1><p>one</p></div><section><p>two</p></section>"#,
        );
        let selector = scraper::Selector::parse("h1").unwrap();
        let h1 = document.select(&selector).next().unwrap();

        let names: Vec<_> = next_elements(&document, h1)
            .map(|el| el.value().name().to_string())
            .collect();
        assert_eq!(names, vec!["span", "p", "section", "p"]);

        let names: Vec<_> = following_elements(&document, h1)
            .map(|el| el.value().name().to_string())
            .collect();
        assert_eq!(names, vec!["p", "section", "p"]);
    }

    #[test]
    fn test_description_inside_heading() {
        let html = r#"<h1><span>OPS-Code 5-787.3M:</span> <span>Entfernung von Osteosynthesematerial</span></h1><p>Hinweis: x</p>"#;

        let page = extract_ops_page(html);
        assert_eq!(page.code, "5-787.3M");
        assert_eq!(page.description, "Entfernung von Osteosynthesematerial");
    }

    #[test]
    fn test_match_text_joins_split_words() {
        let document = Html::parse_fragment("<h2> Zusatz<span>kennzeichen</span> </h2>");
        let selector = scraper::Selector::parse("h2").unwrap();
        let h2 = document.select(&selector).next().unwrap();
        assert_eq!(match_text(h2), "Zusatzkennzeichen");
        assert_eq!(element_text(h2), "Zusatz kennzeichen");
    }
}
