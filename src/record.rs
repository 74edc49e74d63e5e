//! Record assembly
//!
//! Normalize, fetch, extract, and fold the outcome into one
//! [`ExtractionResult`]. Failures never escape: they land in `error`.

use std::fmt::Display;

use serde::Serialize;
use tracing::warn;

use crate::extractors::extract_ops_page;
use crate::fetch::{FetchOptions, HttpFetcher, PageFetcher};
use crate::slug::normalize_code;

/// Separator used when qualifiers are flattened into one text field
pub const QUALIFIER_SEPARATOR: &str = "; ";

/// Outcome of one code lookup. On failure only `code` and `error` carry
/// information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    /// Code as displayed by the site, or the caller's input as fallback
    pub code: String,
    pub description: String,
    pub qualifiers: Vec<String>,
    /// URL the page was served from; empty when the fetch failed
    pub direct_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResult {
    fn failed(code: &str, error: impl Display) -> Self {
        Self {
            code: code.to_string(),
            description: String::new(),
            qualifiers: vec![],
            direct_link: String::new(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Qualifiers joined with `"; "`
    pub fn qualifiers_joined(&self) -> String {
        self.qualifiers.join(QUALIFIER_SEPARATOR)
    }
}

/// Look up one code through `fetcher`.
pub fn assemble_with<F: PageFetcher + ?Sized>(fetcher: &F, code: &str) -> ExtractionResult {
    let slug = normalize_code(code);

    let page = match fetcher.fetch(&slug) {
        Ok(page) => page,
        Err(err) => {
            warn!(code, slug = %slug, error = %err, "lookup failed");
            return ExtractionResult::failed(code, err);
        }
    };

    let parsed = extract_ops_page(&page.html);
    let code = if parsed.code.is_empty() {
        code.trim().to_string()
    } else {
        parsed.code
    };

    ExtractionResult {
        code,
        description: parsed.description,
        qualifiers: parsed.qualifiers,
        direct_link: page.url,
        error: None,
    }
}

/// Look up one code with a fresh HTTP client built from `options`.
pub fn assemble(code: &str, options: &FetchOptions) -> ExtractionResult {
    match HttpFetcher::new(options) {
        Ok(fetcher) => assemble_with(&fetcher, code),
        Err(err) => {
            warn!(code, error = %err, "could not build HTTP client");
            ExtractionResult::failed(code, err)
        }
    }
}
