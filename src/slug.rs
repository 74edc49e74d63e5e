//! Code normalization
//!
//! The source site addresses each OPS code by a lowercase, hyphenated path
//! segment. Dots and mixed case only exist in the display form.

/// Convert a user-supplied code into the URL path segment the site expects.
///
/// Trims surrounding whitespace, replaces every `.` with `-` and lowercases
/// the result. Total: empty input yields an empty slug.
pub fn normalize_code(code: &str) -> String {
    code.trim().replace('.', "-").to_lowercase()
}
