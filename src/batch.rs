//! Batch runs
//!
//! Codes come from a delimited file (first column only), are deduplicated on
//! the exact input string and then looked up one after another.

use std::collections::HashSet;
use std::io::Read;

use csv::ReaderBuilder;
use tracing::{debug, info};

use crate::fetch::PageFetcher;
use crate::record::{assemble_with, ExtractionResult};

/// First-column value that marks a header row (compared case-insensitively)
const HEADER_CELL: &str = "code";

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed CSV input: {0}")]
    Csv(#[from] csv::Error),
}

/// Progress callbacks for a batch run. Every method defaults to a no-op.
pub trait Progress {
    /// Called once with the number of codes that will be looked up.
    fn begin(&mut self, _total: usize) {}

    /// Called after each lookup, `index` starting at 1.
    fn item_done(&mut self, _index: usize, _result: &ExtractionResult) {}

    /// Called after the last lookup.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Read codes from CSV text: first field of each row, trimmed. Blank cells
/// and `code` header rows are dropped. Invalid UTF-8 is replaced.
pub fn read_codes<R: Read>(mut reader: R) -> Result<Vec<String>, BatchError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let text = String::from_utf8_lossy(&bytes);

    let mut rows = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut codes = Vec::new();
    for record in rows.records() {
        let record = record?;
        let Some(first) = record.get(0) else {
            continue;
        };
        let code = first.trim();
        if code.is_empty() || code.eq_ignore_ascii_case(HEADER_CELL) {
            continue;
        }
        codes.push(code.to_string());
    }

    Ok(codes)
}

/// Drop repeated codes (exact, case-sensitive match), keeping the first
/// occurrence and the input order.
pub fn dedupe_codes<I, S>(codes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    codes
        .into_iter()
        .map(Into::into)
        .filter(|code| seen.insert(code.clone()))
        .collect()
}

/// Look up every distinct code in order, strictly one at a time.
///
/// A failing code only affects its own record.
pub fn run_batch<F, P>(fetcher: &F, codes: &[String], progress: &mut P) -> Vec<ExtractionResult>
where
    F: PageFetcher + ?Sized,
    P: Progress + ?Sized,
{
    let unique = dedupe_codes(codes.iter().map(String::as_str));
    if unique.len() < codes.len() {
        debug!(dropped = codes.len() - unique.len(), "dropped duplicate codes");
    }

    info!(total = unique.len(), "starting batch");
    progress.begin(unique.len());

    let mut results = Vec::with_capacity(unique.len());
    for (i, code) in unique.iter().enumerate() {
        let result = assemble_with(fetcher, code);
        progress.item_done(i + 1, &result);
        results.push(result);
    }

    progress.finish();
    let failed = results.iter().filter(|r| r.is_error()).count();
    info!(total = results.len(), failed, "batch finished");

    results
}
