//! OPS code lookup against gesund.bund.de
//!
//! For a procedure code (e.g. `5-787.3M`) fetch the official reference page
//! and pull out:
//! - the code as the site displays it
//! - the official description
//! - the listed Zusatzkennzeichen (additional qualifiers)
//!
//! Pipeline: [`slug`] -> [`fetch`] -> [`extractors`] -> [`record`], with
//! [`batch`] repeating it sequentially and [`export`] rendering results.

pub mod batch;
pub mod config;
pub mod export;
pub mod extractors;
pub mod fetch;
pub mod record;
pub mod slug;

pub use extractors::{extract_ops_page, OpsPage};
pub use fetch::{FetchError, FetchOptions, FetchedPage, HttpFetcher, PageFetcher};
pub use record::{assemble, assemble_with, ExtractionResult};
pub use slug::normalize_code;
