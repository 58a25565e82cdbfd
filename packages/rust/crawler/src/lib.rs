//! Page fetching and metadata extraction.
//!
//! This crate provides:
//! - [`extract`] — the narrow [`MetaDocument`] accessor over parsed HTML and
//!   the title/description fallback chains
//! - [`PageFetcher`] — concurrent, order-preserving metadata fetching with
//!   per-page failure tolerance

pub mod extract;
pub mod fetcher;

pub use extract::{HtmlMetaDocument, MetaDocument, NO_DESCRIPTION, extract_metadata};
pub use fetcher::PageFetcher;
