//! Core domain types for SiteDigest.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// File extension that marks an input as a sitemap document.
pub const SITEMAP_FILE_EXT: &str = ".xml";

// ---------------------------------------------------------------------------
// PageMetadata
// ---------------------------------------------------------------------------

/// Display metadata extracted from one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Page title (document title, first h1, or URL basename).
    pub title: String,
    /// Short description (meta description, og:description, or fallback text).
    pub description: String,
    /// The page URL the metadata was extracted from.
    pub url: String,
}

// ---------------------------------------------------------------------------
// InputSpec
// ---------------------------------------------------------------------------

/// A normalized input spec: what a raw user-supplied string resolves to.
///
/// Normalization rules:
/// - ends with the sitemap extension and carries no protocol token → local path,
///   taken verbatim
/// - any other input without a protocol token is prefixed with `https://`
/// - inputs already carrying a protocol token pass through unchanged
///
/// A protocol-carrying input that still ends with the sitemap extension is a
/// remote sitemap location rather than a website origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    /// A local sitemap file path.
    SitemapFile(PathBuf),
    /// A remote sitemap document URL.
    SitemapUrl(String),
    /// A website origin whose sitemap location is derived by the pipeline.
    Website(String),
}

impl InputSpec {
    /// Normalize a raw input string into its resolved form.
    pub fn normalize(raw: &str) -> Self {
        let input = raw.trim();

        if input.ends_with(SITEMAP_FILE_EXT) && !has_protocol(input) {
            return Self::SitemapFile(PathBuf::from(input));
        }

        let resolved = if has_protocol(input) {
            input.to_string()
        } else {
            format!("https://{input}")
        };

        if resolved.ends_with(SITEMAP_FILE_EXT) {
            Self::SitemapUrl(resolved)
        } else {
            Self::Website(resolved)
        }
    }
}

impl std::fmt::Display for InputSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SitemapFile(path) => write!(f, "{}", path.display()),
            Self::SitemapUrl(url) | Self::Website(url) => write!(f, "{url}"),
        }
    }
}

fn has_protocol(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}
