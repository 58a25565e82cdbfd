//! Sitemap ingestion: resolve a sitemap source to an ordered list of page URLs.
//!
//! A source is either a local file or a remote sitemap location. Either way the
//! content is parsed as a `urlset` document and the `url/loc` texts are returned
//! in document order. Any read, network, or parse failure is logged and yields
//! an empty list — this boundary never raises, so the pipeline can keep going
//! with its other inputs.

mod parser;

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use sitedigest_shared::{Result, SiteDigestError};

pub use parser::parse_url_entries;

/// Maximum number of redirects to follow when fetching a sitemap.
const MAX_REDIRECTS: usize = 3;

/// User-Agent string for sitemap requests.
const USER_AGENT: &str = concat!("SiteDigest/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Source and options
// ---------------------------------------------------------------------------

/// Where a sitemap document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapSource {
    /// A sitemap file on the local filesystem, read as UTF-8 text.
    Local(PathBuf),
    /// A sitemap document fetched over HTTP.
    Remote(String),
}

impl std::fmt::Display for SitemapSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => write!(f, "{url}"),
        }
    }
}

/// Configuration for sitemap loading.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Timeout for HTTP requests in seconds.
    pub timeout_secs: u64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Load the ordered URL entries of a sitemap.
///
/// On any failure the source and reason are logged and an empty list is
/// returned, per the degrade-to-empty policy.
#[instrument(skip_all, fields(source = %source))]
pub async fn load(source: &SitemapSource, opts: &LoaderOptions) -> Vec<String> {
    let result = match source {
        SitemapSource::Local(path) => read_local(path),
        SitemapSource::Remote(url) => fetch_remote(url, opts).await,
    };

    match result {
        Ok(entries) => {
            info!(count = entries.len(), "sitemap loaded");
            entries
        }
        Err(e) => {
            warn!(error = %e, "sitemap load failed, continuing with empty URL list");
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read and parse a sitemap from the local filesystem.
fn read_local(path: &Path) -> Result<Vec<String>> {
    debug!(path = %path.display(), "reading local sitemap");
    let content = std::fs::read_to_string(path).map_err(|e| SiteDigestError::io(path, e))?;
    parser::parse_url_entries(&content)
}

/// Fetch and parse a sitemap over HTTP.
async fn fetch_remote(url: &str, opts: &LoaderOptions) -> Result<Vec<String>> {
    debug!(%url, "fetching remote sitemap");
    let client = build_client(opts)?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SiteDigestError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SiteDigestError::Network(format!("{url}: HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| SiteDigestError::Network(format!("{url}: failed to read body: {e}")))?;

    parser::parse_url_entries(&body)
}

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &LoaderOptions) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| SiteDigestError::Network(format!("failed to build HTTP client: {e}")))
}
