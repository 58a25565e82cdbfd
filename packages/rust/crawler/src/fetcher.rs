//! Concurrent page-metadata fetching.
//!
//! One fetcher is built per pipeline run and shared across sections. Within a
//! section all fetches are issued at once, bounded by a semaphore, and the
//! results are collected in request order — completion order of the underlying
//! I/O never shows up in the output.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use sitedigest_shared::{FetchConfig, PageMetadata, Result, SiteDigestError};

use crate::extract::{self, HtmlMetaDocument};

/// User-Agent string for page requests.
const USER_AGENT: &str = concat!("SiteDigest/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow when fetching a page.
const MAX_REDIRECTS: usize = 5;

/// Fetches pages and extracts their display metadata.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
    semaphore: Arc<Semaphore>,
}

impl PageFetcher {
    /// Create a fetcher with the given runtime configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                SiteDigestError::Network(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            semaphore: Arc::new(Semaphore::new(config.concurrency.max(1) as usize)),
        })
    }

    /// Fetch one page and extract its metadata.
    ///
    /// Returns `None` on any fetch or parse failure; the URL and reason are
    /// logged and the caller excludes the page from its output.
    pub async fn fetch_metadata(&self, url: &str) -> Option<PageMetadata> {
        debug!(%url, "fetching page metadata");

        match self.try_fetch(url).await {
            Ok(meta) => {
                debug!(%url, title = %meta.title, "page metadata extracted");
                Some(meta)
            }
            Err(e) => {
                warn!(%url, error = %e, "failed to fetch page metadata");
                None
            }
        }
    }

    /// Fetch metadata for every URL of one section concurrently.
    ///
    /// Fan-out is bounded by the configured concurrency. Failed pages are
    /// dropped; surviving entries keep the original request order.
    pub async fn fetch_section(&self, urls: &[String]) -> Vec<PageMetadata> {
        let mut handles = Vec::with_capacity(urls.len());

        for url in urls {
            let fetcher = self.clone();
            let url = url.clone();

            handles.push(tokio::spawn(async move {
                let _permit = fetcher.semaphore.acquire().await.expect("semaphore closed");
                fetcher.fetch_metadata(&url).await
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(Some(meta)) => results.push(meta),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "metadata fetch task panicked"),
            }
        }
        results
    }

    async fn try_fetch(&self, url: &str) -> Result<PageMetadata> {
        let response = self
            .client
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

        // Parse after the last await so the spawned future stays Send.
        let doc = HtmlMetaDocument::parse(&body);
        Ok(extract::extract_metadata(&doc, url))
    }
}
