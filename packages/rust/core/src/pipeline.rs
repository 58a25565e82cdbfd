//! End-to-end digest pipeline: input specs → sitemap → sections → metadata → document.
//!
//! Inputs are processed strictly in order and in isolation: a failed input is
//! logged and skipped, never aborting the batch. Within one input, sections are
//! processed sequentially while the pages of each section fan out concurrently,
//! so the rendered document is deterministic regardless of I/O timing.

use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};
use url::Url;

use sitedigest_crawler::{NO_DESCRIPTION, PageFetcher};
use sitedigest_shared::{FetchConfig, InputSpec, PageMetadata, Result, SiteDigestError};
use sitedigest_sitemap::{LoaderOptions, SitemapSource};

use crate::assembler::{self, SectionEntries};
use crate::sections;

/// Configuration for one digest generation run.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Raw input specs, already split and trimmed.
    pub inputs: Vec<String>,
    /// Fetch configuration shared by all inputs.
    pub fetch: FetchConfig,
    /// Sitemap path resolved against website origins (e.g. `/sitemap.xml`).
    pub sitemap_path: String,
}

/// Result of a digest generation run.
#[derive(Debug)]
pub struct GenerateResult {
    /// The accumulated digest document, newline-joined across inputs.
    pub content: String,
    /// Inputs that produced document content.
    pub inputs_processed: usize,
    /// Inputs skipped after a failure or an unusable sitemap.
    pub inputs_skipped: usize,
    /// Page entries rendered across all sections and inputs.
    pub pages_rendered: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase of the current input.
    fn phase(&self, name: &str);
    /// Called when an input starts processing.
    fn input_started(&self, input: &str, current: usize, total: usize);
    /// Called after a section's pages have been fetched.
    fn section_fetched(&self, section: &str, pages: usize);
    /// Called when an input is skipped.
    fn input_skipped(&self, input: &str, reason: &str);
    /// Called when the run completes.
    fn done(&self, result: &GenerateResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn input_started(&self, _input: &str, _current: usize, _total: usize) {}
    fn section_fetched(&self, _section: &str, _pages: usize) {}
    fn input_skipped(&self, _input: &str, _reason: &str) {}
    fn done(&self, _result: &GenerateResult) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Lines rendered for one successfully processed input.
struct RenderedInput {
    lines: Vec<String>,
    pages: usize,
}

/// Run the digest pipeline over all inputs.
///
/// 1. Normalize the input spec
/// 2. Load sitemap URLs and derive the site identity
/// 3. Fetch site metadata for the document header
/// 4. Classify URLs into sections
/// 5. Fetch page metadata per section (concurrent fan-out)
/// 6. Render and accumulate
///
/// Only infrastructure failures (e.g. HTTP client construction) surface as
/// errors; everything scoped to a single input, section, or page degrades.
#[instrument(skip_all, fields(inputs = config.inputs.len()))]
pub async fn generate(
    config: &GenerateConfig,
    progress: &dyn ProgressReporter,
) -> Result<GenerateResult> {
    let start = Instant::now();

    let fetcher = PageFetcher::new(&config.fetch)?;
    let loader_opts = LoaderOptions {
        timeout_secs: config.fetch.timeout_secs,
    };

    let mut content: Vec<String> = Vec::new();
    let mut inputs_processed = 0;
    let mut inputs_skipped = 0;
    let mut pages_rendered = 0;

    let total = config.inputs.len();

    for (i, raw) in config.inputs.iter().enumerate() {
        progress.input_started(raw, i + 1, total);

        match process_input(raw, config, &fetcher, &loader_opts, progress).await {
            Ok(Some(rendered)) => {
                pages_rendered += rendered.pages;
                content.extend(rendered.lines);
                inputs_processed += 1;
            }
            Ok(None) => {
                warn!(input = raw, "no URLs found in sitemap, skipping input");
                progress.input_skipped(raw, "no URLs found in sitemap");
                inputs_skipped += 1;
            }
            Err(e) => {
                warn!(input = raw, error = %e, "input failed, skipping");
                progress.input_skipped(raw, &e.to_string());
                inputs_skipped += 1;
            }
        }
    }

    let result = GenerateResult {
        content: content.join("\n"),
        inputs_processed,
        inputs_skipped,
        pages_rendered,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        inputs_processed = result.inputs_processed,
        inputs_skipped = result.inputs_skipped,
        pages_rendered = result.pages_rendered,
        elapsed_ms = result.elapsed.as_millis(),
        "digest generation complete"
    );

    Ok(result)
}

/// Process a single input spec into rendered document lines.
///
/// Returns `Ok(None)` when a sitemap-file input yields no URLs, because no
/// site identity can be derived for the header.
async fn process_input(
    raw: &str,
    config: &GenerateConfig,
    fetcher: &PageFetcher,
    loader_opts: &LoaderOptions,
    progress: &dyn ProgressReporter,
) -> Result<Option<RenderedInput>> {
    let spec = InputSpec::normalize(raw);

    progress.phase("Loading sitemap");
    let (urls, site_identity) = match &spec {
        InputSpec::SitemapFile(path) => {
            let source = SitemapSource::Local(path.clone());
            let urls = sitedigest_sitemap::load(&source, loader_opts).await;
            let Some(first) = urls.first() else {
                return Ok(None);
            };
            let origin = origin_url(first)?;
            (urls, origin)
        }
        InputSpec::SitemapUrl(sitemap_url) => {
            let source = SitemapSource::Remote(sitemap_url.clone());
            let urls = sitedigest_sitemap::load(&source, loader_opts).await;
            let Some(first) = urls.first() else {
                return Ok(None);
            };
            let origin = origin_url(first)?;
            (urls, origin)
        }
        InputSpec::Website(website_url) => {
            let sitemap_url = resolve_sitemap_url(website_url, &config.sitemap_path)?;
            let source = SitemapSource::Remote(sitemap_url);
            // An empty result is tolerated here: the document still renders
            // its header with zero sections.
            let urls = sitedigest_sitemap::load(&source, loader_opts).await;
            (urls, website_url.clone())
        }
    };

    progress.phase("Fetching site metadata");
    let site_meta = fetcher
        .fetch_metadata(&site_identity)
        .await
        .unwrap_or_else(|| {
            warn!(site = %site_identity, "site metadata unavailable, using identity fallback");
            PageMetadata {
                title: site_identity.clone(),
                description: NO_DESCRIPTION.to_string(),
                url: site_identity.clone(),
            }
        });

    let section_map = sections::group_by_section(&urls);

    let mut rendered_sections = Vec::with_capacity(section_map.len());
    for (name, section_urls) in section_map.iter() {
        progress.phase(&format!("Fetching section '{name}'"));
        let pages = fetcher.fetch_section(section_urls).await;
        progress.section_fetched(name, pages.len());

        rendered_sections.push(SectionEntries {
            name: name.to_string(),
            pages,
        });
    }

    let pages = rendered_sections.iter().map(|s| s.pages.len()).sum();
    let lines = assembler::render(&site_meta, &rendered_sections);

    info!(
        input = raw,
        site = %site_identity,
        sections = rendered_sections.len(),
        pages,
        "input processed"
    );

    Ok(Some(RenderedInput { lines, pages }))
}

// ---------------------------------------------------------------------------
// URL helpers
// ---------------------------------------------------------------------------

/// Extract the origin (scheme + host + port) from a URL string.
fn origin_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|e| SiteDigestError::validation(format!("invalid URL '{url}': {e}")))?;

    let scheme = parsed.scheme();
    let host = parsed
        .host_str()
        .ok_or_else(|| SiteDigestError::validation(format!("URL has no host: {url}")))?;

    match parsed.port() {
        Some(port) => Ok(format!("{scheme}://{host}:{port}")),
        None => Ok(format!("{scheme}://{host}")),
    }
}

/// Resolve the sitemap location against a website URL.
fn resolve_sitemap_url(website_url: &str, sitemap_path: &str) -> Result<String> {
    let base = Url::parse(website_url)
        .map_err(|e| SiteDigestError::validation(format!("invalid URL '{website_url}': {e}")))?;

    let resolved = base.join(sitemap_path).map_err(|e| {
        SiteDigestError::validation(format!(
            "cannot resolve sitemap path '{sitemap_path}' against '{website_url}': {e}"
        ))
    })?;

    Ok(resolved.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(title: &str, description: &str) -> String {
        format!(
            r#"<html><head>
                <title>{title}</title>
                <meta name="description" content="{description}">
            </head><body><h1>{title}</h1></body></html>"#
        )
    }

    fn sitemap_xml(urls: &[String]) -> String {
        let entries: String = urls
            .iter()
            .map(|u| format!("  <url><loc>{u}</loc></url>\n"))
            .collect();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{entries}</urlset>"
        )
    }

    fn config_for(inputs: Vec<String>) -> GenerateConfig {
        GenerateConfig {
            inputs,
            fetch: FetchConfig {
                concurrency: 4,
                timeout_secs: 10,
            },
            sitemap_path: "/sitemap.xml".into(),
        }
    }

    async fn mount_page(server: &wiremock::MockServer, path: &str, title: &str, desc: &str) {
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path(path))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(page(title, desc)))
            .mount(server)
            .await;
    }

    #[test]
    fn origin_url_simple() {
        assert_eq!(
            origin_url("https://docs.example.com/foo/bar").unwrap(),
            "https://docs.example.com"
        );
    }

    #[test]
    fn origin_url_with_port() {
        assert_eq!(
            origin_url("http://localhost:3000/docs").unwrap(),
            "http://localhost:3000"
        );
    }

    #[test]
    fn sitemap_url_resolves_at_origin_root() {
        assert_eq!(
            resolve_sitemap_url("https://example.com/docs", "/sitemap.xml").unwrap(),
            "https://example.com/sitemap.xml"
        );
    }

    #[tokio::test]
    async fn website_input_renders_full_document() {
        let server = wiremock::MockServer::start().await;
        let uri = server.uri();

        let urls = vec![
            format!("{uri}/"),
            format!("{uri}/docs/intro"),
            format!("{uri}/docs/install"),
        ];

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/sitemap.xml"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string(sitemap_xml(&urls)),
            )
            .mount(&server)
            .await;

        mount_page(&server, "/", "Example Site", "A demo site.").await;
        mount_page(&server, "/docs/intro", "Intro", "The intro.").await;
        mount_page(&server, "/docs/install", "Install", "The install guide.").await;

        let config = config_for(vec![uri.clone()]);
        let result = generate(&config, &SilentProgress).await.unwrap();

        assert_eq!(result.inputs_processed, 1);
        assert_eq!(result.inputs_skipped, 0);
        assert_eq!(result.pages_rendered, 3);

        let expected = format!(
            "# Example Site\n\n> A demo site.\n\n## Website\n- [Example Site]({uri}/) - A demo site.\n\n## Docs\n- [Intro]({uri}/docs/intro) - The intro.\n- [Install]({uri}/docs/install) - The install guide.\n"
        );
        assert_eq!(result.content, expected);
    }

    #[tokio::test]
    async fn failed_page_is_omitted_without_affecting_siblings() {
        let server = wiremock::MockServer::start().await;
        let uri = server.uri();

        let urls = vec![
            format!("{uri}/docs/a"),
            format!("{uri}/docs/b"),
            format!("{uri}/docs/c"),
        ];

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/sitemap.xml"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string(sitemap_xml(&urls)),
            )
            .mount(&server)
            .await;

        mount_page(&server, "/", "Site", "Desc.").await;
        mount_page(&server, "/docs/a", "Page A", "First.").await;
        // /docs/b intentionally unmocked → wiremock returns 404.
        mount_page(&server, "/docs/c", "Page C", "Third.").await;

        let config = config_for(vec![uri.clone()]);
        let result = generate(&config, &SilentProgress).await.unwrap();

        assert_eq!(result.pages_rendered, 2);
        assert!(result.content.contains("- [Page A]"));
        assert!(!result.content.contains("/docs/b"));
        // Page C holds its position right after Page A.
        let a_idx = result.content.find("- [Page A]").unwrap();
        let c_idx = result.content.find("- [Page C]").unwrap();
        assert!(a_idx < c_idx);
    }

    #[tokio::test]
    async fn second_input_failure_keeps_first_input_output() {
        let server = wiremock::MockServer::start().await;
        let uri = server.uri();

        let urls = vec![format!("{uri}/docs/a"), format!("{uri}/docs/b")];

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/sitemap.xml"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string(sitemap_xml(&urls)),
            )
            .mount(&server)
            .await;

        mount_page(&server, "/", "First Site", "Works.").await;
        mount_page(&server, "/docs/a", "A", "a.").await;
        mount_page(&server, "/docs/b", "B", "b.").await;

        // Second input: a local sitemap path that does not exist.
        let config = config_for(vec![uri.clone(), "missing/sitemap.xml".into()]);
        let result = generate(&config, &SilentProgress).await.unwrap();

        assert_eq!(result.inputs_processed, 1);
        assert_eq!(result.inputs_skipped, 1);
        assert!(result.content.starts_with("# First Site"));
        assert!(!result.content.contains("missing/sitemap.xml"));
    }

    #[tokio::test]
    async fn empty_sitemap_for_website_input_renders_header_only() {
        let server = wiremock::MockServer::start().await;
        let uri = server.uri();

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/sitemap.xml"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        mount_page(&server, "/", "Bare Site", "Nothing indexed.").await;

        let config = config_for(vec![uri.clone()]);
        let result = generate(&config, &SilentProgress).await.unwrap();

        assert_eq!(result.inputs_processed, 1);
        assert_eq!(result.pages_rendered, 0);
        assert_eq!(result.content, "# Bare Site\n\n> Nothing indexed.\n");
    }

    #[tokio::test]
    async fn site_metadata_failure_falls_back_to_identity() {
        let server = wiremock::MockServer::start().await;
        let uri = server.uri();

        let urls = vec![format!("{uri}/docs/a"), format!("{uri}/docs/b")];

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/sitemap.xml"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string(sitemap_xml(&urls)),
            )
            .mount(&server)
            .await;

        // Root page errors; section pages are fine.
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_page(&server, "/docs/a", "A", "a.").await;
        mount_page(&server, "/docs/b", "B", "b.").await;

        let config = config_for(vec![uri.clone()]);
        let result = generate(&config, &SilentProgress).await.unwrap();

        assert_eq!(result.inputs_processed, 1);
        assert!(result.content.starts_with(&format!("# {uri}")));
        assert!(result.content.contains("> No description available"));
        assert!(result.content.contains("- [A]"));
    }

    #[tokio::test]
    async fn local_sitemap_input_derives_identity_from_first_url() {
        let server = wiremock::MockServer::start().await;
        let uri = server.uri();

        mount_page(&server, "/", "From File", "Loaded via file.").await;
        mount_page(&server, "/docs/a", "A", "a.").await;
        mount_page(&server, "/docs/b", "B", "b.").await;

        let urls = vec![format!("{uri}/docs/a"), format!("{uri}/docs/b")];
        let dir = std::env::temp_dir().join(format!("sitedigest-pipeline-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("local-sitemap.xml");
        std::fs::write(&path, sitemap_xml(&urls)).expect("write sitemap");

        let config = config_for(vec![path.to_string_lossy().into_owned()]);
        let result = generate(&config, &SilentProgress).await.unwrap();

        assert_eq!(result.inputs_processed, 1);
        // Site identity is the origin of the first sitemap URL.
        assert!(result.content.starts_with("# From File"));
        assert!(result.content.contains("## Docs"));
    }

    #[tokio::test]
    async fn unparseable_input_is_skipped_not_fatal() {
        let config = config_for(vec!["https://".into()]);
        let result = generate(&config, &SilentProgress).await.unwrap();

        assert_eq!(result.inputs_processed, 0);
        assert_eq!(result.inputs_skipped, 1);
        assert!(result.content.is_empty());
    }
}
