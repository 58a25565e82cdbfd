//! URL-to-section classification.
//!
//! URLs group by their first path segment, but only directories that actually
//! contain more than one distinct page become sections of their own. Root-level
//! URLs and single-page directories collect in the reserved `"website"` bucket.
//! The name is reserved by design: a literal top-level `website/` directory
//! merges into the same bucket.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};
use url::Url;

/// Reserved section collecting root-level URLs and single-page directories.
pub const WEBSITE_SECTION: &str = "website";

// ---------------------------------------------------------------------------
// SectionMap
// ---------------------------------------------------------------------------

/// An ordered mapping from section name to the URLs classified into it.
///
/// Iteration order is insertion order of the section names, which the grouper
/// ties to a single linear scan of the input list — independent of any native
/// map ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    entries: Vec<(String, Vec<String>)>,
}

impl SectionMap {
    /// Append a URL to a section, creating the section on first use.
    fn push(&mut self, section: &str, url: &str) {
        match self.entries.iter_mut().find(|(name, _)| name == section) {
            Some((_, urls)) => urls.push(url.to_string()),
            None => self
                .entries
                .push((section.to_string(), vec![url.to_string()])),
        }
    }

    /// Iterate sections in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, urls)| (name.as_str(), urls.as_slice()))
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no URL was classified.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of classified URLs across sections.
    pub fn url_count(&self) -> usize {
        self.entries.iter().map(|(_, urls)| urls.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Partition URLs into named sections.
///
/// Pass one collects, per first path segment, the set of distinct joined-path
/// strings sharing that segment. Pass two walks the input once more and
/// assigns every URL: no path segments → `"website"`; first segment whose
/// directory holds more than one distinct path → that segment; anything else →
/// `"website"`. Section order is first-assignment order of that second scan,
/// and URLs keep their relative input order within each section.
pub fn group_by_section(urls: &[String]) -> SectionMap {
    let mut directory_pages: HashMap<String, HashSet<String>> = HashMap::new();

    for url in urls {
        let Some(segments) = path_segments(url) else {
            continue;
        };
        if let Some(first) = segments.first() {
            directory_pages
                .entry(first.clone())
                .or_default()
                .insert(segments.join("/"));
        }
    }

    let mut sections = SectionMap::default();

    for url in urls {
        let Some(segments) = path_segments(url) else {
            warn!(%url, "skipping unparseable sitemap entry");
            continue;
        };

        match segments.first() {
            None => sections.push(WEBSITE_SECTION, url),
            Some(first) => {
                let has_subpages = directory_pages
                    .get(first)
                    .is_some_and(|paths| paths.len() > 1);

                if has_subpages {
                    sections.push(first, url);
                } else {
                    sections.push(WEBSITE_SECTION, url);
                }
            }
        }
    }

    debug!(
        sections = sections.len(),
        urls = sections.url_count(),
        "urls classified"
    );

    sections
}

/// Non-empty path segments of an absolute URL, or `None` if it does not parse.
fn path_segments(url: &str) -> Option<Vec<String>> {
    let parsed = Url::parse(url).ok()?;
    let segments = parsed
        .path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Some(segments)
}

// ---------------------------------------------------------------------------
// Section titles
// ---------------------------------------------------------------------------

/// Render a section key as a display heading.
///
/// The reserved key renders as `Website`; any other key splits on hyphens and
/// capitalizes the first character of each piece.
pub fn format_section_title(section: &str) -> String {
    if section == WEBSITE_SECTION {
        return "Website".to_string();
    }

    section
        .split('-')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => {
            let upper: String = c.to_uppercase().collect();
            format!("{upper}{}", chars.collect::<String>())
        }
        None => String::new(),
    }
}
