//! Page metadata extraction.
//!
//! The extraction logic only ever needs four lookups on a parsed document:
//! title text, first h1 text, and the content of a `meta` tag addressed by
//! `name` or by `property`. [`MetaDocument`] pins that surface down so the
//! fallback chains can be tested against a plain stub, independent of the
//! HTML parser.

use scraper::{Html, Selector};

use sitedigest_shared::PageMetadata;

/// Fallback description when no meta tag yields one.
pub const NO_DESCRIPTION: &str = "No description available";

// ---------------------------------------------------------------------------
// Accessor trait
// ---------------------------------------------------------------------------

/// Narrow, typed view over a parsed page document.
///
/// All lookups return `None` for missing elements and for elements whose
/// text/content is empty after trimming, so callers fall through to the next
/// step of their chain.
pub trait MetaDocument {
    /// Text of the document `<title>` element.
    fn title_text(&self) -> Option<String>;

    /// Text of the first `<h1>` element.
    fn first_heading_text(&self) -> Option<String>;

    /// `content` attribute of `meta[name=<name>]`.
    fn meta_named(&self, name: &str) -> Option<String>;

    /// `content` attribute of `meta[property=<property>]`.
    fn meta_property(&self, property: &str) -> Option<String>;
}

/// [`MetaDocument`] implemented over a `scraper`-parsed HTML document.
pub struct HtmlMetaDocument {
    doc: Html,
}

impl HtmlMetaDocument {
    /// Parse an HTML body into a metadata view.
    pub fn parse(html: &str) -> Self {
        Self {
            doc: Html::parse_document(html),
        }
    }

    fn select_text(&self, selector: &str) -> Option<String> {
        let sel = Selector::parse(selector).expect("valid selector");
        let text = self
            .doc
            .select(&sel)
            .next()
            .map(|el| el.text().collect::<String>())?;
        non_empty(text.trim())
    }

    fn select_content(&self, selector: &str) -> Option<String> {
        let sel = Selector::parse(selector).expect("valid selector");
        let content = self
            .doc
            .select(&sel)
            .next()
            .and_then(|el| el.value().attr("content"))?;
        non_empty(content.trim())
    }
}

impl MetaDocument for HtmlMetaDocument {
    fn title_text(&self) -> Option<String> {
        self.select_text("title")
    }

    fn first_heading_text(&self) -> Option<String> {
        self.select_text("h1")
    }

    fn meta_named(&self, name: &str) -> Option<String> {
        self.select_content(&format!(r#"meta[name="{name}"]"#))
    }

    fn meta_property(&self, property: &str) -> Option<String> {
        self.select_content(&format!(r#"meta[property="{property}"]"#))
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract display metadata for a page.
///
/// Title resolution order: document title → first h1 → final path segment of
/// the URL. Description resolution order: `meta[name=description]` →
/// `meta[property=og:description]` → [`NO_DESCRIPTION`].
pub fn extract_metadata(doc: &impl MetaDocument, url: &str) -> PageMetadata {
    let title = doc
        .title_text()
        .or_else(|| doc.first_heading_text())
        .unwrap_or_else(|| url_basename(url));

    let description = doc
        .meta_named("description")
        .or_else(|| doc.meta_property("og:description"))
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    PageMetadata {
        title,
        description,
        url: url.to_string(),
    }
}

/// Final path segment of a URL string, ignoring a trailing slash.
fn url_basename(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .to_string()
}
