//! Sitemap XML parsing.
//!
//! Extracts the text of each `url/loc` element from a `urlset` document, in
//! document order. Duplicates are preserved; deduplication is not this layer's
//! concern.

use quick_xml::Reader;
use quick_xml::events::Event;

use sitedigest_shared::{Result, SiteDigestError};

/// Parse a sitemap XML string into its ordered list of page URLs.
///
/// The document must carry a `urlset` root with repeated `url` elements, each
/// holding one `loc` child. A `urlset` with zero `url` entries is valid and
/// yields an empty list; any other shape (malformed XML, missing root) is a
/// parse error.
pub fn parse_url_entries(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut buf = Vec::new();

    let mut saw_urlset = false;
    let mut in_url = false;
    let mut in_loc = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match name.as_str() {
                    "urlset" => saw_urlset = true,
                    "url" if saw_urlset => in_url = true,
                    "loc" if in_url => in_loc = true,
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match name.as_str() {
                    "url" => in_url = false,
                    "loc" => in_loc = false,
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if in_loc {
                    let text = e
                        .unescape()
                        .map_err(|e| SiteDigestError::parse(e.to_string()))?;
                    let text = text.trim();
                    if !text.is_empty() {
                        entries.push(text.to_string());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SiteDigestError::parse(format!("XML parse error: {e}")));
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_urlset {
        return Err(SiteDigestError::parse("missing urlset root element"));
    }

    Ok(entries)
}
