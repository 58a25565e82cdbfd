//! Digest document rendering.
//!
//! Pure line assembly: site header, then one block per section. Callers have
//! already filtered out failed pages, so every entry renders.

use sitedigest_shared::PageMetadata;

use crate::sections::format_section_title;

/// A section ready for rendering: its key and the surviving page entries.
#[derive(Debug, Clone)]
pub struct SectionEntries {
    /// Section key as produced by classification.
    pub name: String,
    /// Fetched metadata, in the section's URL order.
    pub pages: Vec<PageMetadata>,
}

/// Render the digest lines for one site.
///
/// Output shape:
/// ```text
/// # <site title>
///
/// > <site description>
///
/// ## <Section Title>
/// - [<page title>](<url>) - <description>
///
/// ```
/// Sections render in map order; each block ends with a blank separator line.
pub fn render(site: &PageMetadata, sections: &[SectionEntries]) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!("# {}", site.title));
    lines.push(String::new());
    lines.push(format!("> {}", site.description));
    lines.push(String::new());

    for section in sections {
        lines.push(format!("## {}", format_section_title(&section.name)));

        for page in &section.pages {
            lines.push(format!(
                "- [{}]({}) - {}",
                page.title, page.url, page.description
            ));
        }

        lines.push(String::new());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(title: &str, url: &str, description: &str) -> PageMetadata {
        PageMetadata {
            title: title.into(),
            description: description.into(),
            url: url.into(),
        }
    }

    #[test]
    fn renders_header_and_sections() {
        let site = meta("Example Docs", "https://example.com", "All the docs.");
        let sections = vec![
            SectionEntries {
                name: "website".into(),
                pages: vec![meta("Home", "https://example.com/", "Start here.")],
            },
            SectionEntries {
                name: "getting-started".into(),
                pages: vec![
                    meta(
                        "Install",
                        "https://example.com/getting-started/install",
                        "How to install.",
                    ),
                    meta(
                        "Configure",
                        "https://example.com/getting-started/configure",
                        "How to configure.",
                    ),
                ],
            },
        ];

        let lines = render(&site, &sections);

        assert_eq!(
            lines,
            vec![
                "# Example Docs".to_string(),
                String::new(),
                "> All the docs.".to_string(),
                String::new(),
                "## Website".to_string(),
                "- [Home](https://example.com/) - Start here.".to_string(),
                String::new(),
                "## Getting Started".to_string(),
                "- [Install](https://example.com/getting-started/install) - How to install."
                    .to_string(),
                "- [Configure](https://example.com/getting-started/configure) - How to configure."
                    .to_string(),
                String::new(),
            ]
        );
    }

    #[test]
    fn empty_section_still_renders_heading_and_separator() {
        let site = meta("Site", "https://example.com", "Desc.");
        let sections = vec![SectionEntries {
            name: "docs".into(),
            pages: vec![],
        }];

        let lines = render(&site, &sections);
        assert_eq!(lines[4], "## Docs");
        assert_eq!(lines[5], "");
    }

    #[test]
    fn no_sections_renders_header_only() {
        let site = meta("Site", "https://example.com", "Desc.");
        let lines = render(&site, &[]);
        assert_eq!(
            lines,
            vec![
                "# Site".to_string(),
                String::new(),
                "> Desc.".to_string(),
                String::new(),
            ]
        );
    }
}
