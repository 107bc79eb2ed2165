// src/crawl/links.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (it is built on html5ever)
// - Supports CSS selectors for finding elements
//
// And the `url` crate to resolve relative links against the page URL, the
// same way a browser does.
//
// Only absolute http(s) links come out. Anchors, mailto:, tel:, javascript:
// and anything that does not resolve are skipped. Links are returned in
// document order, duplicates removed.
// =============================================================================

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::warn;
use url::Url;

static ANCHORS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

pub trait LinkExtractor: Send + Sync {
    /// Returns the absolute URLs `content` links to, resolved against `base_url`.
    fn extract_links(&self, content: &str, base_url: &Url) -> Vec<String>;
}

/// Extracts `<a href>` targets with scraper.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, content: &str, base_url: &Url) -> Vec<String> {
        extract_html_links(content, base_url.as_str())
    }
}

/// Extracts all http(s) links from HTML content.
///
/// Example:
///   html = "<a href='/docs'>Docs</a>"
///   base_url = "https://example.com"
///   result = ["https://example.com/docs"]
pub fn extract_html_links(html: &str, base_url: &str) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(e) => {
            warn!(base_url, error = %e, "invalid base URL, no links extracted");
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&ANCHORS) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if let Some(absolute_url) = resolve_link(&base, href) {
            if seen.insert(absolute_url.clone()) {
                links.push(absolute_url);
            }
        }
    }

    links
}

// Resolves a possibly-relative href to an absolute http(s) URL
//
// Examples (base = "https://example.com/page"):
//   "/docs"              -> Some("https://example.com/docs")
//   "../other"           -> Some("https://example.com/other")
//   "https://other.com"  -> Some("https://other.com/")
//   "#section"           -> None
//   "javascript:void(0)" -> None
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    // join() handles both absolute and relative hrefs
    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<a href="https://www.rust-lang.org">Rust</a>"#;
        let links = extract_html_links(html, "https://example.com");
        assert_eq!(links, vec!["https://www.rust-lang.org/"]);
    }

    #[test]
    fn test_resolve_relative_link() {
        let html = r#"<a href="/docs">Docs</a>"#;
        let links = extract_html_links(html, "https://example.com/page");
        assert_eq!(links, vec!["https://example.com/docs"]);
    }

    #[test]
    fn test_skip_special_schemes_and_anchors() {
        let html = r##"
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+123">Call</a>
            <a href="javascript:void(0)">Click</a>
            <a href="#top">Top</a>
            <a href="ftp://example.com/file">File</a>
        "##;
        let links = extract_html_links(html, "https://example.com");
        assert!(links.is_empty());
    }

    #[test]
    fn test_multiple_links_deduplicated_in_order() {
        let html = r#"
            <a href="https://rust-lang.org">Rust</a>
            <a href="/docs">Docs</a>
            <a href="../about">About</a>
            <a href="/docs#install">Docs again</a>
        "#;
        let links = extract_html_links(html, "https://example.com/page/");
        assert_eq!(
            links,
            vec![
                "https://rust-lang.org/",
                "https://example.com/docs",
                "https://example.com/about",
            ]
        );
    }

    #[test]
    fn test_invalid_base_url_yields_nothing() {
        let links = extract_html_links(r#"<a href="/docs">Docs</a>"#, "not a url");
        assert!(links.is_empty());
    }

    #[test]
    fn test_trait_object_delegates() {
        let extractor: &dyn LinkExtractor = &HtmlLinkExtractor;
        let base = Url::parse("https://example.com/").unwrap();
        assert_eq!(
            extractor.extract_links(r#"<a href="next">Next</a>"#, &base),
            vec!["https://example.com/next"]
        );
    }
}
