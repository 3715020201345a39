//! HTML parser for extracting page text and outbound links
//!
//! This module turns a fetched HTML document into the two things a
//! traversal needs: the visible text of the page and the links to follow.

use crate::crawler::fetcher::FetchedPage;
use scraper::{Html, Selector};
use url::Url;

/// Parses HTML content into page text and outbound links
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document, resolved against `base_url`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same page anchors)
///
/// Fragments are stripped from the links that remain.
/// - Anything that is not http(s) after resolution
///
/// Links are returned in document order and may contain duplicates; the
/// traversal is responsible for deduplication.
///
/// # Example
///
/// ```
/// use tiered_crawler::crawler::parse_page;
/// use url::Url;
///
/// let html = r#"<html><body><p>Hello</p><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let page = parse_page(html, &base_url);
/// assert_eq!(page.links, vec!["https://example.com/page".to_string()]);
/// assert_eq!(page.text, "Hello Link");
/// ```
pub fn parse_page(html: &str, base_url: &Url) -> FetchedPage {
    let document = Html::parse_document(html);

    FetchedPage {
        text: extract_text(&document),
        links: extract_links(&document, base_url),
    }
}

/// Collects the document's text with whitespace collapsed
fn extract_text(document: &Html) -> String {
    let text = match Selector::parse("body") {
        Ok(selector) => match document.select(&selector).next() {
            Some(body) => body.text().collect::<Vec<_>>().join(" "),
            None => document.root_element().text().collect::<Vec<_>>().join(" "),
        },
        Err(_) => document.root_element().text().collect::<Vec<_>>().join(" "),
    };

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts all followable links from the document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(mut absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                // `/p#a` and `/p#b` name the same document
                absolute_url.set_fragment(None);
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
