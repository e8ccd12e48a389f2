//! HTML link extraction
//!
//! Walks a parsed document and yields every referenced resource together with
//! the element and attribute it came from. Resolution against the page URL
//! and policy filtering happen in the coordinator.

use scraper::{ElementRef, Html};

/// Element/attribute pairs that reference a resource
pub const TRACKED_ATTRIBUTES: &[(&str, &str)] = &[
    ("a", "href"),
    ("area", "href"),
    ("audio", "src"),
    ("embed", "src"),
    ("iframe", "src"),
    ("img", "src"),
    ("img", "srcset"),
    ("input", "src"),
    ("link", "href"),
    ("object", "data"),
    ("script", "src"),
    ("source", "src"),
    ("source", "srcset"),
    ("track", "src"),
    ("video", "src"),
    ("video", "poster"),
];

/// A raw reference found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    pub element: &'static str,
    pub attribute: &'static str,
    /// The reference as written (unresolved)
    pub value: String,
}

/// Extracts every tracked reference from an HTML document, in document order
///
/// # Example
///
/// ```
/// use sumi_check::checker::extract_links;
///
/// let html = r#"<a href="/about">About</a><img src="logo.png" srcset="a.png 1x, b.png 2x">"#;
/// let values: Vec<String> = extract_links(html).into_iter().map(|l| l.value).collect();
/// assert_eq!(values, vec!["/about", "logo.png", "a.png", "b.png"]);
/// ```
pub fn extract_links(html: &str) -> Vec<ExtractedLink> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for element in document.root_element().descendants().filter_map(ElementRef::wrap) {
        let name = element.value().name();

        for &(tag, attribute) in TRACKED_ATTRIBUTES.iter().filter(|(tag, _)| *tag == name) {
            let Some(value) = element.value().attr(attribute) else {
                continue;
            };

            if attribute == "srcset" {
                for candidate in srcset_candidates(value) {
                    links.push(ExtractedLink {
                        element: tag,
                        attribute,
                        value: candidate,
                    });
                }
            } else {
                links.push(ExtractedLink {
                    element: tag,
                    attribute,
                    value: value.to_string(),
                });
            }
        }
    }

    links
}

/// Splits a `srcset` value into its image URLs, dropping width/density descriptors
///
/// A candidate URL runs to the next whitespace, so commas inside it (data
/// URIs, CDN transform paths) are kept. A comma ends a candidate only when it
/// trails the URL or follows the descriptors.
fn srcset_candidates(srcset: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    let mut rest = srcset;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }

        let end = rest
            .find(|c: char| c.is_ascii_whitespace())
            .unwrap_or(rest.len());
        let (url, after) = rest.split_at(end);

        let bare = url.trim_end_matches(',');
        if bare.len() < url.len() {
            candidates.push(bare.to_string());
            rest = after;
            continue;
        }
        candidates.push(url.to_string());

        // Descriptors may contain parenthesized commas
        let mut depth = 0usize;
        let mut next = after.len();
        for (i, c) in after.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    next = i + 1;
                    break;
                }
                _ => {}
            }
        }
        rest = &after[next..];
    }

    candidates
}
