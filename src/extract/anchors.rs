// src/extract/anchors.rs
// =============================================================================
// Pattern-based scanning of HTML for anchors and the page title.
//
// We don't build a DOM here. A crawler only needs two things from a page:
// - every <a ...> start tag (the links to follow)
// - the text of the first <title> element
//
// Regexes handle both well enough, and they never fail on broken markup:
// a malformed page just yields whatever still matches.
// =============================================================================

use regex::Regex;
use std::sync::OnceLock;

// One <a ...> tag found on a page, paired with the depth its target would get
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// The raw start tag, e.g. `<a class="nav" href="/docs">`
    pub fragment: String,
    /// Depth of the page the link points to (parent depth + 1)
    pub depth: usize,
}

// Matches an anchor start tag: "<a" followed by a word boundary, so <abbr>
// and <article> are not mistaken for links. (?s) lets a tag span lines.
fn anchor_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?is)<a\b[^>]*>").expect("anchor pattern is valid"))
}

fn title_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("title pattern is valid")
    })
}

// Extracts every anchor tag in document order
//
// Parameters:
//   html: the page source
//   depth: depth of the page being scanned
//
// Returns: one Anchor per <a ...> tag, each with depth + 1
//
// No filtering happens here: duplicates, mailto: links and anchors without
// an href are all returned. Deciding what to follow is the normalizer's job.
pub fn extract_anchors(html: &str, depth: usize) -> Vec<Anchor> {
    let child_depth = depth + 1;

    anchor_pattern()
        .find_iter(html)
        .map(|m| Anchor {
            fragment: m.as_str().to_string(),
            depth: child_depth,
        })
        .collect()
}

// Extracts the text of the first <title> element
//
// Returns None when there is no title, or when it's only whitespace
pub fn extract_title(html: &str) -> Option<String> {
    let captures = title_pattern().captures(html)?;
    let title = captures.get(1)?.as_str().trim();

    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchors_in_document_order() {
        let html = r#"
            <a href="/first">1</a>
            <p>text</p>
            <a href='/second'>2</a>
            <A HREF="/third">3</A>
        "#;
        let anchors = extract_anchors(html, 0);

        assert_eq!(anchors.len(), 3);
        assert_eq!(anchors[0].fragment, r#"<a href="/first">"#);
        assert_eq!(anchors[1].fragment, "<a href='/second'>");
        assert_eq!(anchors[2].fragment, r#"<A HREF="/third">"#);
        assert!(anchors.iter().all(|a| a.depth == 1));
    }

    #[test]
    fn test_child_depth_is_parent_plus_one() {
        let anchors = extract_anchors(r#"<a href="/x">x</a>"#, 4);
        assert_eq!(anchors[0].depth, 5);
    }

    #[test]
    fn test_does_not_match_similar_tags() {
        let html = "<abbr title='x'>x</abbr><article>y</article><area href='/map'>";
        assert!(extract_anchors(html, 0).is_empty());
    }

    #[test]
    fn test_keeps_duplicates_and_hrefless_anchors() {
        let html = r#"<a href="/x">x</a><a name="top"></a><a href="/x">again</a>"#;
        let anchors = extract_anchors(html, 0);
        assert_eq!(anchors.len(), 3);
        assert_eq!(anchors[1].fragment, r#"<a name="top">"#);
    }

    #[test]
    fn test_anchor_spanning_lines() {
        let html = "<a\n  class=\"nav\"\n  href=\"/docs\">Docs</a>";
        let anchors = extract_anchors(html, 0);
        assert_eq!(anchors.len(), 1);
        assert!(anchors[0].fragment.contains("href=\"/docs\""));
    }

    #[test]
    fn test_malformed_markup_degrades_gracefully() {
        let html = r#"<div><a href="/ok">ok<a href="/unclosed" <span>text</div"#;
        let anchors = extract_anchors(html, 0);
        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors[1].fragment, r#"<a href="/unclosed" <span>"#);

        // an anchor that never closes is simply not found
        assert!(extract_anchors("<a href=\"/x\"", 0).is_empty());
    }

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title>Hello World</title></head></html>";
        assert_eq!(extract_title(html), Some("Hello World".to_string()));
    }

    #[test]
    fn test_extract_title_trims_and_uses_first() {
        let html = "<TITLE>\n  First  \n</TITLE><title>Second</title>";
        assert_eq!(extract_title(html), Some("First".to_string()));
    }

    #[test]
    fn test_missing_or_blank_title() {
        assert_eq!(extract_title("<html><body>no title</body></html>"), None);
        assert_eq!(extract_title("<title>   </title>"), None);
        assert_eq!(extract_title("<title>never closed"), None);
    }
}
