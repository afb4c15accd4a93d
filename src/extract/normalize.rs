// src/extract/normalize.rs
// =============================================================================
// This module turns a raw anchor tag into an absolute URL we can crawl.
//
// Steps, in order:
// 1. Pull the href value out of the tag (no href -> rejected)
// 2. Reject hrefs that can't be pages: empty, one character, "#section",
//    "mailto:", "tel:", "javascript:" and other non-HTTP schemes
// 3. Make it absolute:
//    - "http..."      -> unchanged
//    - "//cdn.com/x"  -> crawl protocol + href
//    - "/a" or "b"    -> crawl base URL + href (one "/" between them)
// 4. Check that the result really parses as an http(s) URL with a host
//
// Everything here is pure. The same tag and base always give the same
// answer, which is what makes deduplication by URL string work.
// =============================================================================

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

use crate::error::{CrawlError, Rejection};

// What relative links are resolved against
//
// Derived once from the seed URL:
//   seed = "https://example.com/docs/intro"
//   base_url = "https://example.com", protocol = "https:"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlBase {
    base_url: String,
    protocol: String,
}

impl CrawlBase {
    /// Builds a base from explicit parts, e.g. `("https://example.com", "https:")`.
    pub fn new(base_url: impl Into<String>, protocol: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            protocol: protocol.into(),
        }
    }

    /// Derives the base URL (scheme + host + port) and protocol from a seed URL.
    ///
    /// Fails when the seed is not an absolute http(s) URL with a host.
    pub fn from_seed(seed: &str) -> Result<Self, CrawlError> {
        let url = Url::parse(seed.trim()).map_err(|e| CrawlError::invalid_seed(seed, e))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(CrawlError::invalid_seed(
                seed,
                format!("scheme must be http or https, got '{}'", url.scheme()),
            ));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(CrawlError::invalid_seed(seed, "URL has no host"));
        }

        Ok(Self {
            // origin() drops path, query and fragment, and keeps non-default ports
            base_url: url.origin().ascii_serialization(),
            protocol: format!("{}:", url.scheme()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }
}

fn href_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?is)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("href pattern is valid")
    })
}

// Returns the href value of an anchor tag, if it has one
//
// Examples:
//   <a href="/docs">         -> Some("/docs")
//   <a class='x' href='y'>   -> Some("y")
//   <a name="top">           -> None
pub fn href_of(fragment: &str) -> Option<&str> {
    let captures = href_pattern().captures(fragment)?;
    captures.get(1).or_else(|| captures.get(2)).map(|m| m.as_str())
}

// Normalizes one raw anchor tag against the crawl base
//
// Returns: Ok(absolute_url) or Err(why it was rejected)
pub fn normalize(fragment: &str, base: &CrawlBase) -> Result<String, Rejection> {
    let href = href_of(fragment).ok_or(Rejection::MissingHref)?;
    normalize_href(href, base)
}

// Normalizes an href value that was already pulled out of its tag
//
// Examples (base = "https://example.com", protocol = "https:"):
//   "/a"                 -> "https://example.com/a"
//   "b"                  -> "https://example.com/b"
//   "//cdn.com/x"        -> "https://cdn.com/x"
//   "https://other.com"  -> "https://other.com"
//   "#section"           -> Err(SamePage)
//   "mailto:x@y.com"     -> Err(Mailto)
pub fn normalize_href(href: &str, base: &CrawlBase) -> Result<String, Rejection> {
    let href = href.trim();

    if is_too_short(href) {
        return Err(Rejection::TooShort);
    }
    if href.starts_with('#') {
        return Err(Rejection::SamePage);
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("mailto:") {
        return Err(Rejection::Mailto);
    }

    let absolute = if lower.starts_with("http") {
        href.to_string()
    } else if href.starts_with("//") {
        format!("{}{}", base.protocol, href)
    } else if has_scheme(href) {
        // tel:, javascript:, data:, ftp: ... none of these are pages we can crawl
        return Err(Rejection::UnsupportedScheme);
    } else {
        join(&base.base_url, href)
    };

    if is_crawlable(&absolute) {
        Ok(absolute)
    } else {
        Err(Rejection::Malformed)
    }
}

// Empty hrefs, and single characters that can't name a page ("/", "#", "?", ".").
// A one-letter relative path like "b" is a real page.
fn is_too_short(href: &str) -> bool {
    let mut chars = href.chars();
    match (chars.next(), chars.next()) {
        (None, _) => true,
        (Some(c), None) => !(c.is_alphanumeric() || matches!(c, '-' | '_' | '~')),
        _ => false,
    }
}

// True when the href carries its own scheme ("tel:+123", "javascript:void(0)").
// Relative paths like "docs/a.html" fail to parse without a base, so they are
// not mistaken for schemes.
fn has_scheme(href: &str) -> bool {
    Url::parse(href).is_ok()
}

// Joins base and path with exactly one "/" at the join point
fn join(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

fn is_crawlable(absolute: &str) -> bool {
    match Url::parse(absolute) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().map_or(false, |host| !host.is_empty())
        }
        Err(_) => false,
    }
}
