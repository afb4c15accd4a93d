// src/fetch/mod.rs
// =============================================================================
// The boundary between the crawl engine and the network.
//
// The engine only knows the Fetcher trait: "give me a URL, I give you the
// page or tell you why not". That keeps the engine testable (tests plug in
// an in-memory fetcher) and keeps HTTP details out of the worker loop.
//
// Submodules:
// - http: the real implementation on top of reqwest
// =============================================================================

mod http;

use async_trait::async_trait;

use crate::error::FetchError;

pub use http::{HttpFetcher, DEFAULT_USER_AGENT};

// A downloaded document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Value of the Content-Type header, if the server sent one
    pub content_type: Option<String>,
    /// The document text
    pub body: String,
}

impl Page {
    /// Convenience constructor for an HTML page.
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: body.into(),
        }
    }

    /// True when the content type says this is an HTML document.
    pub fn is_html(&self) -> bool {
        is_html_type(self.content_type.as_deref())
    }
}

// "text/html", "text/html; charset=utf-8", "TEXT/HTML" ... all count
pub(crate) fn is_html_type(content_type: Option<&str>) -> bool {
    content_type.map_or(false, |ct| ct.to_ascii_lowercase().contains("text/html"))
}

/// Downloads documents for the crawl workers.
///
/// Implementations must never panic on unreachable hosts or odd content;
/// every problem is reported as a [`FetchError`], and the worker drops the
/// task. Fetches are never cancelled by the engine, so an implementation
/// should bound its own latency (the HTTP fetcher uses a request timeout).
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError>;
}
