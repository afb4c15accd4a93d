// src/fetch/http.rs
// =============================================================================
// The real Fetcher: downloads pages over HTTP(S) with reqwest.
//
// What counts as a usable page:
// - the request succeeded (no timeout, no connection error)
// - the status code is 2xx (redirects are followed, up to 5)
// - the Content-Type header says text/html
//
// Anything else becomes a FetchError. We check the content type BEFORE
// reading the body, so images and PDFs are never downloaded.
// =============================================================================

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

use super::{is_html_type, Fetcher, Page};
use crate::error::{CrawlError, FetchError};

/// User-Agent sent when the settings don't override it.
pub const DEFAULT_USER_AGENT: &str = concat!("bfs-crawler/", env!("CARGO_PKG_VERSION"));

// HTTP implementation of Fetcher
//
// Client is cheap to clone (it's just a reference counter internally),
// so one HttpFetcher is shared by every worker through an Arc.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher with the given User-Agent and per-request timeout.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let response = self.client.get(url).send().await.map_err(categorize_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        if !is_html_type(content_type.as_deref()) {
            return Err(FetchError::NotHtml(content_type));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        Ok(Page {
            content_type,
            // Pages are read as UTF-8; invalid bytes become U+FFFD instead of failing
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

// Maps reqwest's error into our smaller set of fetch failures
fn categorize_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_connect() {
        FetchError::Connect(error.to_string())
    } else if error.is_redirect() {
        FetchError::Request("Too many redirects".to_string())
    } else {
        FetchError::Request(error.to_string())
    }
}
