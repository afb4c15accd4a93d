// src/error.rs
// =============================================================================
// Error types for the crawler library.
//
// There are three very different kinds of failure, so there are three enums:
// - FetchError: one page could not be downloaded (the task is just dropped)
// - Rejection:  one link could not be turned into a crawlable URL
// - CrawlError: the crawl itself can't start, or was used the wrong way
//
// Only CrawlError ever reaches the caller of the crawler. The other two are
// handled inside the worker loop, because one bad page should never stop
// the whole crawl.
// =============================================================================

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Run-level errors: bad configuration or misuse of the crawler handle.
#[derive(Error, Debug)]
pub enum CrawlError {
    /// The seed URL is not an absolute http(s) URL with a host
    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    /// At least one worker is needed to make progress
    #[error("Worker count must be at least 1")]
    InvalidWorkerCount,

    /// A time limit of zero seconds would stop the crawl before it starts
    #[error("Time limit must be a positive number of seconds")]
    InvalidTimeLimit,

    /// A timing knob is zero where the worker pool needs a positive value
    #[error("Invalid tuning: {0} must be greater than zero")]
    InvalidTuning(&'static str),

    /// start() was called while the previous run had not been stopped
    #[error("A crawl is already running; stop it before starting another")]
    AlreadyRunning,

    /// export() was called before stop() returned
    #[error("The crawl has not been stopped yet; results are not final")]
    NotStopped,

    /// Reading or writing a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The settings file is not valid TOML
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl CrawlError {
    /// Create an invalid seed error.
    pub fn invalid_seed(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidSeed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Why a single page could not be fetched.
///
/// Every variant is treated the same way by the worker: the task is dropped.
/// The variants only exist so logs (and the `links` command) can say why.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Request timed out
    #[error("Request timed out")]
    Timeout,
    /// Could not connect (DNS failure, connection refused, ...)
    #[error("Connection failed: {0}")]
    Connect(String),
    /// The server answered with a non-success status code
    #[error("HTTP {0}")]
    Status(u16),
    /// The response is not an HTML document
    #[error("Not HTML (content type: {})", .0.as_deref().unwrap_or("missing"))]
    NotHtml(Option<String>),
    /// The body could not be read
    #[error("Failed to read body: {0}")]
    Body(String),
    /// Any other request error
    #[error("Request failed: {0}")]
    Request(String),
}

/// Why a raw anchor did not produce a crawlable URL.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The anchor tag has no href attribute
    #[error("anchor has no href")]
    MissingHref,
    /// Empty or single-character href
    #[error("href is too short")]
    TooShort,
    /// Same-page fragment like #section
    #[error("same-page fragment")]
    SamePage,
    /// mailto: link
    #[error("email link")]
    Mailto,
    /// tel:, javascript:, data:, ftp: ...
    #[error("unsupported scheme")]
    UnsupportedScheme,
    /// The joined URL does not parse as an absolute http(s) URL
    #[error("malformed URL")]
    Malformed,
}
