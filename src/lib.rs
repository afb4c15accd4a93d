// src/lib.rs
// =============================================================================
// bfs-crawler: a bounded, concurrent breadth-first web crawler.
//
// Give it a seed URL; it fetches pages with a pool of workers, follows links
// breadth-first up to an optional depth and/or time limit, and records the
// title of every page it parsed.
//
// Modules:
// - config:  crawl configuration and the optional TOML settings file
// - crawl:   the engine (frontier, workers, watcher, Crawler handle)
// - extract: anchor/title scanning and link normalization
// - fetch:   the Fetcher trait and its HTTP implementation
// - export:  writing results to a file
// - error:   error types
// =============================================================================

pub mod config;
pub mod crawl;
pub mod error;
pub mod export;
pub mod extract;
pub mod fetch;

pub use config::{CrawlConfig, Settings, Tuning};
pub use crawl::{Crawler, CrawlResults, Progress, StopReason};
pub use error::{CrawlError, FetchError, Rejection, Result};
pub use fetch::{Fetcher, HttpFetcher, Page};
