// src/crawl/engine.rs
// =============================================================================
// Crawler: the handle a front end uses to run crawls.
//
// Lifecycle of one run:
//   start(config)  -> validates, seeds the frontier, spawns N workers + the
//                     watcher, and returns right away
//   progress()     -> counters snapshot, callable at any time
//   wait()         -> resolves once the run stopped on its own
//                     (time limit or nothing left to crawl)
//   stop()         -> asks everything to stop and waits until every task
//                     has exited
//   export()       -> the URL -> title map, only after stop()
//
// A Crawler can run several crawls one after another; each start() builds
// brand-new shared state.
// =============================================================================

use futures::future::join_all;
use log::{info, warn};
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::state::{CrawlResults, Progress, StopReason};
use super::watcher::run_watcher;
use super::worker::run_worker;
use super::Shared;
use crate::config::CrawlConfig;
use crate::error::{CrawlError, Result};
use crate::fetch::Fetcher;

pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    // State of the current (or most recent) run
    shared: Option<Arc<Shared>>,
    // Workers + watcher of a run that has not been stopped yet
    handles: Vec<JoinHandle<()>>,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            shared: None,
            handles: Vec::new(),
        }
    }

    /// Starts a crawl in the background.
    ///
    /// The configuration is checked before anything is spawned, so a bad
    /// seed URL or worker count is reported here and nowhere else.
    /// Must be called from inside a tokio runtime.
    pub fn start(&mut self, config: &CrawlConfig) -> Result<()> {
        if !self.handles.is_empty() {
            return Err(CrawlError::AlreadyRunning);
        }

        let base = config.validate()?;
        let shared = Arc::new(Shared::new(base, config.max_depth));
        shared.frontier.try_enqueue(config.seed_url.trim(), 0);

        info!(
            "Starting crawl of {} with {} worker(s), max depth {}, time limit {}",
            config.seed_url.trim(),
            config.workers,
            config
                .max_depth
                .map_or_else(|| "none".to_string(), |d| d.to_string()),
            config
                .time_limit_secs
                .map_or_else(|| "none".to_string(), |s| format!("{}s", s)),
        );

        for id in 0..config.workers {
            self.handles.push(tokio::spawn(run_worker(
                id,
                Arc::clone(&shared),
                Arc::clone(&self.fetcher),
                config.tuning.backoff,
            )));
        }
        self.handles.push(tokio::spawn(run_watcher(
            Arc::clone(&shared),
            config.time_limit_secs,
            config.tuning,
        )));

        self.shared = Some(shared);
        Ok(())
    }

    /// Resolves once the current run has been signalled to stop, by the
    /// watcher or by `stop()`. Returns immediately if nothing was started.
    pub async fn wait(&self) {
        if let Some(shared) = &self.shared {
            let token = shared.run.token();
            token.cancelled().await;
        }
    }

    /// Stops the current run and waits for every worker and the watcher.
    ///
    /// In-flight fetches are allowed to complete, so this can take as long
    /// as the slowest fetch. Returns why the run stopped; if it had already
    /// stopped on its own, that earlier reason is kept.
    pub async fn stop(&mut self) -> Option<StopReason> {
        let shared = Arc::clone(self.shared.as_ref()?);
        shared.run.stop(StopReason::Requested);

        let handles = std::mem::take(&mut self.handles);
        for result in join_all(handles).await {
            if let Err(e) = result {
                warn!("Crawl task ended abnormally: {}", e);
            }
        }

        let reason = shared.run.stop_reason();
        info!(
            "All workers have finished crawling ({}): {} page(s) parsed in {}s",
            reason.map_or_else(|| "stopped".to_string(), |r| r.to_string()),
            shared.run.pages_parsed(),
            shared.run.elapsed_secs()
        );
        reason
    }

    /// Counters of the current or most recent run (all zero before the first run).
    pub fn progress(&self) -> Progress {
        self.shared
            .as_ref()
            .map(|shared| shared.progress())
            .unwrap_or_default()
    }

    /// True while a run is active (started and not yet signalled to stop).
    pub fn is_running(&self) -> bool {
        !self.handles.is_empty()
            && self
                .shared
                .as_ref()
                .map_or(false, |shared| shared.run.is_running())
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.shared.as_ref().and_then(|shared| shared.run.stop_reason())
    }

    /// The crawl output: every parsed URL and its title.
    ///
    /// Fails with [`CrawlError::NotStopped`] until `stop()` has returned,
    /// because workers may still be writing results.
    pub fn export(&self) -> Result<CrawlResults> {
        if !self.handles.is_empty() {
            return Err(CrawlError::NotStopped);
        }
        Ok(self
            .shared
            .as_ref()
            .map(|shared| shared.results.snapshot())
            .unwrap_or_default())
    }
}

impl Drop for Crawler {
    // Tasks of a run that was never stopped keep running detached;
    // signal them so they wind down on their own.
    fn drop(&mut self) {
        if let Some(shared) = &self.shared {
            if !self.handles.is_empty() {
                shared.run.stop(StopReason::Requested);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::test_support::{MapFetcher, SlowFetcher};
    use std::time::Duration;
    use tokio::time::Instant;

    fn expected(entries: &[(&str, Option<&str>)]) -> CrawlResults {
        entries
            .iter()
            .map(|(url, title)| (url.to_string(), title.map(str::to_string)))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_crawl_seed_and_depth_one_links() {
        let fetcher = Arc::new(
            MapFetcher::new()
                .page(
                    "https://a.test/",
                    r#"<html><title>Home</title><a href="https://a.test/p1">1</a> <a href="/p2">2</a></html>"#,
                )
                .page("https://a.test/p1", "<title>T1</title>")
                .page("https://a.test/p2", "<title>T2</title>"),
        );
        let mut crawler = Crawler::new(fetcher.clone());
        let config = CrawlConfig::new("https://a.test/")
            .with_workers(2)
            .with_max_depth(Some(1));

        crawler.start(&config).unwrap();
        crawler.wait().await;
        assert_eq!(crawler.stop().await, Some(StopReason::FrontierExhausted));

        let results = crawler.export().unwrap();
        assert_eq!(
            results,
            expected(&[
                ("https://a.test/", Some("Home")),
                ("https://a.test/p1", Some("T1")),
                ("https://a.test/p2", Some("T2")),
            ])
        );
        assert_eq!(fetcher.calls(), 3);

        let progress = crawler.progress();
        assert!(!progress.running);
        assert_eq!(progress.pages_parsed, 3);
        assert_eq!(progress.visited, 3);
        assert_eq!(progress.queued, 0);

        // every recorded URL went through the visited set
        let shared = crawler.shared.as_ref().unwrap();
        for url in results.keys() {
            assert!(shared.frontier.is_visited(url));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_links_past_max_depth_are_never_fetched() {
        let fetcher = Arc::new(
            MapFetcher::new()
                .page("https://a.test/", "<title>Home</title><a href=\"/p1\">1</a>")
                .page("https://a.test/p1", "<title>T1</title><a href=\"/deep\">2</a>")
                .page("https://a.test/deep", "<title>Deep</title>"),
        );
        let mut crawler = Crawler::new(fetcher.clone());
        let config = CrawlConfig::new("https://a.test/")
            .with_workers(3)
            .with_max_depth(Some(1));

        crawler.start(&config).unwrap();
        crawler.wait().await;
        crawler.stop().await;

        let results = crawler.export().unwrap();
        assert!(!results.contains_key("https://a.test/deep"));
        assert_eq!(fetcher.calls(), 2);
        assert!(!crawler
            .shared
            .as_ref()
            .unwrap()
            .frontier
            .is_visited("https://a.test/deep"));
        // depth 2 was seen while scanning p1, but never admitted
        assert_eq!(crawler.progress().deepest_depth, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_letter_relative_link_is_crawled() {
        let fetcher = Arc::new(
            MapFetcher::new()
                .page("https://a.test/", "<title>Home</title><a href=\"b\">b</a>")
                .page("https://a.test/b", "<title>B</title>"),
        );
        let mut crawler = Crawler::new(fetcher.clone());
        let config = CrawlConfig::new("https://a.test/").with_workers(2);

        crawler.start(&config).unwrap();
        crawler.wait().await;
        crawler.stop().await;

        let results = crawler.export().unwrap();
        assert_eq!(
            results,
            expected(&[
                ("https://a.test/", Some("Home")),
                ("https://a.test/b", Some("B")),
            ])
        );
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_url_fetched_once_with_many_workers() {
        // every page links to every other page
        let links: String = (0..20)
            .map(|i| format!("<a href=\"/p{}\">p{}</a>", i, i))
            .collect();
        let mut fetcher = MapFetcher::new().page("https://a.test/", &links);
        for i in 0..20 {
            fetcher = fetcher.page(&format!("https://a.test/p{}", i), &links);
        }
        let fetcher = Arc::new(fetcher);

        let mut crawler = Crawler::new(fetcher.clone());
        crawler
            .start(&CrawlConfig::new("https://a.test/").with_workers(8))
            .unwrap();
        crawler.wait().await;
        crawler.stop().await;

        assert_eq!(fetcher.calls(), 21);
        assert_eq!(crawler.export().unwrap().len(), 21);
        assert_eq!(crawler.progress().pages_parsed, 21);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_frontier_is_not_a_time_limit() {
        let fetcher = Arc::new(MapFetcher::new().page("https://a.test/", "<title>Only</title>"));
        let mut crawler = Crawler::new(fetcher);

        crawler
            .start(&CrawlConfig::new("https://a.test/").with_workers(2))
            .unwrap();
        crawler.wait().await;

        assert_eq!(crawler.stop_reason(), Some(StopReason::FrontierExhausted));
        assert_eq!(crawler.stop().await, Some(StopReason::FrontierExhausted));
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_limit_lets_in_flight_fetch_finish() {
        let fetcher = Arc::new(SlowFetcher::new(Duration::from_secs(10)));
        let mut crawler = Crawler::new(fetcher.clone());
        let started = Instant::now();

        crawler
            .start(
                &CrawlConfig::new("https://a.test/")
                    .with_workers(2)
                    .with_time_limit(Some(1)),
            )
            .unwrap();
        crawler.wait().await;

        let stopped_after = started.elapsed();
        assert!(stopped_after >= Duration::from_secs(1));
        assert!(stopped_after < Duration::from_secs(2));
        assert!(!crawler.progress().running);
        assert_eq!(fetcher.started(), 1);
        assert_eq!(fetcher.completed(), 0);

        // stop() waits for the running fetch instead of aborting it
        assert_eq!(crawler.stop().await, Some(StopReason::TimeLimit));
        assert_eq!(fetcher.completed(), 1);
        assert!(started.elapsed() >= Duration::from_secs(10));

        let progress = crawler.progress();
        assert_eq!(progress.elapsed_secs, 1);
        assert_eq!(progress.pages_parsed, 1);
        assert_eq!(crawler.export().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requested_stop() {
        let fetcher = Arc::new(SlowFetcher::new(Duration::from_secs(5)));
        let mut crawler = Crawler::new(fetcher.clone());

        crawler
            .start(&CrawlConfig::new("https://a.test/").with_workers(1))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(crawler.is_running());

        assert_eq!(crawler.stop().await, Some(StopReason::Requested));
        assert!(!crawler.is_running());
        assert_eq!(fetcher.completed(), 1);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected_before_spawning() {
        let fetcher = Arc::new(MapFetcher::new());
        let mut crawler = Crawler::new(fetcher.clone());

        let err = crawler
            .start(&CrawlConfig::new("https://a.test/").with_workers(0))
            .unwrap_err();
        assert!(matches!(err, CrawlError::InvalidWorkerCount));

        let err = crawler
            .start(&CrawlConfig::new("mailto:someone@a.test"))
            .unwrap_err();
        assert!(matches!(err, CrawlError::InvalidSeed { .. }));

        assert!(!crawler.is_running());
        assert_eq!(crawler.progress(), Progress::default());
        assert_eq!(crawler.stop().await, None);
        assert!(crawler.export().unwrap().is_empty());
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_and_restart() {
        let fetcher = Arc::new(MapFetcher::new().page("https://a.test/", "<title>Home</title>"));
        let mut crawler = Crawler::new(fetcher.clone());
        let config = CrawlConfig::new("https://a.test/").with_workers(1);

        crawler.start(&config).unwrap();
        assert!(matches!(crawler.start(&config), Err(CrawlError::AlreadyRunning)));
        assert!(matches!(crawler.export(), Err(CrawlError::NotStopped)));

        crawler.wait().await;
        crawler.stop().await;
        assert_eq!(crawler.progress().pages_parsed, 1);

        // a second run starts from scratch
        crawler.start(&config).unwrap();
        crawler.wait().await;
        crawler.stop().await;
        assert_eq!(crawler.progress().pages_parsed, 1);
        assert_eq!(fetcher.calls(), 2);
    }
}
