// src/crawl/state.rs
// =============================================================================
// Shared state of one crawl run, apart from the frontier.
//
// - ResultMap: URL -> page title, the output of the crawl
// - RunState:  the "still running?" signal, why it stopped, and the
//              progress counters (elapsed seconds, pages parsed, depth)
//
// A fresh RunState is built for every run, so counters always start at zero.
// =============================================================================

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// URL -> title (None when the page had no title).
pub type CrawlResults = BTreeMap<String, Option<String>>;

#[derive(Debug, Default)]
pub struct ResultMap {
    entries: Mutex<HashMap<String, Option<String>>>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Option<String>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a page title. Returns false if the URL was already recorded,
    /// in which case the first title is kept.
    pub fn record(&self, url: &str, title: Option<String>) -> bool {
        let mut entries = self.lock();
        if entries.contains_key(url) {
            return false;
        }
        entries.insert(url.to_string(), title);
        true
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sorted copy of every recorded entry.
    pub fn snapshot(&self) -> CrawlResults {
        self.lock()
            .iter()
            .map(|(url, title)| (url.clone(), title.clone()))
            .collect()
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The configured time limit elapsed
    TimeLimit,
    /// The frontier stayed empty with no task in flight
    FrontierExhausted,
    /// stop() was called (Ctrl-C in the CLI)
    Requested,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::TimeLimit => "time limit reached",
            StopReason::FrontierExhausted => "all tasks completed",
            StopReason::Requested => "stopped on request",
        };
        f.write_str(text)
    }
}

/// Point-in-time view of a run, safe to take while workers are busy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub running: bool,
    pub elapsed_secs: u64,
    pub pages_parsed: usize,
    pub deepest_depth: usize,
    /// Tasks waiting in the frontier
    pub queued: usize,
    /// URLs admitted so far
    pub visited: usize,
}

#[derive(Debug)]
pub struct RunState {
    token: CancellationToken,
    started_at: Instant,
    elapsed_secs: AtomicU64,
    pages_parsed: AtomicUsize,
    deepest_depth: AtomicUsize,
    stop_reason: OnceLock<StopReason>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            started_at: Instant::now(),
            elapsed_secs: AtomicU64::new(0),
            pages_parsed: AtomicUsize::new(0),
            deepest_depth: AtomicUsize::new(0),
            stop_reason: OnceLock::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Signals every task to stop. Only the first reason is kept.
    pub fn stop(&self, reason: StopReason) {
        let _ = self.stop_reason.set(reason);
        self.token.cancel();
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason.get().copied()
    }

    /// A clone of the stop signal, for awaiting `cancelled()`.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Refreshes the elapsed-seconds counter from the run's start instant.
    /// Deriving it from a clock means a late tick never loses a second.
    pub fn tick(&self) -> u64 {
        let secs = self.started_at.elapsed().as_secs();
        self.elapsed_secs.fetch_max(secs, Ordering::AcqRel).max(secs)
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs.load(Ordering::Acquire)
    }

    pub fn page_parsed(&self) {
        self.pages_parsed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pages_parsed(&self) -> usize {
        self.pages_parsed.load(Ordering::Relaxed)
    }

    pub fn observe_depth(&self, depth: usize) {
        self.deepest_depth.fetch_max(depth, Ordering::Relaxed);
    }

    pub fn deepest_depth(&self) -> usize {
        self.deepest_depth.load(Ordering::Relaxed)
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}
