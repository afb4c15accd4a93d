// src/crawl/mod.rs
// =============================================================================
// This module is the concurrent crawl engine.
//
// Features:
// - Breadth-first crawling from a seed URL with a pool of N workers
// - Each URL is fetched at most once, even when workers race on it
// - Optional depth limit and optional time limit
// - Automatic completion once the frontier stays empty and idle
// - Cooperative stop: in-flight fetches finish, nothing is aborted
//
// Submodules:
// - frontier: the task queue + visited set (one critical section)
// - state:    result map, run flag, progress counters
// - worker:   the worker loop
// - watcher:  the termination watcher
// - engine:   Crawler, the start/stop/progress/export handle
// =============================================================================

mod engine;
mod frontier;
mod state;
mod watcher;
mod worker;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::Crawler;
pub use frontier::{Admission, Frontier, Task};
pub use state::{CrawlResults, Progress, ResultMap, RunState, StopReason};

use crate::extract::CrawlBase;

// Everything the workers and the watcher of one run share.
// Built fresh by Crawler::start and handed to every task as Arc<Shared>.
#[derive(Debug)]
pub(crate) struct Shared {
    pub base: CrawlBase,
    pub frontier: Frontier,
    pub results: ResultMap,
    pub run: RunState,
}

impl Shared {
    pub fn new(base: CrawlBase, max_depth: Option<usize>) -> Self {
        Self {
            base,
            frontier: Frontier::new(max_depth),
            results: ResultMap::new(),
            run: RunState::new(),
        }
    }

    pub fn progress(&self) -> Progress {
        Progress {
            running: self.run.is_running(),
            elapsed_secs: self.run.elapsed_secs(),
            pages_parsed: self.run.pages_parsed(),
            deepest_depth: self.run.deepest_depth(),
            queued: self.frontier.len(),
            visited: self.frontier.visited_count(),
        }
    }
}
