// src/crawl/frontier.rs
// =============================================================================
// The frontier: the queue of pages still to crawl, plus the set of every URL
// that was ever scheduled.
//
// Both live behind ONE mutex on purpose. Admitting a URL is
//     "not visited yet?" -> "mark visited" -> "push to queue"
// and those three steps must happen as one. If two workers discover the same
// link at the same moment, exactly one of them gets Admission::Admitted.
//
// The frontier also counts tasks "in flight": taken by a worker but not yet
// finished. A queue that is empty while a worker is still fetching a page
// is not the end of the crawl, because that page may add more links.
// =============================================================================

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

// One unit of work: fetch this URL, which was found at this depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub url: String,
    pub depth: usize,
}

/// Outcome of [`Frontier::try_enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The URL was new; it is now visited and queued
    Admitted,
    /// The URL was scheduled before (first admission wins)
    AlreadyVisited,
    /// The depth is beyond the configured maximum
    TooDeep,
}

impl Admission {
    pub fn is_admitted(self) -> bool {
        self == Admission::Admitted
    }
}

#[derive(Debug, Default)]
struct Inner {
    queue: VecDeque<Task>,
    visited: HashSet<String>,
    in_flight: usize,
}

#[derive(Debug)]
pub struct Frontier {
    max_depth: Option<usize>,
    inner: Mutex<Inner>,
}

impl Frontier {
    /// Creates an empty frontier. `None` means no depth limit.
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            max_depth,
            inner: Mutex::new(Inner::default()),
        }
    }

    // Nothing inside the lock can panic halfway through an update, so a
    // poisoned mutex still holds consistent data and we keep using it.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admits `url` at `depth` unless it was seen before or is too deep.
    pub fn try_enqueue(&self, url: impl Into<String>, depth: usize) -> Admission {
        if self.max_depth.map_or(false, |max| depth > max) {
            return Admission::TooDeep;
        }

        let url = url.into();
        let mut inner = self.lock();

        if inner.visited.contains(&url) {
            return Admission::AlreadyVisited;
        }

        inner.visited.insert(url.clone());
        inner.queue.push_back(Task { url, depth });
        Admission::Admitted
    }

    /// Takes the oldest task, if any. The task counts as in flight until
    /// [`Frontier::complete`] is called for it.
    pub fn try_dequeue(&self) -> Option<Task> {
        let mut inner = self.lock();
        let task = inner.queue.pop_front()?;
        inner.in_flight += 1;
        Some(task)
    }

    /// Marks one dequeued task as fully processed.
    pub fn complete(&self) {
        let mut inner = self.lock();
        inner.in_flight = inner.in_flight.saturating_sub(1);
    }

    /// True when nothing is queued and no worker is processing a task.
    pub fn is_idle(&self) -> bool {
        let inner = self.lock();
        inner.queue.is_empty() && inner.in_flight == 0
    }

    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    pub fn visited_count(&self) -> usize {
        self.lock().visited.len()
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.lock().visited.contains(url)
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why std::sync::Mutex and not tokio::sync::Mutex?
//    - We never hold the lock across an .await
//    - Every critical section is a few HashSet/VecDeque operations
//    - A std mutex is cheaper for short sections like these, and it can
//      also be used from plain threads (the stress test below does that)
//
// 2. What is lock poisoning?
//    - If a thread panics while holding a std Mutex, the mutex is "poisoned"
//    - lock() then returns Err so you notice
//    - PoisonError::into_inner gives the guard back anyway
//
// 3. Why VecDeque?
//    - push_back() + pop_front() = first in, first out
//    - Children are always one level deeper than their parent and are pushed
//      after the parent was popped, so FIFO gives breadth-first order
// -----------------------------------------------------------------------------
