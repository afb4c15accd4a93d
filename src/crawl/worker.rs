// src/crawl/worker.rs
// =============================================================================
// One crawl worker. The pool is just N copies of this loop.
//
// While the run is active:
// 1. Take the next task from the frontier
//    - nothing there? sleep a little (the backoff) and try again
// 2. Fetch the page
//    - failed, or not HTML? drop the task; its URL stays visited so it is
//      never tried again
// 3. Record the title, count the page as parsed
// 4. Extract anchors, normalize them, and offer each to the frontier at
//    depth + 1 (the frontier decides what is new and shallow enough)
//
// Workers never talk to each other; they only meet inside the frontier
// and the result map.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace};

use super::frontier::{Frontier, Task};
use super::Shared;
use crate::extract::{extract_anchors, extract_title, normalize};
use crate::fetch::Fetcher;

// Marks the task complete when dropped, even if processing bails out early
struct InFlight<'a> {
    frontier: &'a Frontier,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.frontier.complete();
    }
}

pub(crate) async fn run_worker(
    id: usize,
    shared: Arc<Shared>,
    fetcher: Arc<dyn Fetcher>,
    backoff: Duration,
) {
    debug!("worker-{} started", id);
    let stop = shared.run.token();

    while shared.run.is_running() {
        let task = match shared.frontier.try_dequeue() {
            Some(task) => task,
            None => {
                // Wake early if the run stops while we wait
                tokio::select! {
                    _ = stop.cancelled() => {}
                    _ = tokio::time::sleep(backoff) => {}
                }
                continue;
            }
        };

        let _in_flight = InFlight {
            frontier: &shared.frontier,
        };
        trace!(
            "worker-{} took {} (depth {}), {} remaining",
            id,
            task.url,
            task.depth,
            shared.frontier.len()
        );
        process_task(&shared, fetcher.as_ref(), &task).await;
    }

    debug!("worker-{} finished", id);
}

// Processes one task from fetch to enqueued children
//
// Returns the number of child URLs admitted to the frontier
pub(crate) async fn process_task(shared: &Shared, fetcher: &dyn Fetcher, task: &Task) -> usize {
    let page = match fetcher.fetch(&task.url).await {
        Ok(page) if page.is_html() => page,
        Ok(page) => {
            debug!(
                "dropping {}: not HTML ({})",
                task.url,
                page.content_type.as_deref().unwrap_or("no content type")
            );
            return 0;
        }
        Err(e) => {
            debug!("dropping {}: {}", task.url, e);
            return 0;
        }
    };

    let title = extract_title(&page.body);
    if shared.results.record(&task.url, title) {
        shared.run.page_parsed();
    }

    let anchors = extract_anchors(&page.body, task.depth);
    shared.run.observe_depth(task.depth + 1);

    let mut admitted = 0;
    for anchor in anchors {
        match normalize(&anchor.fragment, &shared.base) {
            Ok(url) => {
                if shared.frontier.try_enqueue(url.as_str(), anchor.depth).is_admitted() {
                    trace!("admitted {} (depth {})", url, anchor.depth);
                    admitted += 1;
                }
            }
            Err(reason) => trace!("skipping {}: {}", anchor.fragment, reason),
        }
    }

    debug!(
        "crawled {} (depth {}): {} new link(s)",
        task.url, task.depth, admitted
    );
    admitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::test_support::MapFetcher;
    use crate::extract::CrawlBase;
    use crate::fetch::Page;

    fn shared(max_depth: Option<usize>) -> Shared {
        Shared::new(CrawlBase::new("https://a.test", "https:"), max_depth)
    }

    #[tokio::test]
    async fn test_process_task_records_title_and_children() {
        let fetcher = MapFetcher::new().page(
            "https://a.test/",
            "<title>Home</title><a href=\"/a\">a</a><a href='b'>b</a><a href=\"#top\">top</a>",
        );
        let shared = shared(None);
        let task = Task {
            url: "https://a.test/".to_string(),
            depth: 0,
        };

        let admitted = process_task(&shared, &fetcher, &task).await;

        assert_eq!(admitted, 2);
        assert_eq!(shared.run.pages_parsed(), 1);
        assert_eq!(shared.run.deepest_depth(), 1);
        assert_eq!(
            shared.results.snapshot().get("https://a.test/"),
            Some(&Some("Home".to_string()))
        );
        assert!(shared.frontier.is_visited("https://a.test/a"));
        assert!(shared.frontier.is_visited("https://a.test/b"));
    }

    #[tokio::test]
    async fn test_children_beyond_max_depth_are_not_admitted() {
        let fetcher = MapFetcher::new().page("https://a.test/p1", "<a href=\"/deeper\">x</a>");
        let shared = shared(Some(1));
        let task = Task {
            url: "https://a.test/p1".to_string(),
            depth: 1,
        };

        assert_eq!(process_task(&shared, &fetcher, &task).await, 0);
        assert!(shared.frontier.is_empty());
        assert!(!shared.frontier.is_visited("https://a.test/deeper"));
    }

    #[tokio::test]
    async fn test_failed_and_non_html_fetches_are_dropped() {
        let fetcher = MapFetcher::new().raw(
            "https://a.test/logo.png",
            Page {
                content_type: Some("image/png".to_string()),
                body: "<a href=\"/hidden\">".to_string(),
            },
        );
        let shared = shared(None);

        for url in ["https://a.test/logo.png", "https://a.test/missing"] {
            let task = Task {
                url: url.to_string(),
                depth: 0,
            };
            assert_eq!(process_task(&shared, &fetcher, &task).await, 0);
        }

        assert!(shared.results.is_empty());
        assert_eq!(shared.run.pages_parsed(), 0);
        assert!(shared.frontier.is_empty());
    }

    #[tokio::test]
    async fn test_page_without_title_is_still_recorded() {
        let fetcher = MapFetcher::new().page("https://a.test/plain", "<p>hello</p>");
        let shared = shared(None);
        let task = Task {
            url: "https://a.test/plain".to_string(),
            depth: 0,
        };

        process_task(&shared, &fetcher, &task).await;

        assert_eq!(shared.results.snapshot().get("https://a.test/plain"), Some(&None));
        assert_eq!(shared.run.pages_parsed(), 1);
    }
}
