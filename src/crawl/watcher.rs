// src/crawl/watcher.rs
// =============================================================================
// The termination watcher: decides when a run is over.
//
// It wakes up every few milliseconds and checks, in this order:
// 1. Time limit: if one is set and the elapsed seconds reached it, stop.
// 2. Idle frontier: if nothing is queued and no worker holds a task, count a
//    "strike". After `idle_debounce` strikes in a row, the crawl is done.
//    Any busy observation resets the count to zero.
//
// Stopping only flips the shared signal. Workers notice it at the top of
// their loop, so a fetch that is already running is allowed to finish.
// =============================================================================

use std::sync::Arc;

use log::info;

use super::state::StopReason;
use super::Shared;
use crate::config::Tuning;

pub(crate) async fn run_watcher(shared: Arc<Shared>, time_limit_secs: Option<u64>, tuning: Tuning) {
    let mut idle_strikes: u32 = 0;

    while shared.run.is_running() {
        let elapsed = shared.run.tick();

        if let Some(limit) = time_limit_secs {
            if elapsed >= limit {
                info!("Time limit reached ({}s).", limit);
                shared.run.stop(StopReason::TimeLimit);
                break;
            }
        }

        if shared.frontier.is_idle() {
            idle_strikes += 1;
            if idle_strikes >= tuning.idle_debounce {
                info!("All tasks completed.");
                shared.run.stop(StopReason::FrontierExhausted);
                break;
            }
        } else {
            idle_strikes = 0;
        }

        tokio::time::sleep(tuning.watch_interval).await;
    }

    // Freeze the clock at the moment the run stopped
    shared.run.tick();
}
