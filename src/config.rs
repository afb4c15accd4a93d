// src/config.rs
// =============================================================================
// Crawl configuration.
//
// Two layers:
// - Settings: what a user can put in an optional TOML file. Every field has
//   a default, so an empty file (or no file at all) is valid.
// - CrawlConfig: what one run of the crawler actually needs. It's built from
//   Settings + the seed URL, and checked by validate() before any task starts.
//
// Example crawl.toml:
//
//   workers = 8
//   max_depth = 2
//   time_limit_secs = 60
//
//   [http]
//   user_agent = "my-crawler/1.0"
//   timeout_secs = 10
//
//   [tuning]
//   backoff_ms = 250
//   watch_interval_ms = 1
//   idle_debounce = 100
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{CrawlError, Result};
use crate::extract::CrawlBase;
use crate::fetch::DEFAULT_USER_AGENT;

// Timing knobs of the worker pool and the termination watcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuning {
    /// How long an idle worker sleeps before polling the frontier again
    pub backoff: Duration,
    /// How often the watcher looks at the clock and the frontier
    pub watch_interval: Duration,
    /// Consecutive idle observations before the crawl counts as finished
    pub idle_debounce: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            backoff: Duration::from_millis(defaults::backoff_ms()),
            watch_interval: Duration::from_millis(defaults::watch_interval_ms()),
            idle_debounce: defaults::idle_debounce(),
        }
    }
}

impl Tuning {
    // A zero interval would turn the worker or the watcher into a busy loop
    pub fn validate(&self) -> Result<()> {
        if self.backoff.is_zero() {
            return Err(CrawlError::InvalidTuning("backoff_ms"));
        }
        if self.watch_interval.is_zero() {
            return Err(CrawlError::InvalidTuning("watch_interval_ms"));
        }
        if self.idle_debounce == 0 {
            return Err(CrawlError::InvalidTuning("idle_debounce"));
        }
        Ok(())
    }
}

// Everything one crawl run needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    pub seed_url: String,
    pub workers: usize,
    /// None = no depth limit
    pub max_depth: Option<usize>,
    /// None = no time limit
    pub time_limit_secs: Option<u64>,
    pub tuning: Tuning,
}

impl CrawlConfig {
    /// A config with default worker count and no limits.
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            workers: defaults::workers(),
            max_depth: None,
            time_limit_secs: None,
            tuning: Tuning::default(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_time_limit(mut self, time_limit_secs: Option<u64>) -> Self {
        self.time_limit_secs = time_limit_secs;
        self
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Checks the config and derives the crawl base from the seed URL.
    ///
    /// This is the only place a crawl can fail: once workers are running,
    /// bad pages are skipped instead of reported.
    pub fn validate(&self) -> Result<CrawlBase> {
        if self.workers == 0 {
            return Err(CrawlError::InvalidWorkerCount);
        }
        if self.time_limit_secs == Some(0) {
            return Err(CrawlError::InvalidTimeLimit);
        }
        self.tuning.validate()?;
        CrawlBase::from_seed(&self.seed_url)
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout_secs(),
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuningSettings {
    #[serde(default = "defaults::backoff_ms")]
    pub backoff_ms: u64,

    #[serde(default = "defaults::watch_interval_ms")]
    pub watch_interval_ms: u64,

    #[serde(default = "defaults::idle_debounce")]
    pub idle_debounce: u32,
}

impl Default for TuningSettings {
    fn default() -> Self {
        Self {
            backoff_ms: defaults::backoff_ms(),
            watch_interval_ms: defaults::watch_interval_ms(),
            idle_debounce: defaults::idle_debounce(),
        }
    }
}

impl From<&TuningSettings> for Tuning {
    fn from(settings: &TuningSettings) -> Self {
        Self {
            backoff: Duration::from_millis(settings.backoff_ms),
            watch_interval: Duration::from_millis(settings.watch_interval_ms),
            idle_debounce: settings.idle_debounce,
        }
    }
}

/// Settings file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "defaults::workers")]
    pub workers: usize,

    #[serde(default)]
    pub max_depth: Option<usize>,

    #[serde(default)]
    pub time_limit_secs: Option<u64>,

    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub tuning: TuningSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workers: defaults::workers(),
            max_depth: None,
            time_limit_secs: None,
            http: HttpSettings::default(),
            tuning: TuningSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load settings or return defaults if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Settings load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Builds the config for a crawl starting at `seed_url`.
    pub fn crawl_config(&self, seed_url: impl Into<String>) -> CrawlConfig {
        CrawlConfig::new(seed_url)
            .with_workers(self.workers)
            .with_max_depth(self.max_depth)
            .with_time_limit(self.time_limit_secs)
            .with_tuning(Tuning::from(&self.tuning))
    }
}

mod defaults {
    use super::DEFAULT_USER_AGENT;

    pub fn workers() -> usize {
        5
    }

    pub fn user_agent() -> String {
        DEFAULT_USER_AGENT.to_string()
    }

    pub fn timeout_secs() -> u64 {
        10
    }

    pub fn backoff_ms() -> u64 {
        250
    }

    pub fn watch_interval_ms() -> u64 {
        1
    }

    pub fn idle_debounce() -> u32 {
        100
    }
}
