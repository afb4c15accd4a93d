// src/extract/mod.rs
// =============================================================================
// This module turns a downloaded page into crawl candidates.
//
// Submodules:
// - anchors: finds <a ...> tags and the <title> by pattern scanning
// - normalize: turns one raw <a ...> tag into an absolute URL (or rejects it)
//
// Both are pure functions: same input, same output, no shared state.
// The worker calls them while it processes a single page.
// =============================================================================

mod anchors;
mod normalize;

pub use anchors::{extract_anchors, extract_title, Anchor};
pub use normalize::{href_of, normalize, normalize_href, CrawlBase};
