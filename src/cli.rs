// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - crawl: run a breadth-first crawl from a seed URL
// - links: fetch ONE page and show what the crawler would do with it
//          (its title and the normalized links it would enqueue)
//
// Crawl options left out on the command line fall back to the settings file
// (--config), and then to built-in defaults.
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use bfs_crawler::export::ExportFormat;

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "bfs-crawler",
    version,
    about = "A concurrent breadth-first web crawler that records page titles",
    long_about = "bfs-crawler crawls a website breadth-first from a seed URL with a pool of \
                  workers, bounded by an optional depth and/or time limit, and saves the title \
                  of every page it parsed."
)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website breadth-first, starting from a seed URL
    ///
    /// Example: bfs-crawler crawl https://example.com --max-depth 2 --time-limit 30
    Crawl {
        /// Seed URL (e.g., https://example.com/)
        seed_url: String,

        /// Number of concurrent workers (default: 5)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Maximum link depth; the seed is depth 0 (default: unlimited)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Stop after this many seconds (default: unlimited)
        #[arg(long)]
        time_limit: Option<u64>,

        /// Save the URL -> title results to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file format (default: json for *.json files, text otherwise)
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,

        /// Settings file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the results and summary as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Don't print the live progress line
        #[arg(short, long)]
        quiet: bool,
    },

    /// Fetch a single page and list the links the crawler would follow
    ///
    /// Example: bfs-crawler links https://example.com
    Links {
        /// Page URL
        url: String,

        /// Output in JSON format instead of a list
        #[arg(long)]
        json: bool,

        /// Settings file (TOML), for the HTTP options
        #[arg(long)]
        config: Option<PathBuf>,
    },
}
