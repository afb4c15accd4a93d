// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Load settings, build the crawl configuration
// 3. Start the crawler and show live progress until it finishes
//    (or until Ctrl-C asks it to stop)
// 4. Print a summary and save the results
// 5. Exit with proper code (0 = success, 1 = page could not be fetched,
//    2 = error, 130 = interrupted twice)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bfs_crawler::crawl::{CrawlResults, Progress, StopReason};
use bfs_crawler::export::{self, ExportFormat};
use bfs_crawler::extract::{extract_anchors, extract_title, href_of, normalize, CrawlBase};
use bfs_crawler::{Crawler, Fetcher, HttpFetcher, Settings};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Crawl {
            seed_url,
            workers,
            max_depth,
            time_limit,
            output,
            format,
            config,
            json,
            quiet,
        } => {
            let settings = load_settings(config.as_deref())?;
            let options = CrawlOptions {
                workers,
                max_depth,
                time_limit,
                output,
                format,
                json,
                quiet,
            };
            handle_crawl(&seed_url, &settings, options).await
        }
        Commands::Links { url, json, config } => {
            let settings = load_settings(config.as_deref())?;
            handle_links(&url, &settings, json).await
        }
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

// An explicitly given settings file must load; without one we use defaults
fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(Settings::default()),
    }
}

fn http_fetcher(settings: &Settings) -> Result<HttpFetcher> {
    HttpFetcher::new(&settings.http.user_agent, settings.http.timeout())
        .context("Failed to create HTTP client")
}

// Command-line overrides for one crawl
struct CrawlOptions {
    workers: Option<usize>,
    max_depth: Option<usize>,
    time_limit: Option<u64>,
    output: Option<PathBuf>,
    format: Option<ExportFormat>,
    json: bool,
    quiet: bool,
}

// Handles the 'crawl' subcommand
async fn handle_crawl(seed_url: &str, settings: &Settings, options: CrawlOptions) -> Result<i32> {
    let mut config = settings.crawl_config(seed_url);
    if let Some(workers) = options.workers {
        config.workers = workers;
    }
    if options.max_depth.is_some() {
        config.max_depth = options.max_depth;
    }
    if options.time_limit.is_some() {
        config.time_limit_secs = options.time_limit;
    }

    let mut crawler = Crawler::new(Arc::new(http_fetcher(settings)?));

    if !options.json {
        println!("🔍 Crawling: {}", seed_url);
        println!(
            "📊 Workers: {} | Max depth: {} | Time limit: {}",
            config.workers,
            config
                .max_depth
                .map_or_else(|| "unlimited".to_string(), |d| d.to_string()),
            config
                .time_limit_secs
                .map_or_else(|| "unlimited".to_string(), |s| format!("{}s", s)),
        );
    }

    // Invalid configuration is reported here, before any worker exists
    crawler.start(&config)?;

    let show_progress = !options.quiet && !options.json;
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    // One listener for the whole crawl
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;
    loop {
        tokio::select! {
            _ = crawler.wait() => break,
            _ = &mut ctrl_c => {
                println!("\n🛑 Stopping, letting in-flight pages finish (Ctrl-C again to quit)...");
                interrupted = true;
                break;
            }
            _ = ticker.tick() => {
                if show_progress {
                    print_progress(&crawler.progress());
                }
            }
        }
    }

    // A (second) Ctrl-C while in-flight pages finish quits right away
    let next_ctrl_c = async {
        if interrupted {
            let _ = tokio::signal::ctrl_c().await;
        } else {
            let _ = ctrl_c.as_mut().await;
        }
    };
    let reason = match stop_unless_interrupted(&mut crawler, next_ctrl_c).await {
        Some(reason) => reason,
        None => {
            eprintln!("\n🛑 Interrupted, exiting without waiting for in-flight pages");
            return Ok(130);
        }
    };
    let progress = crawler.progress();
    let results = crawler.export()?;

    if options.json {
        print_json_summary(reason, &progress, &results)?;
    } else {
        if show_progress {
            print_progress(&progress);
            println!();
        }
        print_table(&results);
        print_summary(reason, &progress);
    }

    if let Some(path) = &options.output {
        let format = options
            .format
            .unwrap_or_else(|| ExportFormat::from_path(path));
        export::save_results(&results, path, format)
            .with_context(|| format!("Failed to save results to {}", path.display()))?;
        if !options.json {
            println!("💾 Output saved to {}", path.display());
        }
    }

    Ok(0)
}

// Stops the crawl and waits for its workers, unless `interrupt` fires first.
// Returns None when interrupted.
async fn stop_unless_interrupted(
    crawler: &mut Crawler,
    interrupt: impl Future<Output = ()>,
) -> Option<Option<StopReason>> {
    tokio::select! {
        reason = crawler.stop() => Some(reason),
        _ = interrupt => None,
    }
}

// Handles the 'links' subcommand
async fn handle_links(url: &str, settings: &Settings, json: bool) -> Result<i32> {
    let base = CrawlBase::from_seed(url)?;
    let fetcher = http_fetcher(settings)?;

    let page = match fetcher.fetch(url).await {
        Ok(page) => page,
        Err(e) => {
            eprintln!("❌ Could not fetch {}: {}", url, e);
            return Ok(1);
        }
    };

    let title = extract_title(&page.body);
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for anchor in extract_anchors(&page.body, 0) {
        match normalize(&anchor.fragment, &base) {
            Ok(link) => accepted.push(link),
            Err(reason) => rejected.push((
                href_of(&anchor.fragment).unwrap_or("").to_string(),
                reason.to_string(),
            )),
        }
    }

    if json {
        let output = serde_json::json!({
            "url": url,
            "title": title,
            "links": accepted,
            "rejected": rejected
                .iter()
                .map(|(href, reason)| serde_json::json!({ "href": href, "reason": reason }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("📄 {}", title.as_deref().unwrap_or("(no title)"));
        println!("🔗 {} link(s) to follow:", accepted.len());
        for link in &accepted {
            println!("   {}", link);
        }
        if !rejected.is_empty() {
            println!("🚫 {} anchor(s) skipped:", rejected.len());
            for (href, reason) in &rejected {
                println!("   {:<50} {}", href, reason);
            }
        }
    }

    Ok(0)
}

// Formats seconds the way a stopwatch shows them: h:mm:ss
fn format_elapsed(total_secs: u64) -> String {
    format!(
        "{}:{:02}:{:02}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60
    )
}

// Rewrites the same terminal line every second
fn print_progress(progress: &Progress) {
    print!(
        "\r⏱️  {}   📄 {} page(s) parsed   🗂️  {} queued   🔎 depth {}",
        format_elapsed(progress.elapsed_secs),
        progress.pages_parsed,
        progress.queued,
        progress.deepest_depth
    );
    let _ = std::io::stdout().flush();
}

// Prints results as a human-readable table in the terminal
fn print_table(results: &CrawlResults) {
    if results.is_empty() {
        println!("⚠️  No pages were parsed");
        return;
    }

    println!();
    println!("{:<70} {:<40}", "URL", "TITLE");
    println!("{}", "=".repeat(110));

    for (url, title) in results {
        // Truncate URL if too long for display
        let url_display = if url.chars().count() > 67 {
            format!("{}...", url.chars().take(67).collect::<String>())
        } else {
            url.clone()
        };
        println!("{:<70} {:<40}", url_display, title.as_deref().unwrap_or("-"));
    }

    println!();
}

fn print_summary(reason: Option<StopReason>, progress: &Progress) {
    println!("📊 Summary:");
    println!(
        "   🏁 Stopped: {}",
        reason.map_or_else(|| "unknown".to_string(), |r| r.to_string())
    );
    println!("   ⏱️  Elapsed: {}", format_elapsed(progress.elapsed_secs));
    println!("   📄 Pages parsed: {}", progress.pages_parsed);
    println!("   🔗 URLs visited: {}", progress.visited);
    println!("   🔎 Deepest depth seen: {}", progress.deepest_depth);
}

fn print_json_summary(
    reason: Option<StopReason>,
    progress: &Progress,
    results: &CrawlResults,
) -> Result<()> {
    let output = serde_json::json!({
        "stop_reason": reason,
        "progress": progress,
        "results": results,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
