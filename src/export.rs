// src/export.rs
// =============================================================================
// Saves the crawl results (URL -> title) to a file.
//
// Two formats:
// - text: two lines per page, the URL then the title (empty line when the
//         page had no title)
// - json: one object, {"url": "title" | null, ...}, pretty-printed
//
// Entries come from a BTreeMap, so both formats are sorted by URL.
// =============================================================================

use clap::ValueEnum;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::crawl::CrawlResults;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Text,
    Json,
}

impl ExportFormat {
    /// JSON for `*.json` paths, text for everything else.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Text,
        }
    }
}

// Writes the results in the given format
pub fn write_results(results: &CrawlResults, writer: impl Write, format: ExportFormat) -> Result<()> {
    let mut writer = BufWriter::new(writer);

    match format {
        ExportFormat::Text => {
            for (url, title) in results {
                writeln!(writer, "{}", url)?;
                writeln!(writer, "{}", title.as_deref().unwrap_or(""))?;
            }
        }
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, results)?;
            writeln!(writer)?;
        }
    }

    writer.flush()?;
    Ok(())
}

// Creates (or truncates) the file at `path` and writes the results into it
pub fn save_results(results: &CrawlResults, path: &Path, format: ExportFormat) -> Result<()> {
    let file = File::create(path)?;
    write_results(results, file, format)?;
    log::info!("Output saved to {}", path.display());
    Ok(())
}
