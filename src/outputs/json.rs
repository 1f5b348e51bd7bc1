//! JSON output for scraped records.
//!
//! News items are written as an array of objects carrying a 1-based `id`
//! alongside headline/content/link; weather readings serialize through their
//! `type`-tagged representation. Output is pretty-printed.

use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

use crate::models::{ExtractedItem, ScrapedRecords};

/// A news item with its position in the run, as written to JSON.
#[derive(Debug, Serialize)]
struct NewsRow<'a> {
    id: usize,
    headline: &'a str,
    content: &'a str,
    link: &'a str,
}

fn news_rows(items: &[ExtractedItem]) -> Vec<NewsRow<'_>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| NewsRow {
            id: i + 1,
            headline: &item.headline,
            content: &item.content,
            link: &item.link,
        })
        .collect()
}

/// Serialize `records` to pretty JSON.
pub fn to_json(records: &ScrapedRecords) -> Result<String, serde_json::Error> {
    match records {
        ScrapedRecords::News(items) => serde_json::to_string_pretty(&news_rows(items)),
        ScrapedRecords::Weather(readings) => serde_json::to_string_pretty(readings),
    }
}

/// Write `records` as JSON to `path`, creating parent directories as needed.
#[instrument(level = "info", skip(records), fields(path = %path.display()))]
pub async fn write_records(records: &ScrapedRecords, path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).await?;
    }
    let json = to_json(records)?;
    fs::write(path, json).await?;
    info!(count = records.len(), "Wrote JSON records");
    Ok(())
}
