//! # newswatch
//!
//! A polling scraper that fetches a configurable set of news and weather
//! pages, extracts structured items from their markup, enriches news items
//! with full-article text where a link is available, skips sources whose raw
//! content is unchanged since the last run, and writes results as JSON and
//! CSV files.
//!
//! ## Usage
//!
//! ```sh
//! newswatch -o ./output
//! newswatch -o ./output --sites sites.yaml --force
//! ```
//!
//! ## Architecture
//!
//! Sources are processed strictly one at a time, in configured order:
//! 1. **Policy**: robots.txt allow/deny check (fail-open)
//! 2. **Fetch**: download the listing page (failure is fatal to that source only)
//! 3. **Change detection**: skip the source when its content fingerprint matches
//! 4. **Extraction**: headline items or weather readings, with per-item enrichment
//! 5. **Output**: JSON + CSV files, then the cache fingerprint is updated

use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cache;
mod cli;
mod config;
mod extract;
mod fetch;
mod models;
mod outputs;
mod robots;
mod utils;

use cache::ChangeCache;
use cli::Cli;
use config::SiteDescriptor;
use extract::items::ItemExtractor;
use fetch::{FetchPage, HttpFetcher, RetryFetch};
use models::RunSummary;
use utils::ensure_writable_dir;

/// How one source ended up after its turn in the loop.
#[derive(Debug)]
enum SourceOutcome {
    /// Records were extracted and written; the cache was updated.
    Processed(usize),
    /// Raw content fingerprint unchanged since the last successful run.
    SkippedUnchanged,
    /// Extraction found zero items; nothing written, cache untouched.
    Empty,
    /// robots.txt denied the listing URL.
    Disallowed,
}

/// Run the full pipeline for a single source.
///
/// Everything that can go wrong here is fatal to this source only; the
/// caller logs the error and moves on to the next source.
#[instrument(level = "info", skip_all, fields(site = %site.name))]
async fn process_source<F: FetchPage, R: FetchPage>(
    site: &SiteDescriptor,
    fetcher: &F,
    robots_fetcher: &R,
    extractor: &ItemExtractor<'_, F>,
    cache: &ChangeCache,
    args: &Cli,
) -> Result<SourceOutcome, Box<dyn Error>> {
    // The robots probe is a single shot: a site without robots.txt is the
    // common case, and riding the retry backoff would stall every source.
    if !robots::is_allowed(robots_fetcher, &site.url).await {
        return Ok(SourceOutcome::Disallowed);
    }

    let markup = fetcher.fetch(&site.url).await?;
    debug!(
        bytes = markup.len(),
        preview = %utils::truncate_for_log(&markup, 120),
        "Fetched listing page"
    );

    if !args.force && !cache.has_changed(&site.name, &markup).await {
        return Ok(SourceOutcome::SkippedUnchanged);
    }

    let records = extractor.extract(&markup, site).await;
    if records.is_empty() {
        return Ok(SourceOutcome::Empty);
    }

    let base = utils::output_basename(site);
    let out_dir = Path::new(&args.output_dir);
    outputs::json::write_records(&records, &out_dir.join(format!("{base}.json"))).await?;
    outputs::csv::write_records(&records, &out_dir.join(format!("{base}.csv"))).await?;

    // Only a fully successful source advances its fingerprint.
    cache.update(&site.name, &markup).await;

    Ok(SourceOutcome::Processed(records.len()))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("newswatch starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let cache = ChangeCache::new(&args.cache_dir);

    // Maintenance path: clear fingerprints and exit.
    if let Some(target) = &args.clear_cache {
        cache
            .clear((!target.is_empty()).then_some(target.as_str()))
            .await;
        return Ok(());
    }

    // Early check: ensure the output dir is writable before any scraping.
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let sites = config::load_sites(args.sites.as_deref()).await?;
    let probe_fetcher = HttpFetcher::new()?;
    let fetcher = RetryFetch::new(probe_fetcher.clone(), 3, Duration::from_secs(1));
    let extractor = ItemExtractor::new(&fetcher, Duration::from_millis(args.item_delay_ms));

    let mut summary = RunSummary {
        total: sites.len(),
        ..Default::default()
    };

    for (i, site) in sites.iter().enumerate() {
        match process_source(site, &fetcher, &probe_fetcher, &extractor, &cache, &args).await {
            Ok(SourceOutcome::Processed(count)) => {
                info!(site = %site.name, count, "Source processed");
                summary.processed += 1;
            }
            Ok(SourceOutcome::SkippedUnchanged) => {
                info!(site = %site.name, "Content unchanged since last run; skipping");
                summary.skipped += 1;
            }
            Ok(SourceOutcome::Empty) => {
                info!(site = %site.name, "No items extracted; nothing written");
            }
            Ok(SourceOutcome::Disallowed) => {
                warn!(site = %site.name, url = %site.url, "Blocked by robots.txt; skipping");
            }
            Err(e) => {
                error!(site = %site.name, error = %e, "Source failed; continuing with next");
            }
        }

        // Politeness pause between sources.
        if i + 1 < sites.len() && args.source_delay_ms > 0 {
            sleep(Duration::from_millis(args.source_delay_ms)).await;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        processed = summary.processed,
        skipped = summary.skipped,
        total = summary.total,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Run complete"
    );

    Ok(())
}
