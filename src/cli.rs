//! Command-line interface definitions for newswatch.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Arguments can be provided via command-line flags or environment variables.

use clap::Parser;

/// Command-line arguments for the newswatch scraper.
///
/// # Examples
///
/// ```sh
/// # Scrape the built-in site registry into ./output
/// newswatch -o ./output
///
/// # Use a custom registry and rescrape everything regardless of the cache
/// newswatch -o ./output --sites sites.yaml --force
///
/// # Clear one source's cached fingerprint
/// newswatch --clear-cache fau
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for JSON/CSV files
    #[arg(short, long, env = "NEWSWATCH_OUTPUT_DIR", default_value = "./output")]
    pub output_dir: String,

    /// Directory holding the content-fingerprint cache
    #[arg(long, env = "NEWSWATCH_CACHE_DIR", default_value = ".cache")]
    pub cache_dir: String,

    /// Optional path to a YAML site registry (built-in sites when omitted)
    #[arg(short, long, env = "NEWSWATCH_SITES")]
    pub sites: Option<String>,

    /// Politeness delay between per-article enrichment fetches, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub item_delay_ms: u64,

    /// Delay between sources, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub source_delay_ms: u64,

    /// Scrape every source even when its content fingerprint is unchanged
    #[arg(short, long)]
    pub force: bool,

    /// Clear cached fingerprints and exit. With a SOURCE value, clears only
    /// that source; without one, clears all of them.
    #[arg(long, value_name = "SOURCE", num_args = 0..=1, default_missing_value = "")]
    pub clear_cache: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["newswatch"]);
        assert_eq!(cli.output_dir, "./output");
        assert_eq!(cli.cache_dir, ".cache");
        assert!(cli.sites.is_none());
        assert_eq!(cli.item_delay_ms, 500);
        assert_eq!(cli.source_delay_ms, 1000);
        assert!(!cli.force);
        assert!(cli.clear_cache.is_none());
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from(["newswatch", "-o", "/tmp/out", "-s", "sites.yaml", "-f"]);
        assert_eq!(cli.output_dir, "/tmp/out");
        assert_eq!(cli.sites.as_deref(), Some("sites.yaml"));
        assert!(cli.force);
    }

    #[test]
    fn test_zero_delays_allowed() {
        let cli = Cli::parse_from([
            "newswatch",
            "--item-delay-ms",
            "0",
            "--source-delay-ms",
            "0",
        ]);
        assert_eq!(cli.item_delay_ms, 0);
        assert_eq!(cli.source_delay_ms, 0);
    }

    #[test]
    fn test_clear_cache_with_and_without_source() {
        let cli = Cli::parse_from(["newswatch", "--clear-cache"]);
        assert_eq!(cli.clear_cache.as_deref(), Some(""));

        let cli = Cli::parse_from(["newswatch", "--clear-cache", "fau"]);
        assert_eq!(cli.clear_cache.as_deref(), Some("fau"));
    }
}
