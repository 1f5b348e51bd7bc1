//! Helpers for file naming, string truncation, and output directory checks.

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

use crate::config::{SiteDescriptor, SiteKind};

/// Convert a source name to a file-name slug: lowercased, with everything
/// that is not alphanumeric or a hyphen stripped.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify_source("FAU Research"), "fauresearch");
/// assert_eq!(slugify_source("wptv-local"), "wptv-local");
/// ```
pub fn slugify_source(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect()
}

/// Output file stem for a source: slug plus a kind-specific suffix.
pub fn output_basename(site: &SiteDescriptor) -> String {
    let suffix = match site.kind {
        SiteKind::News => "headlines",
        SiteKind::Weather => "weather",
    };
    format!("{}-{}", slugify_source(&site.name), suffix)
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes with an ellipsis and byte count
/// indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then performs a write test by creating
/// and immediately deleting a probe file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
