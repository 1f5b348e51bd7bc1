//! Change detection: per-source content fingerprints across runs.
//!
//! The cache maps source names to SHA-256 digests of the exact raw markup
//! fetched, stored as a JSON object in `<cache_dir>/content-hashes.json`.
//! Fingerprinting raw bytes rather than extracted items means even a
//! whitespace-only upstream change triggers a re-scrape; that is the intended
//! conservative staleness check.
//!
//! The cache fails open: an unreadable or missing store reads as "changed"
//! for every source, and a failed persist is logged but never fails the run.
//! A corrupted cache can therefore cost a redundant scrape, never suppress
//! one.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

const CACHE_FILE: &str = "content-hashes.json";

/// Durable per-source fingerprint store.
#[derive(Debug, Clone)]
pub struct ChangeCache {
    cache_file: PathBuf,
}

/// SHA-256 hex digest of raw content.
pub fn fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest.iter() {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

impl ChangeCache {
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        Self {
            cache_file: cache_dir.as_ref().join(CACHE_FILE),
        }
    }

    /// Read the whole store. Any failure is treated as an empty store.
    async fn read_store(&self) -> HashMap<String, String> {
        match fs::read_to_string(&self.cache_file).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(store) => store,
                Err(e) => {
                    warn!(path = %self.cache_file.display(), error = %e,
                          "Cache file unparseable; treating as empty");
                    HashMap::new()
                }
            },
            Err(e) => {
                debug!(path = %self.cache_file.display(), error = %e,
                       "Cache file unreadable; treating as empty");
                HashMap::new()
            }
        }
    }

    async fn write_store(&self, store: &HashMap<String, String>) -> std::io::Result<()> {
        if let Some(dir) = self.cache_file.parent() {
            fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_string_pretty(store).expect("string map serializes");
        fs::write(&self.cache_file, json).await
    }

    /// Whether `raw_content` differs from the last fingerprint stored for
    /// `source_name`. An absent entry (or an unreadable store) is "changed".
    #[instrument(level = "debug", skip(self, raw_content))]
    pub async fn has_changed(&self, source_name: &str, raw_content: &str) -> bool {
        let store = self.read_store().await;
        let current = fingerprint(raw_content);
        let changed = store.get(source_name) != Some(&current);
        debug!(source_name, changed, "Cache comparison");
        changed
    }

    /// Store the fingerprint of `raw_content` under `source_name`, durably,
    /// immediately. Persist failure is logged and non-fatal; the next run
    /// will simply re-detect a change.
    #[instrument(level = "debug", skip(self, raw_content))]
    pub async fn update(&self, source_name: &str, raw_content: &str) {
        let mut store = self.read_store().await;
        store.insert(source_name.to_string(), fingerprint(raw_content));
        match self.write_store(&store).await {
            Ok(()) => info!(source_name, "Cache updated"),
            Err(e) => warn!(source_name, error = %e, "Failed to persist cache update"),
        }
    }

    /// Remove one stored fingerprint, or all of them.
    #[instrument(level = "info", skip(self))]
    pub async fn clear(&self, source_name: Option<&str>) {
        match source_name {
            Some(name) => {
                let mut store = self.read_store().await;
                store.remove(name);
                if let Err(e) = self.write_store(&store).await {
                    warn!(name, error = %e, "Failed to persist cache clear");
                } else {
                    info!(name, "Cache cleared for source");
                }
            }
            None => {
                if let Err(e) = self.write_store(&HashMap::new()).await {
                    warn!(error = %e, "Failed to persist cache clear");
                } else {
                    info!("All cache entries cleared");
                }
            }
        }
    }
}
