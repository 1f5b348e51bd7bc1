//! Data models for scraped records.
//!
//! This module defines the core data structures used throughout the application:
//! - [`ExtractedItem`]: A single news item (headline, content, link)
//! - [`WeatherReading`]: A tagged weather observation (current/today/forecast)
//! - [`ScrapedRecords`]: What one source produced in one run
//! - [`RunSummary`]: Per-run counters reported at exit
//!
//! Temperature fields are kept as free-text tokens (e.g. `"82°F"`) rather than
//! parsed numerics; the supported pages are too inconsistent to normalize.

use serde::{Deserialize, Serialize};

/// A single news item extracted from a listing page.
///
/// Invariants maintained by the extractor:
/// - `headline` is non-empty trimmed text
/// - `link` is absolute by the time the item leaves the extractor, or empty
///   when the headline had no anchor at all
/// - `content` falls back to the listing-page teaser when full-article
///   enrichment fails or yields nothing better
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtractedItem {
    /// The headline text.
    pub headline: String,
    /// Cleaned prose, possibly multi-paragraph.
    pub content: String,
    /// Absolute article URL, or `""` for linkless headlines.
    pub link: String,
}

/// One structured reading extracted from a weather page.
///
/// Serialized with a `type` tag (`current`, `today`, `forecast`) so the JSON
/// output matches the flat record shape the writers expect.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WeatherReading {
    /// Conditions at capture time.
    Current {
        /// Free-text temperature token, e.g. `"82°F"`.
        temperature: String,
        /// Condition phrase, e.g. `"Partly sunny"`. May be empty.
        condition: String,
        /// RealFeel token when the page exposes one.
        #[serde(
            rename = "realFeel",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        real_feel: Option<String>,
        /// Capture timestamp, RFC 3339.
        timestamp: String,
    },
    /// Today's high/low.
    Today {
        high: String,
        low: String,
        /// Today's calendar date, `YYYY-MM-DD`.
        date: String,
    },
    /// One day of the multi-day forecast.
    Forecast {
        /// Day label as printed on the page, e.g. `"TONIGHT"` or `"WED"`.
        day: String,
        /// Derived calendar date: capture date + 1-based position in the
        /// sequence. A positional approximation, not a parsed date.
        date: String,
        high: String,
        low: String,
        /// Condition phrase when the forecast card exposes one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<String>,
    },
}

/// Everything one source produced in one run.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapedRecords {
    News(Vec<ExtractedItem>),
    Weather(Vec<WeatherReading>),
}

impl ScrapedRecords {
    /// Number of records, regardless of kind.
    pub fn len(&self) -> usize {
        match self {
            ScrapedRecords::News(items) => items.len(),
            ScrapedRecords::Weather(readings) => readings.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Sources that were scraped and produced output files.
    pub processed: usize,
    /// Sources skipped because their raw content was unchanged.
    pub skipped: usize,
    /// Total configured sources.
    pub total: usize,
}
