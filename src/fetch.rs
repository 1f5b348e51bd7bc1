//! Page fetching with exponential backoff retry logic.
//!
//! The module uses a trait-based design:
//! - [`FetchPage`]: core trait for turning a URL into raw markup
//! - [`HttpFetcher`]: reqwest-backed implementation
//! - [`RetryFetch`]: decorator adding retry logic to any [`FetchPage`]
//!
//! The extraction pipeline only ever sees the trait, so tests substitute
//! canned-markup fetchers and never touch the network.
//!
//! # Retry Strategy
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
//! ```

use rand::{Rng, rng};
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Trait for fetching raw markup from a URL.
///
/// Any failure (network, timeout, non-2xx status) surfaces as an error; the
/// caller decides whether that is fatal for the source or merely ends one
/// item's enrichment.
pub trait FetchPage {
    /// Fetch the page at `url` and return its raw markup.
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>>;
}

/// reqwest-backed [`FetchPage`] with a shared client, request timeout, and a
/// crate-versioned user agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let client = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(Self { client })
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`FetchPage`]
/// implementation.
///
/// Designed to ride out rate limiting and transient network or server
/// errors when fetching listing pages. Enrichment fetches do not use it;
/// a failed enrichment is already fully recovered by keeping the teaser.
pub struct RetryFetch<T> {
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: FetchPage,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> FetchPage for RetryFetch<T>
where
    T: FetchPage,
{
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                            error = %e,
                            "fetch() exhausted retries"
                        );
                        return Err(e);
                    }

                    // backoff calc
                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        ?delay,
                        error = %e,
                        "fetch() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FlakyFetcher, StubFetcher};
    use super::*;
    use std::cell::RefCell;

    #[tokio::test]
    async fn test_stub_fetcher_serves_and_records() {
        let fetcher = StubFetcher::new().with_page("https://example.com", "<html></html>");
        let body = fetcher.fetch("https://example.com").await.unwrap();
        assert_eq!(body, "<html></html>");
        assert!(fetcher.fetch("https://example.com/missing").await.is_err());
        assert_eq!(fetcher.requests.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failures() {
        let flaky = FlakyFetcher {
            failures_left: RefCell::new(2),
            body: "ok".to_string(),
        };
        let retry = RetryFetch::new(flaky, 3, StdDuration::from_millis(1));
        let body = retry.fetch("https://example.com").await.unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let flaky = FlakyFetcher {
            failures_left: RefCell::new(10),
            body: "never".to_string(),
        };
        let retry = RetryFetch::new(flaky, 2, StdDuration::from_millis(1));
        assert!(retry.fetch("https://example.com").await.is_err());
    }
}
