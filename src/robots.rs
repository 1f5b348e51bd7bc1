//! robots.txt courtesy check.
//!
//! A pure allow/deny lookup keyed by URL: fetch the origin's robots.txt,
//! collect the `Disallow` rules in the `User-agent: *` group, and test the
//! URL path against them as prefixes. This is a courtesy check, not a
//! security boundary, so every failure mode (no robots.txt, fetch error,
//! unparseable URL) is allow-by-default.

use tracing::{debug, instrument, warn};
use url::Url;

use crate::fetch::FetchPage;

/// Disallowed path prefixes for the wildcard user agent.
fn wildcard_disallows(robots_txt: &str) -> Vec<String> {
    let mut in_wildcard_group = false;
    let mut disallows = Vec::new();

    for line in robots_txt.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let Some((field, value)) = line.split_once(':') else {
            continue;
        };
        let field = field.trim().to_ascii_lowercase();
        let value = value.trim();

        match field.as_str() {
            "user-agent" => in_wildcard_group = value == "*",
            "disallow" if in_wildcard_group && !value.is_empty() => {
                disallows.push(value.to_string());
            }
            _ => {}
        }
    }
    disallows
}

fn path_allowed(path: &str, disallows: &[String]) -> bool {
    !disallows.iter().any(|rule| path.starts_with(rule.as_str()))
}

/// Whether scraping `url` is permitted by the origin's robots.txt.
///
/// Fail-open: any error in fetching or interpreting robots.txt allows the
/// URL.
#[instrument(level = "debug", skip(fetcher))]
pub async fn is_allowed<F: FetchPage>(fetcher: &F, url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        warn!(url, "Unparseable URL in robots check; allowing");
        return true;
    };
    let Some(host) = parsed.host_str() else {
        return true;
    };

    let robots_url = format!("{}://{}/robots.txt", parsed.scheme(), host);
    let robots_txt = match fetcher.fetch(&robots_url).await {
        Ok(body) => body,
        Err(e) => {
            debug!(robots_url, error = %e, "robots.txt unavailable; allowing");
            return true;
        }
    };

    let disallows = wildcard_disallows(&robots_txt);
    let allowed = path_allowed(parsed.path(), &disallows);
    debug!(url, allowed, rules = disallows.len(), "robots.txt decision");
    allowed
}
