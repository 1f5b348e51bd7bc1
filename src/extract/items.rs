//! Listing-page extraction: enumerate bounded candidate items and orchestrate
//! full-article enrichment.
//!
//! One engine handles every configured source. Weather descriptors delegate
//! wholesale to the weather extractor; news descriptors walk the headline
//! nodes in document order, derive teaser and link per node, and try to
//! enrich each linked item by fetching its article page and running body
//! selection against it. Enrichment failure never loses an item; the teaser
//! stands in.

use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::{SiteDescriptor, SiteKind};
use crate::extract::clean::normalize;
use crate::extract::{article, weather};
use crate::fetch::FetchPage;
use crate::models::{ExtractedItem, ScrapedRecords};

/// Extraction engine for one run. Generic over the fetcher so tests can run
/// against canned markup, and carries the inter-item politeness delay (zero
/// in tests).
pub struct ItemExtractor<'a, F> {
    fetcher: &'a F,
    item_delay: Duration,
}

impl<'a, F> ItemExtractor<'a, F>
where
    F: FetchPage,
{
    pub fn new(fetcher: &'a F, item_delay: Duration) -> Self {
        Self {
            fetcher,
            item_delay,
        }
    }

    /// Extract every record a listing page yields for `site`.
    ///
    /// Never fails: selector problems and enrichment failures are logged and
    /// degrade the output instead of aborting it.
    #[instrument(level = "info", skip_all, fields(site = %site.name))]
    pub async fn extract(&self, listing_markup: &str, site: &SiteDescriptor) -> ScrapedRecords {
        let doc = Html::parse_document(listing_markup);

        match site.kind {
            SiteKind::Weather => ScrapedRecords::Weather(weather::extract(&doc, &site.selectors)),
            SiteKind::News => ScrapedRecords::News(self.extract_news(&doc, site).await),
        }
    }

    async fn extract_news(&self, doc: &Html, site: &SiteDescriptor) -> Vec<ExtractedItem> {
        let Some(headline_selector) = site.selectors.headline.as_deref() else {
            warn!("News site has no headline selector; nothing to extract");
            return Vec::new();
        };
        let headline_sel = match Selector::parse(headline_selector) {
            Ok(sel) => sel,
            Err(e) => {
                warn!(selector = headline_selector, error = %e, "Bad headline selector");
                return Vec::new();
            }
        };
        let content_sel = site
            .selectors
            .content
            .as_deref()
            .and_then(|s| Selector::parse(s).ok());

        let limit = site.limit.unwrap_or(usize::MAX);
        let mut items = Vec::new();

        for node in doc.select(&headline_sel) {
            if items.len() >= limit {
                break;
            }

            // A whitespace-only headline node is skipped entirely; it does
            // not consume the limit.
            let headline = collapse_text(&node);
            if headline.is_empty() {
                debug!("Skipping headline node with empty text");
                continue;
            }

            let teaser = content_sel
                .as_ref()
                .and_then(|sel| teaser_for(&node, sel))
                .map(|raw| normalize(&raw))
                .unwrap_or_default();

            let link = find_link(&node);
            let absolute_link = link
                .as_deref()
                .map(|href| resolve_link(href, &site.url))
                .unwrap_or_default();

            let content = if absolute_link.is_empty() {
                teaser.clone()
            } else {
                self.enrich(&absolute_link, &headline, &teaser).await
            };

            items.push(ExtractedItem {
                headline,
                content: normalize(&content),
                link: absolute_link,
            });

            // Politeness pause between per-item article fetches.
            if !self.item_delay.is_zero() {
                sleep(self.item_delay).await;
            }
        }

        debug!(count = items.len(), "Extracted news items");
        items
    }

    /// Fetch the linked article page and select the best body text. Any
    /// failure keeps the teaser; enrichment never aborts an item.
    async fn enrich(&self, url: &str, headline: &str, teaser: &str) -> String {
        match self.fetcher.fetch(url).await {
            Ok(markup) => {
                let article_doc = Html::parse_document(&markup);
                article::select_body(&article_doc, teaser)
            }
            Err(e) => {
                warn!(
                    %url,
                    headline = %crate::utils::truncate_for_log(headline, 50),
                    error = %e,
                    "Enrichment fetch failed; keeping teaser"
                );
                teaser.to_string()
            }
        }
    }
}

fn collapse_text(node: &ElementRef) -> String {
    node.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Teaser content relative to the headline node: the first following sibling
/// matching the content selector, else the first matching descendant.
fn teaser_for(node: &ElementRef, content_sel: &Selector) -> Option<String> {
    let mut sibling = node.next_sibling();
    while let Some(n) = sibling {
        if let Some(el) = ElementRef::wrap(n) {
            if content_sel.matches(&el) {
                return Some(collapse_text(&el));
            }
        }
        sibling = n.next_sibling();
    }
    node.select(content_sel).next().map(|el| collapse_text(&el))
}

/// Nearest enclosing anchor ancestor, else the first descendant anchor.
fn find_link(node: &ElementRef) -> Option<String> {
    let ancestor_href = node
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "a")
        .and_then(|a| a.value().attr("href").map(str::to_string));
    if ancestor_href.is_some() {
        return ancestor_href;
    }

    let anchor_sel = Selector::parse("a[href]").expect("static selector");
    node.select(&anchor_sel)
        .next()
        .and_then(|a| a.value().attr("href").map(str::to_string))
}

/// Resolve a possibly-relative href against the source's base URL. An
/// unresolvable href is returned as-is rather than dropped.
fn resolve_link(href: &str, base: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    match Url::parse(base).and_then(|b| b.join(href)) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            warn!(href, base, error = %e, "Could not resolve link against base URL");
            href.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorSet;
    use crate::fetch::testing::StubFetcher;

    fn news_site(limit: Option<usize>) -> SiteDescriptor {
        SiteDescriptor {
            name: "fau".to_string(),
            url: "https://www.fau.edu/newsdesk/".to_string(),
            kind: SiteKind::News,
            selectors: SelectorSet {
                headline: Some("h3.title".to_string()),
                content: Some("div.excerpt".to_string()),
                link: None,
                ..Default::default()
            },
            limit,
        }
    }

    const LISTING: &str = r#"<html><body>
        <div class="card">
          <h3 class="title"><a href="/articles/one.php">First headline</a></h3>
          <div class="excerpt">First teaser text.</div>
        </div>
        <div class="card">
          <h3 class="title">   </h3>
          <div class="excerpt">Orphan teaser.</div>
        </div>
        <div class="card">
          <h3 class="title">Second headline</h3>
          <div class="excerpt">Second teaser text.</div>
        </div>
        <div class="card">
          <a href="https://elsewhere.example/3"><h3 class="title">Third headline</h3></a>
          <div class="excerpt">Third teaser text.</div>
        </div>
    </body></html>"#;

    #[tokio::test]
    async fn test_items_in_document_order_with_limit() {
        let fetcher = StubFetcher::new();
        let extractor = ItemExtractor::new(&fetcher, Duration::ZERO);
        let records = extractor.extract(LISTING, &news_site(Some(2))).await;

        let ScrapedRecords::News(items) = records else {
            panic!("expected news records");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].headline, "First headline");
        assert_eq!(items[1].headline, "Second headline");
    }

    #[tokio::test]
    async fn test_empty_headline_skipped_without_consuming_limit() {
        let fetcher = StubFetcher::new();
        let extractor = ItemExtractor::new(&fetcher, Duration::ZERO);
        let records = extractor.extract(LISTING, &news_site(Some(3))).await;

        let ScrapedRecords::News(items) = records else {
            panic!("expected news records");
        };
        // Four headline nodes, one whitespace-only: three items, none empty.
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| !i.headline.is_empty()));
        assert_eq!(items[2].headline, "Third headline");
    }

    #[tokio::test]
    async fn test_linkless_headline_keeps_teaser_and_empty_link() {
        let fetcher = StubFetcher::new();
        let extractor = ItemExtractor::new(&fetcher, Duration::ZERO);
        let records = extractor.extract(LISTING, &news_site(None)).await;

        let ScrapedRecords::News(items) = records else {
            panic!("expected news records");
        };
        assert_eq!(items[1].link, "");
        assert_eq!(items[1].content, "Second teaser text.");
        // Only the two linked items triggered enrichment fetches.
        assert_eq!(fetcher.requests.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_relative_link_resolved_and_enriched() {
        let fetcher = StubFetcher::new().with_page(
            "https://www.fau.edu/articles/one.php",
            r#"<html><body><div class="article-content">The full article body, much longer
               than the teaser, with several sentences of real content.</div></body></html>"#,
        );
        let extractor = ItemExtractor::new(&fetcher, Duration::ZERO);
        let records = extractor.extract(LISTING, &news_site(Some(1))).await;

        let ScrapedRecords::News(items) = records else {
            panic!("expected news records");
        };
        assert_eq!(items[0].link, "https://www.fau.edu/articles/one.php");
        assert!(items[0].content.starts_with("The full article body"));
    }

    #[tokio::test]
    async fn test_enrichment_failure_keeps_teaser() {
        // Stub has no page for the article URL, so the fetch fails.
        let fetcher = StubFetcher::new();
        let extractor = ItemExtractor::new(&fetcher, Duration::ZERO);
        let records = extractor.extract(LISTING, &news_site(Some(1))).await;

        let ScrapedRecords::News(items) = records else {
            panic!("expected news records");
        };
        assert_eq!(items[0].content, "First teaser text.");
        assert_eq!(items[0].link, "https://www.fau.edu/articles/one.php");
    }

    #[tokio::test]
    async fn test_absolute_link_passed_through() {
        let fetcher = StubFetcher::new();
        let extractor = ItemExtractor::new(&fetcher, Duration::ZERO);
        let records = extractor.extract(LISTING, &news_site(None)).await;

        let ScrapedRecords::News(items) = records else {
            panic!("expected news records");
        };
        assert_eq!(items[2].link, "https://elsewhere.example/3");
    }

    #[tokio::test]
    async fn test_weather_site_delegates() {
        let site = SiteDescriptor {
            name: "accuweather-boca".to_string(),
            url: "https://example.com".to_string(),
            kind: SiteKind::Weather,
            selectors: SelectorSet::default(),
            limit: None,
        };
        let fetcher = StubFetcher::new();
        let extractor = ItemExtractor::new(&fetcher, Duration::ZERO);
        let records = extractor
            .extract("<html><body>Hi: 91° Lo: 74°</body></html>", &site)
            .await;

        let ScrapedRecords::Weather(readings) = records else {
            panic!("expected weather records");
        };
        assert_eq!(readings.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_headline_selector_yields_nothing() {
        let mut site = news_site(None);
        site.selectors.headline = None;
        let fetcher = StubFetcher::new();
        let extractor = ItemExtractor::new(&fetcher, Duration::ZERO);
        assert!(extractor.extract(LISTING, &site).await.is_empty());
    }
}
