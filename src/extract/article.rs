//! Full-article body selection among competing extraction strategies.
//!
//! Given a fetched article page and the teaser text from the listing page,
//! [`select_body`] picks the best available body text. It never fails; the
//! worst case keeps the teaser, so enrichment can only improve an item.
//!
//! The candidate selectors form an explicit ordered strategy list: selector
//! order encodes a priority preference for hand-authored content containers
//! over generic fallbacks, and the first acceptable candidate wins. When no
//! container qualifies, a paragraph-level assembly pass is tried before
//! giving up.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use crate::extract::clean::normalize;

/// Candidate body containers, highest priority first.
const BODY_SELECTORS: &[&str] = &[
    ".article-content",
    ".content-body",
    ".news-content",
    ".story-content",
    "article",
    ".main-content p",
    ".entry-content",
    ".article-body",
    ".story-body",
];

/// Markers that indicate the candidate swallowed site chrome rather than prose.
const NAV_MARKERS: &[&str] = &["HOME", "NEWS DESK", "Tags:", "Categories"];

static BYLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*By\s+[a-zA-Z]").unwrap());
static DATELINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d{1,2}/\d{1,2}/\d{4}").unwrap());

/// Paragraphs shorter than this are navigation stubs or captions.
const MIN_PARAGRAPH_LEN: usize = 20;
/// Paragraphs at or beyond this length are metadata dumps, not prose.
const MAX_PARAGRAPH_LEN: usize = 1000;

fn has_nav_markers(text: &str) -> bool {
    NAV_MARKERS.iter().any(|m| text.contains(m))
}

/// Evaluate one candidate selector: the normalized text of all matching
/// nodes, or `None` when nothing matched.
fn candidate_text(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let mut matched = false;
    let mut text = String::new();
    for element in doc.select(&sel) {
        matched = true;
        for piece in element.text() {
            text.push_str(piece);
            text.push(' ');
        }
    }
    matched.then(|| normalize(&text))
}

/// Fallback: assemble the body from individual paragraphs, filtering out
/// anything byline-shaped, date-shaped, marker-contaminated, or of
/// implausible length. Surviving paragraphs join with a blank line.
fn assemble_paragraphs(doc: &Html) -> String {
    let sel = Selector::parse("p").expect("static selector");
    let mut kept = Vec::new();
    for element in doc.select(&sel) {
        let text = normalize(&element.text().collect::<Vec<_>>().join(" "));
        if text.len() <= MIN_PARAGRAPH_LEN || text.len() >= MAX_PARAGRAPH_LEN {
            continue;
        }
        if has_nav_markers(&text) || BYLINE.is_match(&text) || DATELINE.is_match(&text) {
            continue;
        }
        kept.push(text);
    }
    kept.join("\n\n")
}

/// Choose the best body text for an article page, never regressing below the
/// teaser.
///
/// 1. Try each candidate container selector in priority order; accept the
///    first whose text is free of navigation markers and strictly longer
///    than the teaser.
/// 2. Otherwise assemble filtered paragraphs; use the result only when it is
///    non-empty and strictly longer than the teaser.
/// 3. Otherwise keep the teaser unchanged.
pub fn select_body(doc: &Html, teaser: &str) -> String {
    for selector in BODY_SELECTORS {
        if let Some(text) = candidate_text(doc, selector) {
            if !has_nav_markers(&text) && text.len() > teaser.len() {
                debug!(selector, len = text.len(), "Accepted body candidate");
                return text;
            }
        }
    }

    let assembled = assemble_paragraphs(doc);
    if !assembled.is_empty() && assembled.len() > teaser.len() {
        debug!(len = assembled.len(), "Assembled body from paragraphs");
        return assembled;
    }

    debug!("No body candidate beat the teaser; keeping teaser");
    teaser.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_acceptable_candidate_wins() {
        let html = Html::parse_document(
            r#"<html><body>
                <div class="article-content">A long enough article body with plenty of detail about the story at hand.</div>
                <article>Generic fallback text that should never be reached here.</article>
            </body></html>"#,
        );
        let body = select_body(&html, "short teaser");
        assert!(body.starts_with("A long enough article body"));
    }

    #[test]
    fn test_contaminated_candidate_rejected() {
        let html = Html::parse_document(
            r#"<html><body>
                <div class="article-content">HOME NEWS DESK Tags: campus links links links and more links</div>
                <article>The actual article text, long enough to beat the teaser comfortably.</article>
            </body></html>"#,
        );
        let body = select_body(&html, "teaser");
        assert!(body.starts_with("The actual article text"));
    }

    #[test]
    fn test_paragraph_assembly_fallback() {
        let html = Html::parse_document(
            r#"<html><body>
                <div class="site-chrome">HOME</div>
                <p>By Jane Reporter</p>
                <p>8/20/2025</p>
                <p>Short.</p>
                <p>The first real paragraph of the story, with enough words to pass the filter.</p>
                <p>The second real paragraph continues the story in reasonable depth.</p>
            </body></html>"#,
        );
        let body = select_body(&html, "teaser");
        assert!(body.starts_with("The first real paragraph"));
        assert!(body.contains("\n\n"));
        assert!(!body.contains("By Jane Reporter"));
        assert!(!body.contains("8/20/2025"));
        assert!(!body.contains("Short."));
    }

    #[test]
    fn test_never_regresses_below_teaser() {
        let html = Html::parse_document("<html><body><p>tiny</p></body></html>");
        let teaser = "a teaser that is already longer than anything on the page";
        assert_eq!(select_body(&html, teaser), teaser);
    }

    #[test]
    fn test_candidate_must_strictly_exceed_teaser() {
        // Candidate text equals the teaser length exactly; not an improvement.
        let html = Html::parse_document(
            r#"<html><body><div class="article-content">0123456789</div></body></html>"#,
        );
        assert_eq!(select_body(&html, "0123456789"), "0123456789");
    }

    #[test]
    fn test_empty_page_keeps_empty_teaser() {
        let html = Html::parse_document("<html><body></body></html>");
        assert_eq!(select_body(&html, ""), "");
    }
}
