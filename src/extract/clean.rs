//! Text normalization: strips markup and noise artifacts out of extracted text.
//!
//! This is lossy and heuristic by design. The patterns below target noise
//! actually observed in the supported sources (leaked inline scripts,
//! newsletter prompts, copyright boilerplate, station slogans), not a general
//! HTML-to-text algorithm. [`normalize`] is deterministic and idempotent:
//! every pattern deletes text, and the final whitespace collapse is a fixed
//! point of itself.

use once_cell::sync::Lazy;
use regex::Regex;

static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Noise patterns removed outright, in order. Grouped by what they target:
/// image-alt leftovers, inline-script fragments, newsletter prompts,
/// copyright boilerplate, footer slogans, and button/navigation labels.
static NOISE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Image alt text leftovers.
        r#"(?i)img alt[^"]*"[^"]*""#,
        r#"(?i)alt="[^"]*""#,
        // Inline-script fragments that leak into text nodes.
        r"document\.getElementById\([^)]+\)\.addEventListener\([^)]+\)",
        r"fetch\([^)]+\)",
        r"let [^=]+=\{[^}]+\};",
        r"ns\.classList\.toggle\([^)]+\)",
        r"nsu\.classList\.toggle\([^)]+\)",
        r"document\.getElementById\([^)]+\)\.innerHTML[^;]+;",
        r"event\.preventDefault\(\);",
        r"let [^=]+=\s*document\.getElementById\([^)]+\)\.value;",
        r"let [^=]+=\s*document\.getElementById\([^)]+\);",
        r"Authorization:\s*'[^']*'",
        r"Content-Type:\s*'[^']*'",
        r"method:\s*'[^']*'",
        r"console\.log\([^)]+\)",
        r";\s*\}\)\.then\(function\([^}]+\}\);",
        r"function\([^)]+\)\s*\{[^}]*\}",
        r"JSON\.stringify\([^)]+\)",
        // Newsletter signup prompts.
        r"(?i)Sign up for the[^}]*\}",
        r"(?i)now signed up to receive[^}]*\}",
        r"(?i)Click here to manage all Newsletters",
        // Copyright notices and boilerplate.
        r"(?i)Copyright \d{4} [^.]*\.",
        r"(?i)All rights reserved\.",
        r"(?i)This material may not be published[^.]*\.",
        // Site-specific footer slogans.
        r"(?i)At WPTV, It Starts with Listening",
        r"(?i)Protecting Paradise",
        // Action buttons and list navigation labels.
        r"(?i)Actions Facebook Tweet Email",
        r"(?i)Prev Next",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Clean raw extracted text into prose.
///
/// Removes embedded markup tags, known noise patterns, and collapses all
/// whitespace runs (space/tab/newline/CR) to single spaces before trimming.
/// Always returns a string; empty input yields empty output.
///
/// The noise pass repeats until no pattern matches: deleting one match can
/// splice the surrounding text into a fresh match (e.g. nested duplicated
/// labels), and a single pass would leave that for the next caller.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut cleaned = TAGS.replace_all(raw, "").into_owned();
    cleaned = WHITESPACE.replace_all(&cleaned, " ").trim().to_string();

    loop {
        let before = cleaned.clone();
        for pattern in NOISE.iter() {
            cleaned = pattern.replace_all(&cleaned, "").into_owned();
        }
        cleaned = WHITESPACE.replace_all(&cleaned, " ").trim().to_string();
        if cleaned == before {
            break;
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags_and_collapses_whitespace() {
        let raw = "  <p>Hello\t\r\n  <b>world</b></p>\n ";
        assert_eq!(normalize(raw), "Hello world");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t "), "");
    }

    #[test]
    fn test_removes_script_fragments() {
        let raw = "Story text. fetch('https://api.example.com/track') more text \
                   console.log('loaded') end.";
        let cleaned = normalize(raw);
        assert!(!cleaned.contains("fetch("));
        assert!(!cleaned.contains("console.log"));
        assert!(cleaned.contains("Story text."));
        assert!(cleaned.contains("end."));
    }

    #[test]
    fn test_removes_boilerplate() {
        let raw = "Real news here. Copyright 2025 Scripps Media, Inc. \
                   All rights reserved. This material may not be published, broadcast.";
        let cleaned = normalize(raw);
        assert!(!cleaned.contains("Copyright"));
        assert!(!cleaned.contains("rights reserved"));
        assert!(cleaned.contains("Real news here."));
    }

    #[test]
    fn test_removes_footer_slogans_and_buttons() {
        let raw = "Actions Facebook Tweet Email A storm is coming. \
                   At WPTV, It Starts with Listening Prev Next";
        assert_eq!(normalize(raw), "A storm is coming.");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "<div>Some <em>news</em></div> Copyright 2024 Example Corp. done.",
            "plain text already clean",
            "  lots\n of \t whitespace  ",
            "fetch('x') Sign up for the Morning Brief}",
            "Prev Prev Next Next",
        ];
        for raw in samples {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_nested_noise_removed_in_one_call() {
        // Deleting the inner "Prev Next" splices the outer pair into a new
        // match; the fixed-point loop must catch it within a single call.
        assert_eq!(normalize("Prev Prev Next Next"), "");
        assert_eq!(
            normalize("Story. Prev Prev Next Next More story."),
            "Story. More story."
        );
    }
}
