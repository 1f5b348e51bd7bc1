//! Weather-page extraction via pattern matching over page text.
//!
//! Best-effort by construction: the regexes and selector probes below encode
//! a fixed set of observed page layouts, not a weather-data schema. Malformed
//! input yields an empty or partial sequence, never an error.
//!
//! Forecast extraction runs an ordered list of regex strategies
//! (first-non-empty wins) and independently appends card-based selector
//! results. Each emitted forecast's date is derived positionally from the
//! capture date; the page's own date token is deliberately not parsed.

use chrono::{DateTime, Duration, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

use crate::config::SelectorSet;
use crate::models::WeatherReading;

/// Hard cap on emitted forecast entries, regardless of strategy yield.
const MAX_FORECAST_DAYS: usize = 10;

const CURRENT_TEMP_PROBES: &[&str] = &[
    ".cur-con-weather-card .temp",
    ".current-weather .temp",
    ".temp",
];

const CONDITION_PROBES: &[&str] = &[
    ".cur-con-weather-card .phrase",
    ".current-weather .phrase",
    ".phrase",
    ".cond",
];

const TODAY_PROBES: &[&str] = &[".today-forecast-card"];

const FORECAST_CARD_PROBES: &[&str] = &[".daily-forecast-card", ".forecast-card"];

static TEMP_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{1,3}\s*°F?").unwrap());
static TEMP_F_PAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,3})°F").unwrap());
static REAL_FEEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"RealFeel®?\s*(\d{1,3})°").unwrap());
static TODAY_HI: Lazy<Regex> = Lazy::new(|| Regex::new(r"Hi:\s*(\d{1,3})°").unwrap());
static TODAY_LO: Lazy<Regex> = Lazy::new(|| Regex::new(r"Lo:\s*(\d{1,3})°").unwrap());

/// Strategy (a): `<DAYLABEL> <M/D> <hi>° <lo>°` spans.
static FORECAST_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z]{3,9})\s+(\d{1,2}/\d{1,2})\s+(\d{1,3})°\s+(\d{1,3})°").unwrap()
});

/// Strategy (b): known day tokens, second temperature optionally `Lo`-prefixed.
static FORECAST_DAY_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(TONIGHT|MON|TUE|WED|THU|FRI|SAT|SUN)\b\s+(\d{1,2}/\d{1,2})\s+(\d{1,3})°\s*(?:Lo\s*)?(\d{1,3})°",
    )
    .unwrap()
});

/// A forecast span before positional dating.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ForecastSpan {
    day: String,
    high: String,
    low: String,
    condition: Option<String>,
}

/// Collapse a duplicated degree-symbol artifact seen on some pages.
fn fix_degrees(text: &str) -> String {
    text.replace("°F°F", "°F").replace("°°", "°")
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .map(|el| collapse(&el.text().collect::<Vec<_>>().join(" ")))
        .find(|t| !t.is_empty())
}

/// Probe a custom selector (when configured) then the built-in list; return
/// the first non-empty text.
fn probe(doc: &Html, custom: Option<&str>, probes: &[&str]) -> Option<String> {
    custom
        .into_iter()
        .chain(probes.iter().copied())
        .find_map(|sel| element_text(doc, sel))
}

fn spans_from_labeled(page_text: &str) -> Vec<ForecastSpan> {
    FORECAST_SPAN
        .captures_iter(page_text)
        .map(|c| ForecastSpan {
            day: c[1].to_string(),
            high: format!("{}°", &c[3]),
            low: format!("{}°", &c[4]),
            condition: None,
        })
        .collect()
}

fn spans_from_day_tokens(page_text: &str) -> Vec<ForecastSpan> {
    FORECAST_DAY_TOKEN
        .captures_iter(page_text)
        .map(|c| ForecastSpan {
            day: c[1].to_string(),
            high: format!("{}°", &c[3]),
            low: format!("{}°", &c[4]),
            condition: None,
        })
        .collect()
}

/// Strategy (c): forecast-card elements with day/high/low/condition sub-fields.
fn spans_from_cards(doc: &Html, custom: Option<&str>) -> Vec<ForecastSpan> {
    let mut spans = Vec::new();
    for card_sel in custom.into_iter().chain(FORECAST_CARD_PROBES.iter().copied()) {
        let Ok(sel) = Selector::parse(card_sel) else {
            continue;
        };
        for card in doc.select(&sel) {
            let sub = |selectors: &[&str]| -> Option<String> {
                selectors.iter().find_map(|s| {
                    let sub_sel = Selector::parse(s).ok()?;
                    card.select(&sub_sel)
                        .map(|el| collapse(&el.text().collect::<Vec<_>>().join(" ")))
                        .find(|t| !t.is_empty())
                })
            };
            let day = sub(&[".dow", ".day"]);
            let high = sub(&[".high", ".temp-hi"]);
            let low = sub(&[".low", ".temp-lo"]);
            let condition = sub(&[".phrase", ".cond"]);
            if let (Some(day), Some(high)) = (day, high) {
                spans.push(ForecastSpan {
                    day: fix_degrees(&day),
                    high: fix_degrees(&high),
                    low: fix_degrees(&low.unwrap_or_default()),
                    condition: condition.map(|c| fix_degrees(&c)),
                });
            }
        }
        if !spans.is_empty() {
            break;
        }
    }
    spans
}

/// Extract current/today/forecast readings from a weather page.
///
/// Uses the wall clock for the capture timestamp and the positional forecast
/// dates; see [`extract_at`] for the deterministic core.
pub fn extract(doc: &Html, selectors: &SelectorSet) -> Vec<WeatherReading> {
    extract_at(doc, selectors, Local::now())
}

/// Deterministic extraction core, with the capture instant injected.
#[instrument(level = "debug", skip_all)]
pub fn extract_at(
    doc: &Html,
    selectors: &SelectorSet,
    now: DateTime<Local>,
) -> Vec<WeatherReading> {
    let page_text = collapse(&doc.root_element().text().collect::<Vec<_>>().join(" "));
    let today = now.date_naive();
    let mut readings = Vec::new();

    // Current conditions: probed temperature element first, page-wide °F
    // token second. No temperature, no reading.
    let temperature = probe(doc, selectors.current_weather.as_deref(), CURRENT_TEMP_PROBES)
        .and_then(|text| {
            TEMP_TOKEN
                .find(&fix_degrees(&text))
                .map(|m| m.as_str().to_string())
        })
        .or_else(|| {
            TEMP_F_PAGE
                .captures(&page_text)
                .map(|c| format!("{}°F", &c[1]))
        });

    if let Some(temperature) = temperature {
        let condition = probe(doc, None, CONDITION_PROBES)
            .map(|t| fix_degrees(&t))
            .unwrap_or_default();
        let real_feel = REAL_FEEL.captures(&page_text).map(|c| format!("{}°", &c[1]));
        readings.push(WeatherReading::Current {
            temperature: fix_degrees(&temperature),
            condition,
            real_feel,
            timestamp: now.to_rfc3339(),
        });
    } else {
        debug!("No current temperature found on weather page");
    }

    // Today's high/low: both tokens required. A probed today element is
    // scanned first so a stray Hi/Lo pair elsewhere on the page cannot win;
    // page-wide text is the fallback.
    let today_tokens = |text: &str| {
        match (TODAY_HI.captures(text), TODAY_LO.captures(text)) {
            (Some(hi), Some(lo)) => Some((format!("{}°", &hi[1]), format!("{}°", &lo[1]))),
            _ => None,
        }
    };
    let today_pair = probe(doc, selectors.today_weather.as_deref(), TODAY_PROBES)
        .as_deref()
        .and_then(today_tokens)
        .or_else(|| today_tokens(&page_text));
    if let Some((high, low)) = today_pair {
        readings.push(WeatherReading::Today {
            high,
            low,
            date: today.format("%Y-%m-%d").to_string(),
        });
    }

    // Forecast: ordered regex strategies, first non-empty wins; card-based
    // results are attempted independently and appended.
    let regex_strategies: &[fn(&str) -> Vec<ForecastSpan>] =
        &[spans_from_labeled, spans_from_day_tokens];
    let mut spans = regex_strategies
        .iter()
        .map(|strategy| strategy(&page_text))
        .find(|spans| !spans.is_empty())
        .unwrap_or_default();
    spans.extend(spans_from_cards(doc, selectors.forecast10_day.as_deref()));
    spans.truncate(MAX_FORECAST_DAYS);

    for (i, span) in spans.into_iter().enumerate() {
        let date = today + Duration::days(i as i64 + 1);
        readings.push(WeatherReading::Forecast {
            day: span.day,
            date: date.format("%Y-%m-%d").to_string(),
            high: span.high,
            low: span.low,
            condition: span.condition,
        });
    }

    debug!(count = readings.len(), "Extracted weather readings");
    readings
}
