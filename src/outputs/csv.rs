//! CSV output: one double-quote-wrapped record per line, no header row.
//!
//! Every field is wrapped in double quotes with internal quotes doubled.
//! News records are `headline,content,link`; weather records are
//! `type,temperature,condition,high,low,realFeel,wind,precipitation,day,date,timestamp`
//! with empty fields where a reading kind has no value for a column. The
//! `wind` and `precipitation` columns are always empty; they are kept so the
//! column positions stay stable for existing consumers.

use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

use crate::models::{ExtractedItem, ScrapedRecords, WeatherReading};

/// Wrap a field in double quotes, doubling internal double quotes.
fn escape(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn line(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| escape(f))
        .collect::<Vec<_>>()
        .join(",")
}

fn news_line(item: &ExtractedItem) -> String {
    line(&[
        item.headline.as_str(),
        item.content.as_str(),
        item.link.as_str(),
    ])
}

fn weather_line(reading: &WeatherReading) -> String {
    match reading {
        WeatherReading::Current {
            temperature,
            condition,
            real_feel,
            timestamp,
        } => line(&[
            "current",
            temperature.as_str(),
            condition.as_str(),
            "",
            "",
            real_feel.as_deref().unwrap_or(""),
            "",
            "",
            "",
            "",
            timestamp.as_str(),
        ]),
        WeatherReading::Today { high, low, date } => line(&[
            "today",
            "",
            "",
            high.as_str(),
            low.as_str(),
            "",
            "",
            "",
            "",
            date.as_str(),
            "",
        ]),
        WeatherReading::Forecast {
            day,
            date,
            high,
            low,
            condition,
        } => line(&[
            "forecast",
            "",
            condition.as_deref().unwrap_or(""),
            high.as_str(),
            low.as_str(),
            "",
            "",
            "",
            day.as_str(),
            date.as_str(),
            "",
        ]),
    }
}

/// Render `records` as CSV text.
pub fn to_csv(records: &ScrapedRecords) -> String {
    match records {
        ScrapedRecords::News(items) => items
            .iter()
            .map(news_line)
            .collect::<Vec<_>>()
            .join("\n"),
        ScrapedRecords::Weather(readings) => readings
            .iter()
            .map(weather_line)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Write `records` as CSV to `path`, creating parent directories as needed.
#[instrument(level = "info", skip(records), fields(path = %path.display()))]
pub async fn write_records(records: &ScrapedRecords, path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).await?;
    }
    fs::write(path, to_csv(records)).await?;
    info!(count = records.len(), "Wrote CSV records");
    Ok(())
}
