//! Output writers for scraped records.
//!
//! Each source that yields records gets one JSON and one CSV file per run,
//! named from the source slug plus a kind suffix:
//!
//! ```text
//! out_dir/
//! ├── fau-headlines.json
//! ├── fau-headlines.csv
//! ├── accuweather-boca-weather.json
//! └── accuweather-boca-weather.csv
//! ```

pub mod csv;
pub mod json;
