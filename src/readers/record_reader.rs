use crate::error::{ProcessingError, Result};
use crate::models::{AirQualityRecord, AqiCategory, Pollutant, RecordSet};
use crate::utils::constants::{DEFAULT_BUFFER_SIZE, TIMESTAMP_FORMATS};
use crate::utils::progress::ProgressReporter;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Row layout of the combined station CSV. Columns not named here are ignored.
#[derive(Debug, Deserialize)]
struct RawRow {
    date: String,
    station: String,
    #[serde(rename = "pm2.5", alias = "pm2_5")]
    pm2_5: Option<f64>,
    pm10: Option<f64>,
    so2: Option<f64>,
    no2: Option<f64>,
    co: Option<f64>,
    o3: Option<f64>,
    #[serde(rename = "temp", alias = "temperature")]
    temperature: Option<f64>,
    rain_category: String,
    #[serde(rename = "Category", alias = "category")]
    category: String,
    #[serde(default)]
    hour: Option<u32>,
}

#[derive(Debug, Default)]
pub struct RecordReader;

impl RecordReader {
    pub fn new() -> Self {
        Self
    }

    /// Load every record from a CSV file.
    pub fn read_path(&self, path: &Path, progress: Option<&ProgressReporter>) -> Result<RecordSet> {
        info!(path = %path.display(), "loading air-quality records");
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        self.read_from(reader, progress)
    }

    /// Load every record from any CSV source with a header row.
    pub fn read_from<R: Read>(
        &self,
        source: R,
        progress: Option<&ProgressReporter>,
    ) -> Result<RecordSet> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        let headers = csv_reader.headers()?.clone();

        let mut records = Vec::new();
        let mut hour_mismatches = 0usize;
        for result in csv_reader.records() {
            let row = result?;
            let line = row.position().map_or(0, |p| p.line());
            let raw: RawRow = row.deserialize(Some(&headers))?;
            let record = self.parse_row(raw, line)?;
            if !record.hour_matches_timestamp() {
                hour_mismatches += 1;
                debug!(line, timestamp = %record.timestamp, "hour column disagrees with timestamp");
            }
            records.push(record);

            if records.len() % 10_000 == 0 {
                if let Some(p) = progress {
                    p.set_message(&format!("Loaded {} records...", records.len()));
                }
            }
        }

        if hour_mismatches > 0 {
            warn!(count = hour_mismatches, "hour column disagrees with timestamp");
        }
        debug!(records = records.len(), "parsed CSV rows");
        let set = RecordSet::new(records);
        if let Some(span) = set.span() {
            info!(records = set.len(), span = %span, "dataset loaded");
        }
        Ok(set)
    }

    fn parse_row(&self, raw: RawRow, line: u64) -> Result<AirQualityRecord> {
        if let Some(hour) = raw.hour.filter(|h| *h > 23) {
            return Err(ProcessingError::InvalidFormat {
                line,
                message: format!("hour {} outside 0-23", hour),
            });
        }

        let timestamp =
            parse_timestamp(&raw.date, raw.hour).ok_or_else(|| ProcessingError::InvalidFormat {
                line,
                message: format!("unparseable timestamp '{}'", raw.date),
            })?;

        let category =
            AqiCategory::parse(&raw.category).ok_or_else(|| ProcessingError::InvalidFormat {
                line,
                message: format!("unknown category '{}'", raw.category),
            })?;

        AirQualityRecord::builder()
            .timestamp(timestamp)
            .station(raw.station)
            .maybe_reading(Pollutant::Pm25, raw.pm2_5)
            .maybe_reading(Pollutant::Pm10, raw.pm10)
            .maybe_reading(Pollutant::So2, raw.so2)
            .maybe_reading(Pollutant::No2, raw.no2)
            .maybe_reading(Pollutant::Co, raw.co)
            .maybe_reading(Pollutant::O3, raw.o3)
            .maybe_temperature(raw.temperature)
            .rain_category(raw.rain_category)
            .category(category)
            .source_hour(raw.hour)
            .build()
            .map_err(|e| ProcessingError::InvalidFormat {
                line,
                message: e.to_string(),
            })
    }
}

/// Accepts full date-times, or bare dates placed at `hour` (midnight when absent).
pub fn parse_timestamp(s: &str, hour: Option<u32>) -> Option<NaiveDateTime> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(hour.unwrap_or(0), 0, 0))
        })
}
