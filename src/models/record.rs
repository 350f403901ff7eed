use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::{AqiCategory, Pollutant, Variable};

/// One hourly observation from a monitoring station.
///
/// Pollutant readings and temperature are optional: a `None` is a
/// measurement gap and never takes part in a mean as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AirQualityRecord {
    pub timestamp: NaiveDateTime,

    #[validate(length(min = 1))]
    pub station: String,

    #[validate(range(min = 0.0))]
    pub pm2_5: Option<f64>,

    #[validate(range(min = 0.0))]
    pub pm10: Option<f64>,

    #[validate(range(min = 0.0))]
    pub so2: Option<f64>,

    #[validate(range(min = 0.0))]
    pub no2: Option<f64>,

    #[validate(range(min = 0.0))]
    pub co: Option<f64>,

    #[validate(range(min = 0.0))]
    pub o3: Option<f64>,

    pub temperature: Option<f64>,

    pub rain_category: String,

    pub category: AqiCategory,

    #[validate(range(min = 0, max = 23))]
    pub hour: u32,

    /// The `hour` column as written in the source file, when it had one.
    #[validate(range(min = 0, max = 23))]
    pub source_hour: Option<u32>,
}

impl AirQualityRecord {
    pub fn builder() -> AirQualityRecordBuilder {
        AirQualityRecordBuilder::new()
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }

    pub fn reading(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Pm25 => self.pm2_5,
            Pollutant::Pm10 => self.pm10,
            Pollutant::So2 => self.so2,
            Pollutant::No2 => self.no2,
            Pollutant::Co => self.co,
            Pollutant::O3 => self.o3,
        }
    }

    pub fn value(&self, variable: Variable) -> Option<f64> {
        match variable {
            Variable::Temperature => self.temperature,
            Variable::Pollutant(p) => self.reading(p),
        }
    }

    pub fn has_any_reading(&self) -> bool {
        Pollutant::ALL.iter().any(|p| self.reading(*p).is_some())
    }

    /// False when the source file's `hour` column disagrees with the timestamp.
    pub fn hour_matches_timestamp(&self) -> bool {
        self.source_hour.map_or(true, |h| h == self.timestamp.hour())
    }
}

pub struct AirQualityRecordBuilder {
    timestamp: Option<NaiveDateTime>,
    station: Option<String>,
    readings: [Option<f64>; 6],
    temperature: Option<f64>,
    rain_category: Option<String>,
    category: Option<AqiCategory>,
    source_hour: Option<u32>,
}

impl Default for AirQualityRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AirQualityRecordBuilder {
    pub fn new() -> Self {
        Self {
            timestamp: None,
            station: None,
            readings: [None; 6],
            temperature: None,
            rain_category: None,
            category: None,
            source_hour: None,
        }
    }

    pub fn timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn station(mut self, station: impl Into<String>) -> Self {
        self.station = Some(station.into());
        self
    }

    pub fn reading(mut self, pollutant: Pollutant, value: f64) -> Self {
        self.readings[pollutant.index()] = Some(value);
        self
    }

    /// Set a reading that may be missing; non-finite values count as missing.
    pub fn maybe_reading(mut self, pollutant: Pollutant, value: Option<f64>) -> Self {
        self.readings[pollutant.index()] = value.filter(|v| v.is_finite());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn maybe_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature.filter(|v| v.is_finite());
        self
    }

    pub fn rain_category(mut self, rain_category: impl Into<String>) -> Self {
        self.rain_category = Some(rain_category.into());
        self
    }

    pub fn category(mut self, category: AqiCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn source_hour(mut self, hour: Option<u32>) -> Self {
        self.source_hour = hour;
        self
    }

    pub fn build(self) -> Result<AirQualityRecord> {
        let timestamp = self
            .timestamp
            .ok_or_else(|| ProcessingError::MissingData("timestamp".to_string()))?;

        let record = AirQualityRecord {
            timestamp,
            station: self
                .station
                .ok_or_else(|| ProcessingError::MissingData("station".to_string()))?,
            pm2_5: self.readings[Pollutant::Pm25.index()],
            pm10: self.readings[Pollutant::Pm10.index()],
            so2: self.readings[Pollutant::So2.index()],
            no2: self.readings[Pollutant::No2.index()],
            co: self.readings[Pollutant::Co.index()],
            o3: self.readings[Pollutant::O3.index()],
            temperature: self.temperature,
            rain_category: self
                .rain_category
                .ok_or_else(|| ProcessingError::MissingData("rain_category".to_string()))?,
            category: self
                .category
                .ok_or_else(|| ProcessingError::MissingData("category".to_string()))?,
            hour: timestamp.hour(),
            source_hour: self.source_hour,
        };

        record.validate()?;
        Ok(record)
    }
}
