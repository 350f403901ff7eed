use crate::models::{AirQualityRecord, Variable};
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub total_records: usize,
    pub missing_by_variable: Vec<(Variable, usize)>,
    pub records_without_readings: usize,
    pub hour_mismatches: usize,
    pub duplicates: Vec<DuplicateObservation>,
    pub station_statistics: BTreeMap<String, StationStatistics>,
}

/// A second row for a station/timestamp pair already seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateObservation {
    pub station: String,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct StationStatistics {
    pub total_records: usize,
    pub missing_readings: usize,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
}

impl IntegrityReport {
    pub fn missing(&self, variable: Variable) -> usize {
        self.missing_by_variable
            .iter()
            .find(|(v, _)| *v == variable)
            .map_or(0, |(_, n)| *n)
    }

    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty()
            && self.records_without_readings == 0
            && self.hour_mismatches == 0
    }
}

pub struct IntegrityChecker {
    max_listed_issues: usize,
}

impl IntegrityChecker {
    pub fn new() -> Self {
        Self {
            max_listed_issues: 10,
        }
    }

    pub fn with_max_listed_issues(max_listed_issues: usize) -> Self {
        Self { max_listed_issues }
    }

    /// Profile gaps, duplicates and hour/timestamp disagreements in the loaded records
    pub fn check_integrity(&self, records: &[AirQualityRecord]) -> IntegrityReport {
        let mut missing = [0usize; 7];
        let mut records_without_readings = 0;
        let mut hour_mismatches = 0;
        let mut duplicates = Vec::new();
        let mut seen: HashSet<(&str, NaiveDateTime)> = HashSet::with_capacity(records.len());
        let mut station_statistics: BTreeMap<String, StationStatistics> = BTreeMap::new();

        for record in records {
            let mut record_missing = 0;
            for (i, variable) in Variable::CORRELATION_ORDER.iter().enumerate() {
                if record.value(*variable).is_none() {
                    missing[i] += 1;
                    record_missing += 1;
                }
            }

            if !record.has_any_reading() {
                records_without_readings += 1;
            }

            if !record.hour_matches_timestamp() {
                hour_mismatches += 1;
            }

            if !seen.insert((record.station.as_str(), record.timestamp)) {
                duplicates.push(DuplicateObservation {
                    station: record.station.clone(),
                    timestamp: record.timestamp,
                });
            }

            let stats = station_statistics
                .entry(record.station.clone())
                .or_default();
            stats.total_records += 1;
            stats.missing_readings += record_missing;
            stats.first_timestamp = Some(
                stats
                    .first_timestamp
                    .map_or(record.timestamp, |t| t.min(record.timestamp)),
            );
            stats.last_timestamp = Some(
                stats
                    .last_timestamp
                    .map_or(record.timestamp, |t| t.max(record.timestamp)),
            );
        }

        if !duplicates.is_empty() {
            warn!(count = duplicates.len(), "duplicate station observations found");
        }
        if hour_mismatches > 0 {
            warn!(count = hour_mismatches, "records whose hour disagrees with the timestamp");
        }

        IntegrityReport {
            total_records: records.len(),
            missing_by_variable: Variable::CORRELATION_ORDER
                .iter()
                .copied()
                .zip(missing)
                .collect(),
            records_without_readings,
            hour_mismatches,
            duplicates,
            station_statistics,
        }
    }

    /// Generate a summary report
    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = String::new();
        let pct = |n: usize| {
            if report.total_records == 0 {
                0.0
            } else {
                100.0 * n as f64 / report.total_records as f64
            }
        };

        summary.push_str("=== Integrity Check Report ===\n");
        summary.push_str(&format!("Total Records: {}\n", report.total_records));
        summary.push_str("\nMissing Values:\n");
        for (variable, n) in &report.missing_by_variable {
            summary.push_str(&format!(
                "  {:<6} {} ({:.1}%)\n",
                variable.column_name(),
                n,
                pct(*n)
            ));
        }
        summary.push_str(&format!(
            "Records Without Any Pollutant Reading: {}\n",
            report.records_without_readings
        ));
        summary.push_str(&format!(
            "Hour Column Disagreeing With Timestamp: {}\n",
            report.hour_mismatches
        ));

        summary.push_str("\nStations:\n");
        for (station, stats) in &report.station_statistics {
            let span = match (stats.first_timestamp, stats.last_timestamp) {
                (Some(first), Some(last)) => format!("{} to {}", first, last),
                _ => "no data".to_string(),
            };
            summary.push_str(&format!(
                "  {}: {} records, {} missing readings, {}\n",
                station, stats.total_records, stats.missing_readings, span
            ));
        }

        summary.push_str(&format!(
            "\nDuplicate Observations: {}\n",
            report.duplicates.len()
        ));
        if !report.duplicates.is_empty() {
            summary.push_str(&format!(
                "\nFirst {} Duplicates:\n",
                self.max_listed_issues.min(report.duplicates.len())
            ));
            for (i, duplicate) in report
                .duplicates
                .iter()
                .take(self.max_listed_issues)
                .enumerate()
            {
                summary.push_str(&format!(
                    "  {}. Station {} at {}\n",
                    i + 1,
                    duplicate.station,
                    duplicate.timestamp
                ));
            }
        }

        summary
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}
