use std::collections::HashSet;

use crate::models::{AirQualityRecord, DateRange};

/// The loaded dataset, sorted by timestamp and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<AirQualityRecord>,
}

impl RecordSet {
    /// Takes ownership of `records` and sorts them by timestamp. The sort is
    /// stable so rows sharing a timestamp keep their source order.
    pub fn new(mut records: Vec<AirQualityRecord>) -> Self {
        records.sort_by_key(|r| r.timestamp);
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AirQualityRecord] {
        &self.records
    }

    /// Observed span of calendar dates, `None` for an empty dataset.
    pub fn span(&self) -> Option<DateRange> {
        let first = self.records.first()?.date();
        let last = self.records.last()?.date();
        DateRange::new(first, last).ok()
    }

    /// Records whose date falls in `range`, as a contiguous slice.
    pub fn filter(&self, range: &DateRange) -> &[AirQualityRecord] {
        let lo = self
            .records
            .partition_point(|r| r.date() < range.start());
        let hi = self
            .records
            .partition_point(|r| r.date() <= range.end());
        if lo >= hi {
            return &[];
        }
        &self.records[lo..hi]
    }

    /// Station names in order of first appearance.
    pub fn stations(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.station.as_str()))
            .map(|r| r.station.as_str())
            .collect()
    }
}
