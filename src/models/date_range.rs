use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ProcessingError, Result};

/// Inclusive range of calendar dates selecting which records take part in
/// the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(ProcessingError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Single-day range.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Clamp both ends into `span`. A range lying entirely outside the span
    /// collapses onto the nearest edge of it.
    pub fn clamp_to(&self, span: &DateRange) -> DateRange {
        let start = self.start.clamp(span.start, span.end);
        let end = self.end.clamp(span.start, span.end);
        DateRange { start, end }
    }

    pub fn num_days(&self) -> i64 {
        self.end.signed_duration_since(self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
