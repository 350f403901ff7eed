//! Result tables handed to the presentation layer.
//!
//! Every table is plain data with a stable serialized shape; missing values
//! serialize as `null`.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::models::{AqiCategory, Pollutant, Variable};

/// One mean per pollutant, `None` where a group had no readings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PollutantMeans {
    values: [Option<f64>; 6],
}

impl PollutantMeans {
    pub fn new(values: [Option<f64>; 6]) -> Self {
        Self { values }
    }

    pub fn get(&self, pollutant: Pollutant) -> Option<f64> {
        self.values[pollutant.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pollutant, Option<f64>)> + '_ {
        Pollutant::ALL.iter().map(move |p| (*p, self.get(*p)))
    }
}

impl Serialize for PollutantMeans {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Pollutant::ALL.len()))?;
        for (pollutant, value) in self.iter() {
            map.serialize_entry(pollutant.column_name(), &value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanRow<K> {
    pub key: K,
    pub means: PollutantMeans,
}

/// Pollutant means grouped by a key, rows in ascending key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanTable<K> {
    pub rows: Vec<MeanRow<K>>,
}

impl<K: PartialEq> MeanTable<K> {
    pub fn get(&self, key: &K) -> Option<&PollutantMeans> {
        self.rows.iter().find(|r| &r.key == key).map(|r| &r.means)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.rows.iter().map(|r| &r.key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationCount {
    pub station: String,
    pub count: usize,
}

/// Record count per station in order of first appearance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StationCounts {
    pub rows: Vec<StationCount>,
}

impl StationCounts {
    pub fn get(&self, station: &str) -> Option<usize> {
        self.rows
            .iter()
            .find(|r| r.station == station)
            .map(|r| r.count)
    }

    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearRainCount {
    pub year: i32,
    pub rain_category: String,
    pub count: usize,
}

/// Square Pearson matrix over `variables`; `None` marks an undefined
/// coefficient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub variables: Vec<Variable>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Variable, b: Variable) -> Option<f64> {
        let i = self.variables.iter().position(|v| *v == a)?;
        let j = self.variables.iter().position(|v| *v == b)?;
        self.values[i][j]
    }
}

/// Station × category record counts. Columns hold only categories that
/// occur, most frequent overall first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CategoryCrossTab {
    pub stations: Vec<String>,
    pub categories: Vec<AqiCategory>,
    pub counts: Vec<Vec<usize>>,
}

impl CategoryCrossTab {
    pub fn count(&self, station: &str, category: AqiCategory) -> Option<usize> {
        let row = self.stations.iter().position(|s| s == station)?;
        let col = self.categories.iter().position(|c| *c == category)?;
        Some(self.counts[row][col])
    }

    pub fn column_total(&self, category: AqiCategory) -> usize {
        match self.categories.iter().position(|c| *c == category) {
            Some(col) => self.counts.iter().map(|row| row[col]).sum(),
            None => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: AqiCategory,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPercentage {
    pub category: AqiCategory,
    pub percentage: f64,
}

/// One year's category distribution; always lists all six categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyCategoryShare {
    pub year: i32,
    pub total: usize,
    pub percentages: Vec<CategoryPercentage>,
}

impl YearlyCategoryShare {
    pub fn percentage(&self, category: AqiCategory) -> f64 {
        self.percentages
            .iter()
            .find(|p| p.category == category)
            .map_or(0.0, |p| p.percentage)
    }
}
