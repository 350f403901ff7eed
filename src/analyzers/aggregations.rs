use std::collections::{BTreeMap, HashMap};

use crate::analyzers::correlation::pearson;
use crate::analyzers::tables::{
    CategoryCrossTab, CategoryPercentage, CategoryShare, CorrelationMatrix, MeanRow, MeanTable,
    PollutantMeans, StationCount, StationCounts, YearRainCount, YearlyCategoryShare,
};
use crate::models::{AirQualityRecord, AqiCategory, Pollutant, Variable};
use crate::utils::constants::PERCENT_TOTAL;

/// Running sums and counts per pollutant; missing readings touch neither.
#[derive(Debug, Clone, Copy, Default)]
struct MeanAccumulator {
    sums: [f64; 6],
    counts: [usize; 6],
}

impl MeanAccumulator {
    fn add(&mut self, record: &AirQualityRecord) {
        for pollutant in Pollutant::ALL {
            if let Some(value) = record.reading(pollutant) {
                self.sums[pollutant.index()] += value;
                self.counts[pollutant.index()] += 1;
            }
        }
    }

    fn finish(&self) -> PollutantMeans {
        let mut values = [None; 6];
        for (i, value) in values.iter_mut().enumerate() {
            if self.counts[i] > 0 {
                *value = Some(self.sums[i] / self.counts[i] as f64);
            }
        }
        PollutantMeans::new(values)
    }
}

fn category_counts<'a>(records: impl IntoIterator<Item = &'a AirQualityRecord>) -> [usize; 6] {
    let mut counts = [0usize; 6];
    for record in records {
        counts[record.category.rank()] += 1;
    }
    counts
}

/// The dashboard's aggregation engine. Every method is a pure function of
/// the filtered records it is given.
pub struct AirQualityAnalyzer;

impl AirQualityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Record count per station, stations in order of first appearance.
    pub fn count_by_station(&self, records: &[AirQualityRecord]) -> StationCounts {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut rows: Vec<StationCount> = Vec::new();

        for record in records {
            let slot = *index.entry(record.station.as_str()).or_insert_with(|| {
                rows.push(StationCount {
                    station: record.station.clone(),
                    count: 0,
                });
                rows.len() - 1
            });
            rows[slot].count += 1;
        }

        StationCounts { rows }
    }

    pub fn mean_by_rain_category(&self, records: &[AirQualityRecord]) -> MeanTable<String> {
        self.grouped_means(records, |r| r.rain_category.clone())
    }

    /// Hours without any record are absent rather than zero-filled.
    pub fn mean_by_hour(&self, records: &[AirQualityRecord]) -> MeanTable<u32> {
        self.grouped_means(records, |r| r.hour)
    }

    pub fn mean_by_year(&self, records: &[AirQualityRecord]) -> MeanTable<i32> {
        self.grouped_means(records, |r| r.year())
    }

    fn grouped_means<K, F>(&self, records: &[AirQualityRecord], key_fn: F) -> MeanTable<K>
    where
        K: Ord,
        F: Fn(&AirQualityRecord) -> K,
    {
        let mut groups: BTreeMap<K, MeanAccumulator> = BTreeMap::new();
        for record in records {
            groups.entry(key_fn(record)).or_default().add(record);
        }

        MeanTable {
            rows: groups
                .into_iter()
                .map(|(key, acc)| MeanRow {
                    key,
                    means: acc.finish(),
                })
                .collect(),
        }
    }

    /// Long-format counts ordered by year, then rain category.
    pub fn counts_by_year_and_rain(&self, records: &[AirQualityRecord]) -> Vec<YearRainCount> {
        let mut counts: BTreeMap<(i32, &str), usize> = BTreeMap::new();
        for record in records {
            *counts
                .entry((record.year(), record.rain_category.as_str()))
                .or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|((year, rain_category), count)| YearRainCount {
                year,
                rain_category: rain_category.to_string(),
                count,
            })
            .collect()
    }

    /// Pairwise Pearson coefficients between temperature and the six
    /// pollutants. Each pair uses only rows where both values are present.
    pub fn correlation_matrix(&self, records: &[AirQualityRecord]) -> CorrelationMatrix {
        let variables = Variable::CORRELATION_ORDER.to_vec();
        let n = variables.len();
        let mut values = vec![vec![None; n]; n];

        for i in 0..n {
            for j in i..n {
                let pairs: Vec<(f64, f64)> = records
                    .iter()
                    .filter_map(|r| Some((r.value(variables[i])?, r.value(variables[j])?)))
                    .collect();
                let r = pearson(&pairs);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        CorrelationMatrix { variables, values }
    }

    /// Cross-tabulation of stations against categories. Stations are sorted
    /// by name; only categories that occur become columns, ordered by
    /// descending total with ties kept in severity order.
    pub fn category_counts_per_station(&self, records: &[AirQualityRecord]) -> CategoryCrossTab {
        let mut per_station: BTreeMap<&str, [usize; 6]> = BTreeMap::new();
        for record in records {
            per_station.entry(record.station.as_str()).or_insert([0; 6])[record.category.rank()] +=
                1;
        }

        let mut totals = [0usize; 6];
        for counts in per_station.values() {
            for (total, count) in totals.iter_mut().zip(counts) {
                *total += count;
            }
        }

        let mut categories: Vec<AqiCategory> = AqiCategory::ORDERED
            .iter()
            .copied()
            .filter(|c| totals[c.rank()] > 0)
            .collect();
        categories.sort_by(|a, b| totals[b.rank()].cmp(&totals[a.rank()]));

        CategoryCrossTab {
            stations: per_station.keys().map(|s| s.to_string()).collect(),
            counts: per_station
                .values()
                .map(|counts| categories.iter().map(|c| counts[c.rank()]).collect())
                .collect(),
            categories,
        }
    }

    /// Share of each occurring category over the whole set, in severity
    /// order regardless of frequency.
    pub fn category_percentages(&self, records: &[AirQualityRecord]) -> Vec<CategoryShare> {
        let total = records.len();
        if total == 0 {
            return Vec::new();
        }

        let counts = category_counts(records);
        AqiCategory::ORDERED
            .iter()
            .filter(|c| counts[c.rank()] > 0)
            .map(|c| CategoryShare {
                category: *c,
                count: counts[c.rank()],
                percentage: counts[c.rank()] as f64 / total as f64 * PERCENT_TOTAL,
            })
            .collect()
    }

    /// Per-year category shares; each year lists all six categories,
    /// zero-filled, and sums to 100.
    pub fn yearly_category_percentages(
        &self,
        records: &[AirQualityRecord],
    ) -> Vec<YearlyCategoryShare> {
        let mut per_year: BTreeMap<i32, Vec<&AirQualityRecord>> = BTreeMap::new();
        for record in records {
            per_year.entry(record.year()).or_default().push(record);
        }

        per_year
            .into_iter()
            .map(|(year, rows)| {
                let total = rows.len();
                let counts = category_counts(rows);
                YearlyCategoryShare {
                    year,
                    total,
                    percentages: AqiCategory::ORDERED
                        .iter()
                        .map(|c| CategoryPercentage {
                            category: *c,
                            percentage: counts[c.rank()] as f64 / total as f64 * PERCENT_TOTAL,
                        })
                        .collect(),
                }
            })
            .collect()
    }
}

impl Default for AirQualityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use pretty_assertions::assert_eq;

    const EPSILON: f64 = 1e-6;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn record(
        timestamp: NaiveDateTime,
        station: &str,
        pm25: Option<f64>,
        rain: &str,
        category: AqiCategory,
    ) -> AirQualityRecord {
        AirQualityRecord::builder()
            .timestamp(timestamp)
            .station(station)
            .maybe_reading(Pollutant::Pm25, pm25)
            .rain_category(rain)
            .category(category)
            .build()
            .unwrap()
    }

    fn sample() -> Vec<AirQualityRecord> {
        vec![
            record(at(2015, 1, 1, 0), "Wanliu", Some(10.0), "No Rain", AqiCategory::Good),
            record(at(2015, 1, 1, 1), "Dongsi", None, "Rain", AqiCategory::Moderate),
            record(at(2015, 6, 1, 0), "Wanliu", Some(20.0), "Rain", AqiCategory::Moderate),
            record(at(2016, 1, 1, 1), "Shunyi", Some(30.0), "No Rain", AqiCategory::Hazardous),
            record(at(2016, 1, 2, 0), "Dongsi", Some(50.0), "No Rain", AqiCategory::Moderate),
        ]
    }

    #[test]
    fn test_count_by_station_first_appearance_order() {
        let counts = AirQualityAnalyzer::new().count_by_station(&sample());

        let stations: Vec<&str> = counts.rows.iter().map(|r| r.station.as_str()).collect();
        assert_eq!(stations, vec!["Wanliu", "Dongsi", "Shunyi"]);
        assert_eq!(counts.get("Wanliu"), Some(2));
        assert_eq!(counts.get("Shunyi"), Some(1));
        assert_eq!(counts.total(), 5);
    }

    #[test]
    fn test_mean_excludes_missing_readings() {
        let records = vec![
            record(at(2015, 1, 1, 0), "A", Some(10.0), "Rain", AqiCategory::Good),
            record(at(2015, 1, 1, 1), "A", None, "Rain", AqiCategory::Good),
            record(at(2015, 1, 1, 2), "A", Some(20.0), "Rain", AqiCategory::Good),
        ];

        let table = AirQualityAnalyzer::new().mean_by_rain_category(&records);
        let means = table.get(&"Rain".to_string()).unwrap();

        assert_eq!(means.get(Pollutant::Pm25), Some(15.0));
        // No pm10 reading anywhere in the group
        assert_eq!(means.get(Pollutant::Pm10), None);
    }

    #[test]
    fn test_mean_by_rain_category_sorted_keys() {
        let table = AirQualityAnalyzer::new().mean_by_rain_category(&sample());

        let keys: Vec<&String> = table.keys().collect();
        assert_eq!(keys, vec!["No Rain", "Rain"]);
        let no_rain = table.get(&"No Rain".to_string()).unwrap();
        assert!((no_rain.get(Pollutant::Pm25).unwrap() - 30.0).abs() < EPSILON);
        let rain = table.get(&"Rain".to_string()).unwrap();
        assert_eq!(rain.get(Pollutant::Pm25), Some(20.0));
    }

    #[test]
    fn test_mean_by_hour_omits_absent_hours() {
        let table = AirQualityAnalyzer::new().mean_by_hour(&sample());

        let hours: Vec<u32> = table.keys().copied().collect();
        assert_eq!(hours, vec![0, 1]);
        assert!(table.get(&5).is_none());
        assert!((table.get(&0).unwrap().get(Pollutant::Pm25).unwrap() - 80.0 / 3.0).abs() < EPSILON);
        assert_eq!(table.get(&1).unwrap().get(Pollutant::Pm25), Some(30.0));
    }

    #[test]
    fn test_mean_by_year() {
        let table = AirQualityAnalyzer::new().mean_by_year(&sample());

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&2015).unwrap().get(Pollutant::Pm25), Some(15.0));
        assert_eq!(table.get(&2016).unwrap().get(Pollutant::Pm25), Some(40.0));
    }

    #[test]
    fn test_counts_by_year_and_rain() {
        let rows = AirQualityAnalyzer::new().counts_by_year_and_rain(&sample());

        let expected = vec![
            YearRainCount {
                year: 2015,
                rain_category: "No Rain".to_string(),
                count: 1,
            },
            YearRainCount {
                year: 2015,
                rain_category: "Rain".to_string(),
                count: 2,
            },
            YearRainCount {
                year: 2016,
                rain_category: "No Rain".to_string(),
                count: 2,
            },
        ];
        assert_eq!(rows, expected);
    }

    #[test]
    fn test_correlation_matrix_symmetry_and_diagonal() {
        let records: Vec<AirQualityRecord> = (0..24)
            .map(|h| {
                AirQualityRecord::builder()
                    .timestamp(at(2016, 5, 1, h))
                    .station("Dongsi")
                    .reading(Pollutant::Pm25, 10.0 + h as f64 * 1.5)
                    .reading(Pollutant::O3, 200.0 - h as f64 * 3.0)
                    .reading(Pollutant::No2, if h % 2 == 0 { 40.0 } else { 55.0 })
                    .temperature(5.0 + h as f64 * 0.5)
                    .rain_category("No Rain")
                    .category(AqiCategory::Good)
                    .build()
                    .unwrap()
            })
            .collect();

        let matrix = AirQualityAnalyzer::new().correlation_matrix(&records);
        let temp = Variable::Temperature;
        let pm25 = Variable::Pollutant(Pollutant::Pm25);
        let o3 = Variable::Pollutant(Pollutant::O3);
        let so2 = Variable::Pollutant(Pollutant::So2);

        assert_eq!(matrix.variables.len(), 7);
        assert_eq!(matrix.get(temp, temp), Some(1.0));
        assert!((matrix.get(temp, pm25).unwrap() - 1.0).abs() < 1e-9);
        assert!((matrix.get(temp, o3).unwrap() + 1.0).abs() < 1e-9);
        assert_eq!(matrix.get(pm25, o3), matrix.get(o3, pm25));
        // so2 never measured: undefined, including on the diagonal
        assert_eq!(matrix.get(so2, so2), None);
        assert_eq!(matrix.get(temp, so2), None);
    }

    #[test]
    fn test_correlation_single_joint_observation_is_undefined() {
        let records = vec![
            AirQualityRecord::builder()
                .timestamp(at(2016, 5, 1, 0))
                .station("Dongsi")
                .reading(Pollutant::Pm25, 10.0)
                .temperature(3.0)
                .rain_category("Rain")
                .category(AqiCategory::Good)
                .build()
                .unwrap(),
            AirQualityRecord::builder()
                .timestamp(at(2016, 5, 1, 1))
                .station("Dongsi")
                .reading(Pollutant::Pm25, 12.0)
                .rain_category("Rain")
                .category(AqiCategory::Good)
                .build()
                .unwrap(),
        ];

        let matrix = AirQualityAnalyzer::new().correlation_matrix(&records);
        assert_eq!(
            matrix.get(Variable::Temperature, Variable::Pollutant(Pollutant::Pm25)),
            None
        );
        assert_eq!(
            matrix.get(
                Variable::Pollutant(Pollutant::Pm25),
                Variable::Pollutant(Pollutant::Pm25)
            ),
            Some(1.0)
        );
    }

    #[test]
    fn test_category_counts_per_station_sorted_by_total() {
        let table = AirQualityAnalyzer::new().category_counts_per_station(&sample());

        assert_eq!(table.stations, vec!["Dongsi", "Shunyi", "Wanliu"]);
        // Moderate (3) first, then Good and Hazardous tied at 1 in severity order
        assert_eq!(
            table.categories,
            vec![AqiCategory::Moderate, AqiCategory::Good, AqiCategory::Hazardous]
        );
        assert_eq!(table.count("Dongsi", AqiCategory::Moderate), Some(2));
        assert_eq!(table.count("Shunyi", AqiCategory::Good), Some(0));

        for pair in table.categories.windows(2) {
            assert!(table.column_total(pair[0]) >= table.column_total(pair[1]));
        }
    }

    #[test]
    fn test_category_percentages_fixed_order_and_total() {
        // Moderate dominates but Good still comes first
        let records = vec![
            record(at(2015, 1, 1, 0), "A", None, "Rain", AqiCategory::Moderate),
            record(at(2015, 1, 1, 1), "A", None, "Rain", AqiCategory::Moderate),
            record(at(2016, 1, 1, 0), "B", None, "Rain", AqiCategory::Moderate),
            record(at(2016, 1, 1, 1), "B", None, "Rain", AqiCategory::Good),
        ];

        let shares = AirQualityAnalyzer::new().category_percentages(&records);

        let order: Vec<AqiCategory> = shares.iter().map(|s| s.category).collect();
        assert_eq!(order, vec![AqiCategory::Good, AqiCategory::Moderate]);
        assert_eq!(shares[0].percentage, 25.0);
        assert_eq!(shares[1].count, 3);
        let sum: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() < EPSILON);
    }

    #[test]
    fn test_yearly_percentages_zero_filled() {
        let shares = AirQualityAnalyzer::new().yearly_category_percentages(&sample());

        assert_eq!(shares.len(), 2);
        for year in &shares {
            assert_eq!(year.percentages.len(), 6);
            let order: Vec<AqiCategory> = year.percentages.iter().map(|p| p.category).collect();
            assert_eq!(order, AqiCategory::ORDERED.to_vec());
            let sum: f64 = year.percentages.iter().map(|p| p.percentage).sum();
            assert!((sum - 100.0).abs() < EPSILON);
        }

        let y2015 = &shares[0];
        assert_eq!(y2015.year, 2015);
        assert_eq!(y2015.total, 3);
        assert!((y2015.percentage(AqiCategory::Moderate) - 200.0 / 3.0).abs() < EPSILON);
        assert_eq!(y2015.percentage(AqiCategory::Hazardous), 0.0);
    }

    #[test]
    fn test_empty_input_is_well_typed() {
        let analyzer = AirQualityAnalyzer::new();
        let empty: Vec<AirQualityRecord> = Vec::new();

        assert!(analyzer.count_by_station(&empty).rows.is_empty());
        assert!(analyzer.mean_by_rain_category(&empty).is_empty());
        assert!(analyzer.mean_by_hour(&empty).is_empty());
        assert!(analyzer.mean_by_year(&empty).is_empty());
        assert!(analyzer.counts_by_year_and_rain(&empty).is_empty());
        assert!(analyzer.category_percentages(&empty).is_empty());
        assert!(analyzer.yearly_category_percentages(&empty).is_empty());

        let crosstab = analyzer.category_counts_per_station(&empty);
        assert!(crosstab.stations.is_empty());
        assert!(crosstab.categories.is_empty());

        let matrix = analyzer.correlation_matrix(&empty);
        assert!(matrix.values.iter().flatten().all(|v| v.is_none()));
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let analyzer = AirQualityAnalyzer::new();
        let records = sample();

        assert_eq!(
            analyzer.correlation_matrix(&records),
            analyzer.correlation_matrix(&records)
        );
        assert_eq!(
            analyzer.yearly_category_percentages(&records),
            analyzer.yearly_category_percentages(&records)
        );
        assert_eq!(analyzer.mean_by_hour(&records), analyzer.mean_by_hour(&records));
    }
}
