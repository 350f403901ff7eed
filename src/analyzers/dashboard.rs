use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

use crate::analyzers::aggregations::AirQualityAnalyzer;
use crate::analyzers::distribution::{density_histogram, DistributionHistogram};
use crate::analyzers::tables::{
    CategoryCrossTab, CategoryShare, CorrelationMatrix, MeanTable, PollutantMeans, StationCounts,
    YearRainCount, YearlyCategoryShare,
};
use crate::error::Result;
use crate::models::{AirQualityRecord, DateRange, Pollutant, RecordSet};
use crate::utils::constants::DEFAULT_HISTOGRAM_BINS;

#[derive(Debug, Clone, Copy)]
pub struct DashboardOptions {
    pub histogram_pollutant: Pollutant,
    pub histogram_bins: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            histogram_pollutant: Pollutant::Pm25,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

/// Every table the dashboard page renders for one date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub date_range: DateRange,
    pub total_records: usize,
    pub station_counts: StationCounts,
    pub rain_means: MeanTable<String>,
    pub year_rain_counts: Vec<YearRainCount>,
    pub hourly_means: MeanTable<u32>,
    pub correlation: CorrelationMatrix,
    pub yearly_means: MeanTable<i32>,
    pub station_categories: CategoryCrossTab,
    pub category_shares: Vec<CategoryShare>,
    pub yearly_category_shares: Vec<YearlyCategoryShare>,
    /// Computed over the whole dataset, not the selected range.
    pub distribution: DistributionHistogram,
}

impl Dashboard {
    /// Filter `records` to `range` and run every aggregation sequentially.
    pub fn compute(records: &RecordSet, range: &DateRange, options: &DashboardOptions) -> Self {
        let started = Instant::now();
        let filtered = records.filter(range);
        let analyzer = AirQualityAnalyzer::new();

        let dashboard = Self {
            date_range: *range,
            total_records: filtered.len(),
            station_counts: analyzer.count_by_station(filtered),
            rain_means: analyzer.mean_by_rain_category(filtered),
            year_rain_counts: analyzer.counts_by_year_and_rain(filtered),
            hourly_means: analyzer.mean_by_hour(filtered),
            correlation: analyzer.correlation_matrix(filtered),
            yearly_means: analyzer.mean_by_year(filtered),
            station_categories: analyzer.category_counts_per_station(filtered),
            category_shares: analyzer.category_percentages(filtered),
            yearly_category_shares: analyzer.yearly_category_percentages(filtered),
            distribution: density_histogram(
                records.records(),
                options.histogram_pollutant,
                options.histogram_bins,
            ),
        };

        info!(
            range = %range,
            records = filtered.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dashboard computed"
        );
        dashboard
    }

    /// Same result as [`Dashboard::compute`], with independent aggregations
    /// spread over a pool of `workers` threads.
    pub fn compute_with_workers(
        records: &RecordSet,
        range: &DateRange,
        options: &DashboardOptions,
        workers: usize,
    ) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .build()?;

        let started = Instant::now();
        let filtered = records.filter(range);
        debug!(workers, records = filtered.len(), "computing dashboard in parallel");

        let dashboard = pool.install(|| Self::compute_parallel(records, filtered, range, options));

        info!(
            range = %range,
            records = filtered.len(),
            workers,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dashboard computed"
        );
        Ok(dashboard)
    }

    fn compute_parallel(
        records: &RecordSet,
        filtered: &[AirQualityRecord],
        range: &DateRange,
        options: &DashboardOptions,
    ) -> Self {
        let analyzer = AirQualityAnalyzer::new();

        let ((station_counts, rain_means), (year_rain_counts, hourly_means)) = rayon::join(
            || {
                rayon::join(
                    || analyzer.count_by_station(filtered),
                    || analyzer.mean_by_rain_category(filtered),
                )
            },
            || {
                rayon::join(
                    || analyzer.counts_by_year_and_rain(filtered),
                    || analyzer.mean_by_hour(filtered),
                )
            },
        );

        let ((correlation, yearly_means), (station_categories, category_shares)) = rayon::join(
            || {
                rayon::join(
                    || analyzer.correlation_matrix(filtered),
                    || analyzer.mean_by_year(filtered),
                )
            },
            || {
                rayon::join(
                    || analyzer.category_counts_per_station(filtered),
                    || analyzer.category_percentages(filtered),
                )
            },
        );

        let (yearly_category_shares, distribution) = rayon::join(
            || analyzer.yearly_category_percentages(filtered),
            || {
                density_histogram(
                    records.records(),
                    options.histogram_pollutant,
                    options.histogram_bins,
                )
            },
        );

        Self {
            date_range: *range,
            total_records: filtered.len(),
            station_counts,
            rain_means,
            year_rain_counts,
            hourly_means,
            correlation,
            yearly_means,
            station_categories,
            category_shares,
            yearly_category_shares,
            distribution,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Air Quality Dashboard ===\n");
        summary.push_str(&format!(
            "Date Range: {} ({} days)\n",
            self.date_range,
            self.date_range.num_days()
        ));
        summary.push_str(&format!("Total Data: {}\n", self.total_records));
        for row in &self.station_counts.rows {
            summary.push_str(&format!("  Data {}: {}\n", row.station, row.count));
        }

        if self.total_records == 0 {
            summary.push_str("\nNo records in the selected range\n");
            return summary;
        }

        summary.push_str("\nAir Quality Percentage by Category:\n");
        for share in &self.category_shares {
            summary.push_str(&format!(
                "  {:<32} {:>8} ({:.1}%)\n",
                share.category.label(),
                share.count,
                share.percentage
            ));
        }

        summary.push_str("\nAir Quality Percentage by Category per Year:\n");
        for year in &self.yearly_category_shares {
            let cells: Vec<String> = year
                .percentages
                .iter()
                .map(|p| format!("{} {:.1}%", p.category.label(), p.percentage))
                .collect();
            summary.push_str(&format!("  {}: {}\n", year.year, cells.join(", ")));
        }

        let crosstab = &self.station_categories;
        summary.push_str("\nAir Quality Category Counts per Station:\n");
        for (station, counts) in crosstab.stations.iter().zip(&crosstab.counts) {
            let cells: Vec<String> = crosstab
                .categories
                .iter()
                .zip(counts)
                .map(|(c, n)| format!("{} {}", c.label(), n))
                .collect();
            summary.push_str(&format!("  {}: {}\n", station, cells.join(", ")));
        }
        let totals: Vec<String> = crosstab
            .categories
            .iter()
            .map(|c| format!("{} {}", c.label(), crosstab.column_total(*c)))
            .collect();
        summary.push_str(&format!("  Total: {}\n", totals.join(", ")));

        summary.push_str("\nCorrelation between Temperature and Air Pollution:\n");
        let header: Vec<String> = self
            .correlation
            .variables
            .iter()
            .map(|v| format!("{:>7}", v.column_name()))
            .collect();
        summary.push_str(&format!("  {:<7}{}\n", "", header.join("")));
        for (variable, row) in self.correlation.variables.iter().zip(&self.correlation.values) {
            let cells: Vec<String> = row.iter().map(|v| format!("{:>7}", fmt_value(*v, 2))).collect();
            summary.push_str(&format!("  {:<7}{}\n", variable.column_name(), cells.join("")));
        }

        summary.push_str("\nAverage Pollutant Levels by Rain Condition:\n");
        push_mean_table(&mut summary, &self.rain_means);

        summary.push_str("\nRecords by Year and Rain Condition:\n");
        for row in &self.year_rain_counts {
            summary.push_str(&format!(
                "  {} {:<10} {}\n",
                row.year, row.rain_category, row.count
            ));
        }

        summary.push_str("\nAverage Pollutant Levels by Year:\n");
        push_mean_table(&mut summary, &self.yearly_means);

        summary.push_str("\nAverage Pollutant Levels by Hour:\n");
        push_mean_table(&mut summary, &self.hourly_means);

        summary.push_str(&format!(
            "\nDistribution of {} (all data): {} bins\n",
            self.distribution.pollutant,
            self.distribution.bin_count()
        ));
        for station in &self.distribution.stations {
            summary.push_str(&format!(
                "  {}: {} observations\n",
                station.station, station.observations
            ));
        }

        summary
    }
}

fn fmt_value(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "n/a".to_string(),
    }
}

fn fmt_means(means: &PollutantMeans) -> String {
    means
        .iter()
        .map(|(p, v)| format!("{} {}", p.display_name(), fmt_value(v, 1)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_mean_table<K>(summary: &mut String, table: &MeanTable<K>)
where
    K: std::fmt::Display + PartialEq,
{
    for row in &table.rows {
        summary.push_str(&format!("  {}: {}\n", row.key, fmt_means(&row.means)));
    }
}
