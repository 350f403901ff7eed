pub mod aggregations;
pub mod correlation;
pub mod dashboard;
pub mod distribution;
pub mod tables;

pub use aggregations::AirQualityAnalyzer;
pub use correlation::pearson;
pub use dashboard::{Dashboard, DashboardOptions};
pub use distribution::{density_histogram, DistributionHistogram, StationHistogram};
pub use tables::{
    CategoryCrossTab, CategoryPercentage, CategoryShare, CorrelationMatrix, MeanRow, MeanTable,
    PollutantMeans, StationCount, StationCounts, YearRainCount, YearlyCategoryShare,
};
