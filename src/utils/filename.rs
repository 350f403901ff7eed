use std::path::PathBuf;

use crate::models::DateRange;

/// Generate a report filename naming the selected range: airq-dashboard-{start}_{end}.json
pub fn generate_range_report_filename(range: &DateRange) -> PathBuf {
    let filename = format!(
        "airq-dashboard-{}_{}.json",
        range.start().format("%Y%m%d"),
        range.end().format("%Y%m%d")
    );
    PathBuf::from("output").join(filename)
}
