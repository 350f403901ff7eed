use airq_dashboard::analyzers::{AirQualityAnalyzer, Dashboard, DashboardOptions};
use airq_dashboard::models::{AqiCategory, DateRange, Pollutant, Variable};
use airq_dashboard::processors::IntegrityChecker;
use airq_dashboard::readers::RecordReader;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::TempDir;

const HEADER: &str = "date,station,pm2.5,pm10,so2,no2,co,o3,temp,rain_category,Category,hour";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Two stations over two years, labelled Good and Moderate only, with
/// Moderate the more frequent label.
fn write_fixture(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("combine_df.csv");
    let mut file = std::fs::File::create(&path).expect("create fixture");
    writeln!(file, "{HEADER}").unwrap();

    let rows = [
        "2015-12-31 00:00:00,Dongsi,10,20,5,30,500,40,-2.0,No Rain,Good,0",
        "2015-12-31 23:00:00,Dongsi,,25,6,31,600,42,-3.0,No Rain,Moderate,23",
        "2015-12-31 23:00:00,Wanliu,20,30,7,35,700,38,-1.0,Rain,Moderate,23",
        "2016-01-01 00:00:00,Wanliu,40,50,8,40,800,35,0.5,Rain,Moderate,0",
        "2016-01-01 12:00:00,Dongsi,60,70,9,45,900,30,4.0,No Rain,Moderate,12",
        "2016-06-15 12:00:00,Wanliu,5,15,3,20,300,90,30.0,No Rain,Good,12",
    ];
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    path
}

#[test]
fn test_full_dashboard_from_csv() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_fixture(&dir);

    let records = RecordReader::new().read_path(&path, None).unwrap();
    let span = records.span().unwrap();
    assert_eq!(span, DateRange::new(date(2015, 12, 31), date(2016, 6, 15)).unwrap());

    let dashboard = Dashboard::compute(&records, &span, &DashboardOptions::default());
    assert_eq!(dashboard.total_records, 6);

    // Fixed severity order even though Moderate is more frequent
    let order: Vec<AqiCategory> = dashboard.category_shares.iter().map(|s| s.category).collect();
    assert_eq!(order, vec![AqiCategory::Good, AqiCategory::Moderate]);
    let total: f64 = dashboard.category_shares.iter().map(|s| s.percentage).sum();
    assert!((total - 100.0).abs() < 1e-6);

    // The cross-tab puts the most frequent category first
    assert_eq!(
        dashboard.station_categories.categories,
        vec![AqiCategory::Moderate, AqiCategory::Good]
    );

    for year in &dashboard.yearly_category_shares {
        let sum: f64 = year.percentages.iter().map(|p| p.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-6);
        assert_eq!(year.percentage(AqiCategory::Hazardous), 0.0);
    }

    // Dongsi 2015 pm2.5 has a gap; the yearly mean ignores it
    let y2015 = dashboard.yearly_means.get(&2015).unwrap();
    assert_eq!(y2015.get(Pollutant::Pm25), Some(15.0));

    assert_eq!(
        dashboard
            .correlation
            .get(Variable::Temperature, Variable::Temperature),
        Some(1.0)
    );
}

#[test]
fn test_filter_boundaries_are_inclusive() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_fixture(&dir);
    let records = RecordReader::new().read_path(&path, None).unwrap();

    let range = DateRange::new(date(2015, 12, 31), date(2016, 1, 1)).unwrap();
    let filtered = records.filter(&range);

    assert_eq!(filtered.len(), 5);
    assert_eq!(filtered.first().unwrap().hour, 0);
    assert_eq!(filtered.last().unwrap().hour, 12);

    let counts = AirQualityAnalyzer::new().count_by_station(filtered);
    assert_eq!(counts.get("Dongsi"), Some(3));
    assert_eq!(counts.get("Wanliu"), Some(2));
}

#[test]
fn test_repeated_dashboard_is_identical() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_fixture(&dir);
    let records = RecordReader::new().read_path(&path, None).unwrap();
    let range = DateRange::new(date(2016, 1, 1), date(2016, 12, 31)).unwrap();
    let options = DashboardOptions::default();

    let first = Dashboard::compute(&records, &range, &options);
    let second = Dashboard::compute(&records, &range, &options);

    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn test_integrity_report_on_fixture() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_fixture(&dir);
    let records = RecordReader::new().read_path(&path, None).unwrap();

    let report = IntegrityChecker::new().check_integrity(records.records());

    assert!(report.is_clean());
    assert_eq!(report.missing(Variable::Pollutant(Pollutant::Pm25)), 1);
    assert_eq!(report.station_statistics.len(), 2);
}

#[test]
fn test_bare_date_dataset_keeps_hourly_breakdown() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("daily_dates.csv");
    let mut file = std::fs::File::create(&path).expect("create fixture");
    writeln!(file, "{HEADER}").unwrap();
    writeln!(file, "2013-03-01,Dongsi,30,40,5,30,500,40,2.0,No Rain,Good,5").unwrap();
    writeln!(file, "2013-03-01,Dongsi,90,110,5,30,500,40,6.0,No Rain,Moderate,17").unwrap();
    writeln!(file, "2013-03-02,Wanliu,50,70,5,30,500,40,4.0,Rain,Good,5").unwrap();
    drop(file);

    let records = RecordReader::new().read_path(&path, None).unwrap();
    let range = DateRange::new(date(2013, 3, 1), date(2013, 3, 2)).unwrap();
    let dashboard = Dashboard::compute(&records, &range, &DashboardOptions::default());

    let hours: Vec<u32> = dashboard.hourly_means.keys().copied().collect();
    assert_eq!(hours, vec![5, 17]);
    assert_eq!(
        dashboard.hourly_means.get(&5).unwrap().get(Pollutant::Pm25),
        Some(40.0)
    );
    assert!(IntegrityChecker::new()
        .check_integrity(records.records())
        .is_clean());
}
