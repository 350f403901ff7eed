use crate::analyzers::{AirQualityAnalyzer, Dashboard, DashboardOptions};
use crate::cli::args::{Cli, Commands, OutputFormat};
use crate::error::{ProcessingError, Result};
use crate::models::{DateRange, RecordSet};
use crate::processors::IntegrityChecker;
use crate::readers::RecordReader;
use crate::utils::filename::generate_range_report_filename;
use crate::utils::logging::init_logging;
use crate::utils::progress::ProgressReporter;
use crate::utils::settings::Settings;
use chrono::NaiveDate;
use std::path::Path;
use tracing::{info, warn};

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Report {
            input,
            start,
            end,
            format,
            output,
            save,
            workers,
            bins,
        } => {
            let input = input.unwrap_or_else(|| settings.data_path.clone());
            let quiet = format == OutputFormat::Json && output.is_none() && !save;
            let records = load_records(&input, quiet)?;

            let span = records.span().ok_or_else(|| {
                ProcessingError::MissingData(format!("no records in {}", input.display()))
            })?;
            let range = resolve_range(start, end, &span)?;

            let options = DashboardOptions {
                histogram_pollutant: settings.histogram_pollutant()?,
                histogram_bins: bins.unwrap_or(settings.histogram_bins),
            };
            let workers = workers.unwrap_or(settings.workers);

            let dashboard = if workers > 1 {
                Dashboard::compute_with_workers(&records, &range, &options, workers)?
            } else {
                Dashboard::compute(&records, &range, &options)
            };

            let rendered = match format {
                OutputFormat::Text if !save => dashboard.summary(),
                _ => dashboard.to_json()?,
            };

            let destination = if save {
                Some(generate_range_report_filename(&range))
            } else {
                output
            };

            match destination {
                Some(path) => {
                    write_output(&path, &rendered)?;
                    println!("Report written to {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }

        Commands::Validate { input, max_listed } => {
            let input = input.unwrap_or_else(|| settings.data_path.clone());
            let records = load_records(&input, false)?;

            let checker = IntegrityChecker::with_max_listed_issues(max_listed);
            let report = checker.check_integrity(records.records());
            println!("\n{}", checker.generate_summary(&report));

            if report.is_clean() {
                println!("✅ All data passed validation checks");
            } else {
                println!(
                    "⚠️  Found {} duplicate observations, {} records without readings and {} hour mismatches",
                    report.duplicates.len(),
                    report.records_without_readings,
                    report.hour_mismatches
                );
            }
        }

        Commands::Info { input, sample } => {
            let input = input.unwrap_or_else(|| settings.data_path.clone());
            let records = load_records(&input, false)?;

            println!("Dataset: {}", input.display());
            println!("Records: {}", records.len());
            match records.span() {
                Some(span) => println!("Date Range: {} ({} days)", span, span.num_days()),
                None => println!("Date Range: no data"),
            }

            let counts = AirQualityAnalyzer::new().count_by_station(records.records());
            println!("Stations: {}", counts.rows.len());
            for row in &counts.rows {
                println!("  {}: {} records", row.station, row.count);
            }

            if sample > 0 {
                println!("\nSample Records (showing {} records):", sample);
                for (i, record) in records.records().iter().take(sample).enumerate() {
                    println!(
                        "{}. {} at {}: pm2.5={}, temp={}, {} ({})",
                        i + 1,
                        record.station,
                        record.timestamp,
                        record
                            .pm2_5
                            .map_or_else(|| "n/a".to_string(), |v| format!("{:.1}", v)),
                        record
                            .temperature
                            .map_or_else(|| "n/a".to_string(), |v| format!("{:.1}°C", v)),
                        record.category,
                        record.rain_category
                    );
                }
            }
        }
    }

    Ok(())
}

fn load_records(path: &Path, quiet: bool) -> Result<RecordSet> {
    let progress = ProgressReporter::new_spinner("Loading records...", quiet);
    let records = RecordReader::new().read_path(path, Some(&progress))?;
    progress.finish_and_clear();
    Ok(records)
}

/// Missing ends default to the dataset span; the result is clamped into it.
pub fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    span: &DateRange,
) -> Result<DateRange> {
    let requested = DateRange::new(
        start.unwrap_or_else(|| span.start()),
        end.unwrap_or_else(|| span.end()),
    )?;
    let range = requested.clamp_to(span);
    if range != requested {
        warn!(requested = %requested, clamped = %range, "date range clamped to dataset span");
    }
    info!(range = %range, "selected date range");
    Ok(range)
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents)?;
    Ok(())
}
