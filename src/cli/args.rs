use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "airq-dashboard")]
#[command(about = "Air-quality dashboard for the Beijing multi-station dataset")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Settings file [default: airq.toml when present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute every dashboard table for a date range
    Report {
        #[arg(short, long, help = "Input CSV file [default: data_path setting]")]
        input: Option<PathBuf>,

        #[arg(long, help = "First day of the range, inclusive (YYYY-MM-DD)")]
        start: Option<NaiveDate>,

        #[arg(long, help = "Last day of the range, inclusive (YYYY-MM-DD)")]
        end: Option<NaiveDate>,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        #[arg(short, long, help = "Write the report to this file instead of stdout")]
        output: Option<PathBuf>,

        #[arg(
            long,
            help = "Write JSON to output/airq-dashboard-{start}_{end}.json",
            conflicts_with = "output"
        )]
        save: bool,

        #[arg(long, help = "Worker threads [default: workers setting]")]
        workers: Option<usize>,

        #[arg(long, help = "Distribution histogram bins")]
        bins: Option<usize>,
    },

    /// Check the dataset for gaps and duplicate observations
    Validate {
        #[arg(short, long, help = "Input CSV file [default: data_path setting]")]
        input: Option<PathBuf>,

        #[arg(long, default_value = "10", help = "Duplicate observations listed in the report")]
        max_listed: usize,
    },

    /// Display dataset span, stations and sample records
    Info {
        #[arg(short, long, help = "Input CSV file [default: data_path setting]")]
        input: Option<PathBuf>,

        #[arg(short, long, default_value = "5")]
        sample: usize,
    },
}
