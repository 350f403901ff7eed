/// Accepted timestamp layouts for the `date` column
pub const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// File names
pub const DEFAULT_DATA_FILE: &str = "combine_df.csv";
pub const DEFAULT_CONFIG_FILE: &str = "airq.toml";
pub const ENV_PREFIX: &str = "AIRQ";

/// Correlation needs at least this many joint observations
pub const MIN_CORRELATION_PAIRS: usize = 2;

/// Percentage tables sum to this within floating-point tolerance
pub const PERCENT_TOTAL: f64 = 100.0;

/// Distribution histogram defaults
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;
pub const DEFAULT_HISTOGRAM_POLLUTANT: &str = "pm2.5";

/// Processing defaults
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
