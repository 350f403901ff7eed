use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::Pollutant;
use crate::utils::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_DATA_FILE, DEFAULT_HISTOGRAM_BINS, DEFAULT_HISTOGRAM_POLLUTANT,
    ENV_PREFIX,
};

/// Runtime settings: built-in defaults, then `airq.toml` (or an explicit
/// file), then `AIRQ_*` environment variables.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    pub data_path: PathBuf,

    #[validate(range(min = 1))]
    pub histogram_bins: usize,

    pub histogram_pollutant: String,

    #[validate(range(min = 1))]
    pub workers: usize,
}

impl Settings {
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let builder = Config::builder()
            .set_default("data_path", DEFAULT_DATA_FILE)?
            .set_default("histogram_bins", DEFAULT_HISTOGRAM_BINS as u64)?
            .set_default("histogram_pollutant", DEFAULT_HISTOGRAM_POLLUTANT)?
            .set_default("workers", num_cpus::get() as u64)?;

        // An explicitly named file must exist; the default one is optional.
        let builder = match config_file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false)),
        };

        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn histogram_pollutant(&self) -> Result<Pollutant> {
        Pollutant::parse(&self.histogram_pollutant).ok_or_else(|| {
            ProcessingError::Config(config::ConfigError::Message(format!(
                "unknown histogram pollutant '{}'",
                self.histogram_pollutant
            )))
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            histogram_pollutant: DEFAULT_HISTOGRAM_POLLUTANT.to_string(),
            workers: num_cpus::get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_file_overrides_defaults() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "data_path = \"data/beijing.csv\"")?;
        writeln!(file, "histogram_bins = 12")?;
        writeln!(file, "histogram_pollutant = \"pm10\"")?;

        let settings = Settings::load(Some(file.path()))?;

        assert_eq!(settings.data_path, PathBuf::from("data/beijing.csv"));
        assert_eq!(settings.histogram_bins, 12);
        assert_eq!(settings.histogram_pollutant()?, Pollutant::Pm10);
        assert!(settings.workers >= 1);
        Ok(())
    }

    #[test]
    fn test_zero_bins_rejected() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "histogram_bins = 0")?;

        let result = Settings::load(Some(file.path()));
        assert!(matches!(result, Err(ProcessingError::Validation(_))));
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Settings::load(Some(Path::new("does/not/exist.toml")));
        assert!(matches!(result, Err(ProcessingError::Config(_))));
    }

    #[test]
    fn test_unknown_pollutant() {
        let settings = Settings {
            histogram_pollutant: "benzene".to_string(),
            ..Settings::default()
        };
        assert!(settings.histogram_pollutant().is_err());
    }
}
