use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::error::{ProcessingError, Result};

/// Install the global tracing subscriber. `RUST_LOG` takes precedence over
/// the `verbose` flag.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_directives = if verbose {
        "airq_dashboard=debug,info"
    } else {
        "airq_dashboard=info,warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| ProcessingError::Logging(e.to_string()))
}
