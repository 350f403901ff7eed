pub mod constants;
pub mod filename;
pub mod logging;
pub mod progress;
pub mod settings;

pub use constants::*;
pub use filename::generate_range_report_filename;
pub use logging::init_logging;
pub use progress::ProgressReporter;
pub use settings::Settings;
