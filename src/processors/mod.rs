pub mod integrity_checker;

pub use integrity_checker::{
    DuplicateObservation, IntegrityChecker, IntegrityReport, StationStatistics,
};
