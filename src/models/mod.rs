pub mod category;
pub mod date_range;
pub mod pollutant;
pub mod record;
pub mod record_set;

pub use category::AqiCategory;
pub use date_range::DateRange;
pub use pollutant::{Pollutant, Variable};
pub use record::{AirQualityRecord, AirQualityRecordBuilder};
pub use record_set::RecordSet;
