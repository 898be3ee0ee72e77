pub mod metric;
pub mod observation;
pub mod region;

pub use metric::Metric;
pub use observation::{
    sanitize_value, FieldValue, ObservationReading, StoredObservation, FIELD_NAMES,
    NUMERIC_FIELDS,
};
pub use region::{Region, RegionConfig};
