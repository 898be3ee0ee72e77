//! SQLite-backed observation store.

pub mod database;
pub mod query;
pub mod schema;

pub use database::WeatherDatabase;
pub use query::{
    MetricSeries, MetricStats, ObservationQuery, RegionSummary, SaveOutcome, SeriesPoint,
    StoreHealth,
};
