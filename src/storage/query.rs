use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::timestamp;

/// Filters for reading observations back; every field is optional and bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationQuery {
    pub region_code: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl ObservationQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region_code: impl Into<String>) -> Self {
        self.region_code = Some(region_code.into());
        self
    }

    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Outcome of a single idempotent write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// A row for the same region and timestamp already exists.
    Skipped,
    /// The reading carried no timestamp.
    Rejected,
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }
}

/// One `(timestamp, value)` pair of a metric series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    #[serde(with = "timestamp::canonical")]
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Per-region metric series, time ascending.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricSeries {
    pub series: Vec<(String, Vec<SeriesPoint>)>,
}

impl MetricSeries {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|(_, points)| points.is_empty())
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|(_, points)| points.len()).sum()
    }

    pub fn region(&self, code: &str) -> Option<&[SeriesPoint]> {
        self.series
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, points)| points.as_slice())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub code: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub last_update: Option<String>,
    pub data_points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub region_code: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreHealth {
    pub total_records: i64,
    pub regions_count: i64,
    pub last_update: Option<String>,
}

/// Round to two decimal places for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let query = ObservationQuery::new().with_region("london").with_limit(5);
        assert_eq!(query.region_code.as_deref(), Some("london"));
        assert_eq!(query.limit, Some(5));
        assert!(query.start.is_none());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(-1.234), -1.23);
        assert_eq!(round2(10.0), 10.0);
    }

    #[test]
    fn test_save_outcome_is_saved() {
        assert!(SaveOutcome::Saved.is_saved());
        assert!(!SaveOutcome::Skipped.is_saved());
        assert!(!SaveOutcome::Rejected.is_saved());
    }
}
