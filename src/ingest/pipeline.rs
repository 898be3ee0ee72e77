use chrono::{DateTime, Duration, DurationRound, Utc};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::error::{MonitorError, Result};
use crate::models::Region;
use crate::providers::WeatherProvider;
use crate::storage::{SaveOutcome, WeatherDatabase};
use crate::utils::constants::MAX_LOOKBACK_HOURS;
use crate::utils::ProgressReporter;

/// Rows saved for one region during a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionYield {
    pub region_code: String,
    pub saved: usize,
}

/// A region whose fetch or store failed; it contributed zero rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionFailure {
    pub region_code: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total_saved: usize,
    pub yields: Vec<RegionYield>,
    pub failures: Vec<RegionFailure>,
}

impl BatchReport {
    pub fn regions_processed(&self) -> usize {
        self.yields.len() + self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Fetch → normalize → idempotent insert.
pub struct IngestPipeline {
    provider: Arc<dyn WeatherProvider>,
    database: WeatherDatabase,
}

impl IngestPipeline {
    pub fn new(provider: Arc<dyn WeatherProvider>, database: WeatherDatabase) -> Self {
        Self { provider, database }
    }

    pub fn database(&self) -> &WeatherDatabase {
        &self.database
    }

    /// The `[now - hours, now]` window, aligned to whole hours.
    pub fn window(now: DateTime<Utc>, lookback_hours: u32) -> (DateTime<Utc>, DateTime<Utc>) {
        let end = now.duration_trunc(Duration::hours(1)).unwrap_or(now);
        let start = end - Duration::hours(i64::from(lookback_hours));
        (start, end)
    }

    /// Fetch the recent window for one region and store every new row.
    ///
    /// Returns the number of rows actually inserted.
    #[instrument(skip(self, region), fields(region = %region.code))]
    pub async fn fetch_and_store(&self, region: &Region, lookback_hours: u32) -> Result<usize> {
        if lookback_hours == 0 || lookback_hours > MAX_LOOKBACK_HOURS {
            return Err(MonitorError::InvalidInput(format!(
                "lookback hours must be between 1 and {}, got {}",
                MAX_LOOKBACK_HOURS, lookback_hours
            )));
        }

        let (start, end) = Self::window(Utc::now(), lookback_hours);
        info!(
            "Fetching {} from {} to {} via {}",
            region.name,
            start,
            end,
            self.provider.name()
        );

        let readings = self
            .provider
            .fetch_hourly(region.latitude, region.longitude, start, end)
            .await?;

        if readings.is_empty() {
            warn!("No data received for {}", region.name);
            return Ok(0);
        }

        let database = self.database.clone();
        let region = region.clone();
        let saved = tokio::task::spawn_blocking(move || -> Result<usize> {
            let mut saved = 0;
            for reading in &readings {
                let outcome = database.save(
                    &region.code,
                    &region.name,
                    region.latitude,
                    region.longitude,
                    reading,
                )?;
                if outcome == SaveOutcome::Saved {
                    saved += 1;
                }
            }
            info!(
                "Saved {} new records for {} ({} received)",
                saved,
                region.name,
                readings.len()
            );
            Ok(saved)
        })
        .await??;

        Ok(saved)
    }

    /// Ingest every region in code order. Failures are logged and counted as zero.
    pub async fn run_batch(
        &self,
        regions: &[Region],
        lookback_hours: u32,
        progress: Option<&ProgressReporter>,
    ) -> BatchReport {
        let mut ordered: Vec<&Region> = regions.iter().collect();
        ordered.sort_by(|a, b| a.code.cmp(&b.code));

        let mut report = BatchReport::default();

        for region in ordered {
            if let Some(p) = progress {
                p.set_message(&format!("Fetching {}", region.name));
            }

            match self.fetch_and_store(region, lookback_hours).await {
                Ok(saved) => {
                    report.total_saved += saved;
                    report.yields.push(RegionYield {
                        region_code: region.code.clone(),
                        saved,
                    });
                }
                Err(e) => {
                    error!("Error processing {}: {}", region.name, e);
                    report.failures.push(RegionFailure {
                        region_code: region.code.clone(),
                        error: e.to_string(),
                    });
                }
            }

            if let Some(p) = progress {
                p.increment(1);
            }
        }

        info!(
            "Batch complete: {} new records from {} regions ({} failed)",
            report.total_saved,
            report.regions_processed(),
            report.failures.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Metric, ObservationReading};
    use crate::providers::ProviderError;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Replies per latitude; unknown latitudes fail.
    struct ScriptedProvider {
        replies: HashMap<i64, Vec<ObservationReading>>,
    }

    impl ScriptedProvider {
        fn new() -> Self {
            Self {
                replies: HashMap::new(),
            }
        }

        fn reply(mut self, latitude: f64, readings: Vec<ObservationReading>) -> Self {
            self.replies.insert(key(latitude), readings);
            self
        }
    }

    fn key(latitude: f64) -> i64 {
        (latitude * 1000.0).round() as i64
    }

    #[async_trait]
    impl WeatherProvider for ScriptedProvider {
        async fn fetch_hourly(
            &self,
            latitude: f64,
            _longitude: f64,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> std::result::Result<Vec<ObservationReading>, ProviderError> {
            self.replies
                .get(&key(latitude))
                .cloned()
                .ok_or_else(|| ProviderError::ServiceUnavailable("HTTP 503".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn readings(count: u32) -> Vec<ObservationReading> {
        (0..count)
            .map(|h| {
                ObservationReading::at(Utc.with_ymd_and_hms(2024, 1, 15, h, 0, 0).unwrap())
                    .with_metric(Metric::Temperature, Some(h as f64))
            })
            .collect()
    }

    fn pipeline(provider: ScriptedProvider) -> (TempDir, IngestPipeline) {
        let dir = TempDir::new().unwrap();
        let db = WeatherDatabase::initialize(dir.path().join("weather.db")).unwrap();
        (dir, IngestPipeline::new(Arc::new(provider), db))
    }

    #[test]
    fn test_window_is_hour_aligned() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 34, 56).unwrap();
        let (start, end) = IngestPipeline::window(now, 6);
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 15, 6, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_fetch_and_store_counts_new_rows_only() {
        let london = Region::new("london", "London", 51.5, -0.12);
        let (_dir, pipeline) = pipeline(ScriptedProvider::new().reply(51.5, readings(4)));

        assert_eq!(pipeline.fetch_and_store(&london, 6).await.unwrap(), 4);
        assert_eq!(pipeline.fetch_and_store(&london, 6).await.unwrap(), 0);
        assert_eq!(pipeline.database().health().unwrap().total_records, 4);
    }

    #[tokio::test]
    async fn test_empty_provider_result_yields_zero() {
        let london = Region::new("london", "London", 51.5, -0.12);
        let (_dir, pipeline) = pipeline(ScriptedProvider::new().reply(51.5, Vec::new()));

        assert_eq!(pipeline.fetch_and_store(&london, 6).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rejects_zero_lookback() {
        let london = Region::new("london", "London", 51.5, -0.12);
        let (_dir, pipeline) = pipeline(ScriptedProvider::new().reply(51.5, readings(1)));

        let err = pipeline.fetch_and_store(&london, 0).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_batch_isolates_failing_region() {
        let failing = Region::new("aberdeen", "Aberdeen", 57.15, -2.09);
        let healthy = Region::new("bristol", "Bristol", 51.45, -2.58);
        let (_dir, pipeline) = pipeline(ScriptedProvider::new().reply(51.45, readings(3)));

        let report = pipeline
            .run_batch(&[healthy.clone(), failing.clone()], 6, None)
            .await;

        assert_eq!(report.total_saved, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].region_code, "aberdeen");
        assert_eq!(
            report.yields,
            vec![RegionYield {
                region_code: "bristol".to_string(),
                saved: 3
            }]
        );
        assert_eq!(report.regions_processed(), 2);
    }

    #[tokio::test]
    async fn test_batch_isolates_store_failure() {
        let oslo = Region::new("oslo", "Oslo", 59.91, 10.75);
        let bristol = Region::new("bristol", "Bristol", 51.45, -2.58);
        let (dir, pipeline) = pipeline(
            ScriptedProvider::new()
                .reply(59.91, readings(2))
                .reply(51.45, readings(3)),
        );

        let conn = rusqlite::Connection::open(dir.path().join("weather.db")).unwrap();
        conn.execute_batch(
            "CREATE TRIGGER refuse_oslo BEFORE INSERT ON weather_data
             WHEN NEW.region_code = 'oslo'
             BEGIN SELECT RAISE(ABORT, 'write refused'); END;",
        )
        .unwrap();

        let report = pipeline.run_batch(&[oslo, bristol], 6, None).await;

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].region_code, "oslo");
        assert!(report.failures[0].error.contains("write refused"));
        assert_eq!(report.total_saved, 3);
        assert_eq!(pipeline.database().health().unwrap().total_records, 3);
    }

    #[tokio::test]
    async fn test_batch_with_silent_progress() {
        let london = Region::new("london", "London", 51.5, -0.12);
        let (_dir, pipeline) = pipeline(ScriptedProvider::new().reply(51.5, readings(2)));
        let progress = ProgressReporter::silent();

        let report = pipeline.run_batch(&[london], 6, Some(&progress)).await;
        assert_eq!(report.total_saved, 2);
        assert!(!report.has_failures());
    }
}
