//! Open-Meteo hourly client.
//!
//! Requests a UTC window with `start_hour`/`end_hour` and maps the parallel
//! hourly arrays into one [`ObservationReading`] per timestamp.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{ProviderError, WeatherProvider};
use crate::config::ProviderConfig;
use crate::models::ObservationReading;
use crate::utils::timestamp::parse_timestamp;

const HOURLY_FIELDS: &str = "temperature_2m,dew_point_2m,relative_humidity_2m,precipitation,\
     pressure_msl,wind_speed_10m,wind_direction_10m,cloud_cover,snow_depth,wind_gusts_10m,\
     sunshine_duration";

const WINDOW_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Deserialize)]
struct HourlyResponse {
    hourly: Option<HourlyData>,
}

#[derive(Debug, Default, Deserialize)]
struct HourlyData {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    dew_point_2m: Vec<Option<f64>>,
    #[serde(default)]
    relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
    #[serde(default)]
    pressure_msl: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    wind_direction_10m: Vec<Option<f64>>,
    #[serde(default)]
    cloud_cover: Vec<Option<f64>>,
    /// Metres.
    #[serde(default)]
    snow_depth: Vec<Option<f64>>,
    #[serde(default)]
    wind_gusts_10m: Vec<Option<f64>>,
    /// Seconds.
    #[serde(default)]
    sunshine_duration: Vec<Option<f64>>,
}

fn at(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten()
}

impl HourlyData {
    fn into_readings(self) -> Result<Vec<ObservationReading>, ProviderError> {
        let mut readings = Vec::with_capacity(self.time.len());

        for (i, raw) in self.time.iter().enumerate() {
            let timestamp = parse_timestamp(raw)
                .map_err(|_| ProviderError::ParseError(format!("Invalid datetime format: {raw}")))?;

            readings.push(ObservationReading {
                timestamp: Some(timestamp),
                temperature: at(&self.temperature_2m, i),
                dewpoint: at(&self.dew_point_2m, i),
                humidity: at(&self.relative_humidity_2m, i),
                precipitation: at(&self.precipitation, i),
                pressure: at(&self.pressure_msl, i),
                wind_speed: at(&self.wind_speed_10m, i),
                wind_direction: at(&self.wind_direction_10m, i),
                cloud_cover: at(&self.cloud_cover, i),
                snow_depth: at(&self.snow_depth, i).map(|m| m * 1000.0),
                wind_gust: at(&self.wind_gusts_10m, i),
                sunshine: at(&self.sunshine_duration, i).map(|s| s / 60.0),
            });
        }

        readings.sort_by_key(|r| r.timestamp);
        Ok(readings)
    }
}

/// Open-Meteo HTTP client.
#[derive(Debug)]
pub struct OpenMeteoClient {
    client: Client,
    config: ProviderConfig,
}

impl OpenMeteoClient {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn with_defaults() -> Result<Self, ProviderError> {
        Self::new(ProviderConfig::default())
    }

    fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), ProviderError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ProviderError::InvalidCoordinates);
        }
        Ok(())
    }

    fn build_hourly_url(
        &self,
        latitude: f64,
        longitude: f64,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> String {
        format!(
            "{}/forecast?latitude={}&longitude={}&hourly={}&timezone=GMT&start_hour={}&end_hour={}",
            self.config.base_url.trim_end_matches('/'),
            latitude,
            longitude,
            HOURLY_FIELDS,
            start.format(WINDOW_FORMAT),
            end.format(WINDOW_FORMAT)
        )
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    #[instrument(skip(self), fields(lat = %latitude, lon = %longitude))]
    async fn fetch_hourly(
        &self,
        latitude: f64,
        longitude: f64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ObservationReading>, ProviderError> {
        Self::validate_coordinates(latitude, longitude)?;

        let url = self.build_hourly_url(latitude, longitude, &start, &end);
        debug!(url = %url, "Fetching hourly observations");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimitExceeded);
        }
        if status.is_server_error() {
            return Err(ProviderError::ServiceUnavailable(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(ProviderError::RequestFailed(format!("HTTP {status}")));
        }

        let body: HourlyResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let readings = body.hourly.unwrap_or_default().into_readings()?;
        debug!(rows = readings.len(), "Parsed hourly observations");
        Ok(readings)
    }

    fn name(&self) -> &str {
        "open-meteo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_validate_coordinates() {
        assert!(OpenMeteoClient::validate_coordinates(51.5, -0.12).is_ok());
        assert!(OpenMeteoClient::validate_coordinates(90.0, 180.0).is_ok());
        assert!(OpenMeteoClient::validate_coordinates(91.0, 0.0).is_err());
        assert!(OpenMeteoClient::validate_coordinates(0.0, -181.0).is_err());
    }

    #[test]
    fn test_build_hourly_url() {
        let client = OpenMeteoClient::with_defaults().unwrap();
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 6, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();

        let url = client.build_hourly_url(51.5, -0.12, &start, &end);
        assert!(url.starts_with("https://api.open-meteo.com/v1/forecast?"));
        assert!(url.contains("latitude=51.5"));
        assert!(url.contains("longitude=-0.12"));
        assert!(url.contains("start_hour=2024-01-15T06:00"));
        assert!(url.contains("end_hour=2024-01-15T12:00"));
        assert!(url.contains("timezone=GMT"));
        assert!(url.contains("sunshine_duration"));
    }

    #[test]
    fn test_into_readings_converts_units_and_nulls() {
        let data: HourlyData = serde_json::from_value(serde_json::json!({
            "time": ["2024-01-15T01:00", "2024-01-15T00:00"],
            "temperature_2m": [4.0, null],
            "snow_depth": [0.5, 0.0],
            "sunshine_duration": [1800.0, null]
        }))
        .unwrap();

        let readings = data.into_readings().unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(
            readings[0].timestamp,
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())
        );
        assert_eq!(readings[0].temperature, None);
        assert_eq!(readings[1].temperature, Some(4.0));
        assert_eq!(readings[1].snow_depth, Some(500.0));
        assert_eq!(readings[1].sunshine, Some(30.0));
        assert_eq!(readings[1].humidity, None);
    }

    #[test]
    fn test_into_readings_rejects_bad_time() {
        let data = HourlyData {
            time: vec!["yesterday".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            data.into_readings(),
            Err(ProviderError::ParseError(_))
        ));
    }
}
