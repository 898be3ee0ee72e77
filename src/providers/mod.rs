//! Weather data providers.

pub mod open_meteo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::ObservationReading;

pub use open_meteo::OpenMeteoClient;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

/// Source of hourly observations for a location.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Hourly readings in `[start, end]`, time ascending. An empty vector is a valid answer.
    async fn fetch_hourly(
        &self,
        latitude: f64,
        longitude: f64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ObservationReading>, ProviderError>;

    fn name(&self) -> &str;
}
