//! Request handlers for the JSON API

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, warn};

use super::error::ApiError;
use super::state::AppState;
use crate::charts::{renderer_for_format, ChartData, ChartDataExporter, ChartDataFormat, ChartFormat};
use crate::models::{Metric, StoredObservation};
use crate::storage::{MetricStats, RegionSummary};
use crate::utils::constants::{DEFAULT_QUERY_HOURS, MAX_QUERY_HOURS};
use crate::utils::{attachment_filename, format_canonical, timestamp};

pub const ENDPOINTS: [&str; 6] = [
    "/api/health",
    "/api/regions",
    "/api/weather-data",
    "/api/stats",
    "/api/export/data",
    "/api/export/chart",
];

/// Query string shared by the data endpoints.
///
/// Numbers arrive as text so malformed values produce a JSON error body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiParams {
    pub regions: Option<String>,
    pub metric: Option<String>,
    pub hours: Option<String>,
    pub limit: Option<String>,
    pub format: Option<String>,
}

fn parse_integer(name: &str, value: Option<&str>, default: i64) -> Result<i64, ApiError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ApiError::BadRequest(format!("{} must be an integer", name))),
    }
}

impl ApiParams {
    /// Comma separated region codes; empty means every region.
    pub fn regions(&self) -> Vec<String> {
        self.regions
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(|code| code.trim().to_lowercase())
                    .filter(|code| !code.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn required_regions(&self) -> Result<Vec<String>, ApiError> {
        let regions = self.regions();
        if regions.is_empty() {
            return Err(ApiError::BadRequest(
                "Regions parameter is required".to_string(),
            ));
        }
        Ok(regions)
    }

    pub fn metric(&self) -> Result<Metric, ApiError> {
        Ok(Metric::parse(self.metric.as_deref().unwrap_or("temperature"))?)
    }

    pub fn hours(&self) -> Result<u32, ApiError> {
        let hours = parse_integer("Hours", self.hours.as_deref(), i64::from(DEFAULT_QUERY_HOURS))?;
        if !(1..=i64::from(MAX_QUERY_HOURS)).contains(&hours) {
            return Err(ApiError::BadRequest(format!(
                "Hours must be between 1 and {}",
                MAX_QUERY_HOURS
            )));
        }
        Ok(hours as u32)
    }

    pub fn limit(&self, max: u32) -> Result<usize, ApiError> {
        let limit = parse_integer("Limit", self.limit.as_deref(), i64::from(max))?;
        if !(1..=i64::from(max)).contains(&limit) {
            return Err(ApiError::BadRequest(format!(
                "Limit must be between 1 and {}",
                max
            )));
        }
        Ok(limit as usize)
    }
}

/// `"all"` when no regions were requested, the requested codes otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionScope {
    All,
    Selected(Vec<String>),
}

impl From<Vec<String>> for RegionScope {
    fn from(regions: Vec<String>) -> Self {
        if regions.is_empty() {
            RegionScope::All
        } else {
            RegionScope::Selected(regions)
        }
    }
}

impl Serialize for RegionScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RegionScope::All => serializer.serialize_str("all"),
            RegionScope::Selected(codes) => codes.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub database_connected: bool,
    pub regions_count: i64,
    pub total_records: i64,
    pub last_update: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPoint {
    pub region_code: String,
    pub region_name: String,
    #[serde(with = "timestamp::canonical")]
    pub timestamp: DateTime<Utc>,
    /// Value of the requested metric.
    pub value: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub precipitation: Option<f64>,
}

impl DataPoint {
    fn from_observation(observation: &StoredObservation, metric: Metric) -> Self {
        Self {
            region_code: observation.region_code.clone(),
            region_name: observation.region_name.clone(),
            timestamp: observation.timestamp,
            value: observation.value(metric),
            temperature: observation.temperature,
            humidity: observation.humidity,
            pressure: observation.pressure,
            wind_speed: observation.wind_speed,
            precipitation: observation.precipitation,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherDataResponse {
    pub metric: &'static str,
    pub hours: u32,
    pub regions: RegionScope,
    pub data_points: Vec<DataPoint>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub metric: &'static str,
    pub hours: u32,
    pub regions: RegionScope,
    pub statistics: Vec<MetricStats>,
}

/// Run store work off the async runtime.
async fn blocking<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(task).await??)
}

fn since(hours: u32) -> DateTime<Utc> {
    Utc::now() - Duration::hours(i64::from(hours))
}

fn attachment(content_type: &str, filename: String, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Weather Monitor API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ENDPOINTS.to_vec(),
    })
}

/// Store status; a store that cannot be read is reported, not raised.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = state.database.clone();
    let result = blocking(move || database.health()).await;
    let timestamp = format_canonical(&Utc::now());

    let response = match result {
        Ok(health) => HealthResponse {
            status: "healthy".to_string(),
            timestamp,
            database_connected: true,
            regions_count: health.regions_count,
            total_records: health.total_records,
            last_update: health.last_update,
        },
        Err(e) => {
            warn!("Health check could not read the store: {}", e);
            HealthResponse {
                status: "unhealthy".to_string(),
                timestamp,
                database_connected: false,
                regions_count: 0,
                total_records: 0,
                last_update: None,
            }
        }
    };

    Json(response)
}

pub async fn regions(State(state): State<AppState>) -> Result<Json<Vec<RegionSummary>>, ApiError> {
    let database = state.database.clone();
    let summaries = blocking(move || database.region_summaries()).await?;
    Ok(Json(summaries))
}

pub async fn weather_data(
    State(state): State<AppState>,
    Query(params): Query<ApiParams>,
) -> Result<Json<WeatherDataResponse>, ApiError> {
    let hours = params.hours()?;
    let limit = params.limit(state.max_data_points())?;
    let metric = params.metric()?;
    let regions = params.regions();

    let database = state.database.clone();
    let filter = regions.clone();
    let cutoff = since(hours);
    let rows = blocking(move || database.recent_observations(&filter, &cutoff, limit)).await?;

    let data_points: Vec<DataPoint> = rows
        .iter()
        .map(|row| DataPoint::from_observation(row, metric))
        .collect();
    debug!("weather-data returned {} points", data_points.len());

    Ok(Json(WeatherDataResponse {
        metric: metric.column(),
        hours,
        regions: RegionScope::from(regions),
        count: data_points.len(),
        data_points,
    }))
}

pub async fn stats(
    State(state): State<AppState>,
    Query(params): Query<ApiParams>,
) -> Result<Json<StatsResponse>, ApiError> {
    let hours = params.hours()?;
    let metric = params.metric()?;
    let regions = params.regions();

    let database = state.database.clone();
    let filter = regions.clone();
    let cutoff = since(hours);
    let statistics = blocking(move || database.metric_stats(metric, &filter, &cutoff)).await?;

    Ok(Json(StatsResponse {
        metric: metric.column(),
        hours,
        regions: RegionScope::from(regions),
        statistics,
    }))
}

async fn load_chart(state: &AppState, params: &ApiParams) -> Result<ChartData, ApiError> {
    let regions = params.required_regions()?;
    let hours = params.hours()?;
    let metric = params.metric()?;

    let database = state.database.clone();
    let cutoff = since(hours);
    let series = blocking(move || database.metric_series(metric, &regions, &cutoff)).await?;

    let chart = ChartData::new(metric, hours, series);
    if chart.is_empty() {
        return Err(ApiError::NotFound(chart.empty_message()));
    }
    Ok(chart)
}

/// Metric series as a CSV, JSON or Excel attachment.
pub async fn export_data(
    State(state): State<AppState>,
    Query(params): Query<ApiParams>,
) -> Result<Response, ApiError> {
    let format = ChartDataFormat::parse(params.format.as_deref().unwrap_or("csv"))?;
    let chart = load_chart(&state, &params).await?;

    let body = ChartDataExporter::new(format)
        .render(&chart)?
        .ok_or_else(|| ApiError::NotFound(chart.empty_message()))?;
    let filename = attachment_filename(
        &format!("weather_data_{}", chart.metric.column()),
        format.extension(),
        &Utc::now(),
    );

    Ok(attachment(format.content_type(), filename, body))
}

/// Chart image or document as an attachment; formats without a backend answer 500.
pub async fn export_chart(
    State(state): State<AppState>,
    Query(params): Query<ApiParams>,
) -> Result<Response, ApiError> {
    let format = ChartFormat::parse(params.format.as_deref().unwrap_or("png"))?;
    let chart = load_chart(&state, &params).await?;

    let filename = attachment_filename(
        &format!("weather_chart_{}", chart.metric.column()),
        format.extension(),
        &Utc::now(),
    );
    let plotting = state.config.plotting.clone();
    let body = blocking(move || renderer_for_format(format, &plotting).render(&chart)).await?;

    Ok(attachment(format.content_type(), filename, body))
}
