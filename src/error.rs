use thiserror::Error;

use crate::providers::ProviderError;

pub type Result<T> = std::result::Result<T, MonitorError>;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] ::config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid date filter: {0}")]
    InvalidFilter(String),

    #[error("Unknown metric: {name}. Available: {available}")]
    UnknownMetric { name: String, available: String },

    #[error("Region {code} not found")]
    RegionNotFound { code: String },

    #[error("Weather provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Chart backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Chart rendering error: {0}")]
    Render(String),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl MonitorError {
    /// True for errors caused by caller input rather than by the system.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MonitorError::Validation(_)
                | MonitorError::InvalidInput(_)
                | MonitorError::InvalidFilter(_)
                | MonitorError::UnknownMetric { .. }
                | MonitorError::RegionNotFound { .. }
        )
    }
}
