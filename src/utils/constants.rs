/// Storage defaults
pub const DEFAULT_DATABASE_PATH: &str = "weather_data.db";
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
pub const OBSERVATION_TABLE: &str = "weather_data";
pub const SQL_EXPORT_TABLE: &str = "weather_data_export";
pub const BUSY_TIMEOUT_MS: u64 = 5000;

/// Ingestion defaults
pub const DEFAULT_LOOKBACK_HOURS: u32 = 6;
pub const MAX_LOOKBACK_HOURS: u32 = 24 * 92;

/// Open-Meteo provider
pub const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com/v1";
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

/// Web server defaults
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_DATA_POINTS: u32 = 1000;
pub const MAX_QUERY_HOURS: u32 = 168;
pub const DEFAULT_QUERY_HOURS: u32 = 24;

/// Plotting defaults
pub const DEFAULT_CHART_WIDTH: usize = 80;
pub const DEFAULT_CHART_HEIGHT: usize = 20;
pub const DEFAULT_FIGURE_SIZE: [f64; 2] = [10.0, 6.0];
pub const DEFAULT_DPI: u32 = 100;

/// Plain text export separator
pub const TEXT_SEPARATOR: &str = " | ";
