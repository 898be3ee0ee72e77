//! Typed configuration loaded from a YAML file with environment overrides.
//!
//! ```yaml
//! database:
//!   path: weather_data.db
//! regions:
//!   london: { name: London, latitude: 51.5074, longitude: -0.1278 }
//! region_presets:
//!   uk: [london]
//! ```
//!
//! Any key can be overridden with `WEATHER_MONITOR__<SECTION>__<KEY>`, e.g.
//! `WEATHER_MONITOR__DATABASE__PATH=/var/lib/weather.db`.

use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::{MonitorError, Result};
use crate::models::{Region, RegionConfig};
use crate::utils::constants::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub regions: BTreeMap<String, RegionConfig>,

    #[serde(default)]
    pub region_presets: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub plotting: PlottingConfig,

    #[serde(default)]
    pub web_server: WebServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    #[validate(length(min = 1))]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    #[validate(range(min = 1, max = 600))]
    pub timeout_secs: u64,

    #[serde(default = "default_lookback_hours")]
    #[validate(range(min = 1, max = 2208))]
    pub lookback_hours: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            lookback_hours: default_lookback_hours(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlottingConfig {
    #[serde(default = "default_colors")]
    #[validate(length(min = 1))]
    pub default_colors: Vec<String>,

    #[serde(default = "default_ascii_symbols")]
    #[validate(length(min = 1))]
    pub ascii_symbols: Vec<String>,

    #[serde(default = "default_figure_size")]
    pub figure_size: [f64; 2],

    #[serde(default = "default_dpi")]
    #[validate(range(min = 10, max = 1200))]
    pub dpi: u32,

    #[serde(default = "default_chart_width")]
    #[validate(range(min = 20, max = 400))]
    pub chart_width: usize,

    #[serde(default = "default_chart_height")]
    #[validate(range(min = 5, max = 200))]
    pub chart_height: usize,
}

impl Default for PlottingConfig {
    fn default() -> Self {
        Self {
            default_colors: default_colors(),
            ascii_symbols: default_ascii_symbols(),
            figure_size: default_figure_size(),
            dpi: default_dpi(),
            chart_width: default_chart_width(),
            chart_height: default_chart_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WebServerConfig {
    #[serde(default = "default_host")]
    pub default_host: String,

    #[serde(default = "default_port")]
    pub default_port: u16,

    #[serde(default = "default_max_data_points")]
    #[validate(range(min = 1))]
    pub max_data_points: u32,

    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            default_host: default_host(),
            default_port: default_port(),
            max_data_points: default_max_data_points(),
            enable_cors: default_enable_cors(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_PATH)
}

fn default_base_url() -> String {
    OPEN_METEO_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_PROVIDER_TIMEOUT_SECS
}

fn default_lookback_hours() -> u32 {
    DEFAULT_LOOKBACK_HOURS
}

fn default_colors() -> Vec<String> {
    ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn default_ascii_symbols() -> Vec<String> {
    ["•", "×", "+", "o", "*"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_figure_size() -> [f64; 2] {
    DEFAULT_FIGURE_SIZE
}

fn default_dpi() -> u32 {
    DEFAULT_DPI
}

fn default_chart_width() -> usize {
    DEFAULT_CHART_WIDTH
}

fn default_chart_height() -> usize {
    DEFAULT_CHART_HEIGHT
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_data_points() -> u32 {
    DEFAULT_MAX_DATA_POINTS
}

fn default_enable_cors() -> bool {
    true
}

impl AppConfig {
    /// Load from a YAML file, then apply `WEATHER_MONITOR__*` environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MonitorError::Config(format!(
                "Configuration file {} not found",
                path.display()
            )));
        }

        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml).required(true))
            .add_source(Environment::with_prefix("WEATHER_MONITOR").separator("__"))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML text without consulting the environment.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section; region entries are checked individually.
    pub fn validate(&self) -> Result<()> {
        for region in self.regions.values() {
            region.validate()?;
        }
        self.provider.validate()?;
        self.plotting.validate()?;
        self.web_server.validate()?;

        for (preset, codes) in &self.region_presets {
            if codes.is_empty() {
                return Err(MonitorError::Config(format!(
                    "Preset '{}' lists no regions",
                    preset
                )));
            }
        }

        let [width, height] = self.plotting.figure_size;
        if width <= 0.0 || height <= 0.0 {
            return Err(MonitorError::Config(format!(
                "figure_size must be positive, got [{}, {}]",
                width, height
            )));
        }

        Ok(())
    }

    /// Configured regions in code order.
    pub fn regions(&self) -> Vec<Region> {
        self.regions
            .iter()
            .map(|(code, config)| Region::from_config(code, config))
            .collect()
    }

    pub fn region(&self, code: &str) -> Result<Region> {
        self.regions
            .get(code)
            .map(|config| Region::from_config(code, config))
            .ok_or_else(|| MonitorError::RegionNotFound {
                code: code.to_string(),
            })
    }
}
