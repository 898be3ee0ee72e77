use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::Result;
use crate::storage::WeatherDatabase;
use crate::utils::LogSettings;

/// Everything a command needs, built once in `main` and passed down explicitly.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub config_path: PathBuf,
    pub logging: LogSettings,
    pub quiet: bool,
}

impl AppContext {
    pub fn new(config: AppConfig, config_path: PathBuf, logging: LogSettings) -> Self {
        Self {
            config,
            config_path,
            logging,
            quiet: false,
        }
    }

    pub fn load(config_path: &Path, logging: LogSettings) -> Result<Self> {
        let config = AppConfig::load(config_path)?;
        Ok(Self::new(config, config_path.to_path_buf(), logging))
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Open (creating and migrating if needed) the configured store.
    pub fn database(&self) -> Result<WeatherDatabase> {
        WeatherDatabase::initialize(&self.config.database.path)
    }
}
