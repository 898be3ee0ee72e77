//! Application state shared across handlers

use std::sync::Arc;

use crate::config::AppConfig;
use crate::storage::WeatherDatabase;

/// Shared application state
///
/// Holds only the store location; every request opens its own connection.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub database: WeatherDatabase,
}

impl AppState {
    pub fn new(config: AppConfig, database: WeatherDatabase) -> Self {
        Self {
            config: Arc::new(config),
            database,
        }
    }

    pub fn max_data_points(&self) -> u32 {
        self.config.web_server.max_data_points
    }
}
