use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::error::{MonitorError, Result};

/// Logging settings resolved from the command line.
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    pub verbose: bool,
    pub log_file: Option<PathBuf>,
}

impl LogSettings {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub fn default_directive(&self) -> &'static str {
        if self.verbose {
            "weather_monitor=debug,info"
        } else {
            "weather_monitor=info,warn"
        }
    }
}

/// Install the global subscriber: stdout always, plus an append-only file when requested.
pub fn init_logging(settings: &LogSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.default_directive()));

    let stdout_layer = fmt::layer().with_target(false).boxed();

    let file_layer = match &settings.log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file))
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| MonitorError::Config(format!("Failed to initialise logging: {}", e)))
}
