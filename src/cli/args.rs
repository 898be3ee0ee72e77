use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::constants::{DEFAULT_CONFIG_FILE, DEFAULT_QUERY_HOURS};
use crate::utils::LogSettings;

#[derive(Parser)]
#[command(name = "weather-monitor")]
#[command(about = "Hourly weather observation collector with SQLite storage and exports")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short,
        long,
        global = true,
        default_value = DEFAULT_CONFIG_FILE,
        help = "Path to configuration file"
    )]
    pub config: PathBuf,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Suppress progress output")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            verbose: self.verbose,
            log_file: self.log_file.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch recent observations for every configured region
    Fetch {
        #[arg(long, help = "Hours back to fetch [default: provider.lookback_hours]")]
        hours: Option<u32>,

        #[arg(short, long, help = "Comma separated region codes [default: all]")]
        regions: Option<String>,
    },

    /// Show the latest stored observation for a region
    Latest {
        #[arg(value_parser = parse_region_code, help = "Region code")]
        region: String,
    },

    /// Export stored observations to a file
    Export {
        #[arg(help = "Output file [default: output/weather_export_{YYYYMMDD_HHMMSS}.{ext}]")]
        output: Option<PathBuf>,

        #[arg(short, long, default_value = "csv", help = "csv, tsv, json, xml, txt or sql")]
        format: String,

        #[arg(short, long, value_parser = parse_region_code, help = "Filter by region code")]
        region: Option<String>,

        #[arg(short, long, help = "Start date (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)")]
        start_date: Option<String>,

        #[arg(short, long, help = "End date (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)")]
        end_date: Option<String>,

        #[arg(short, long, help = "Maximum number of records to export")]
        limit: Option<usize>,

        #[arg(long, help = "Pretty print JSON output")]
        pretty: bool,
    },

    /// Plot a metric in the terminal or to a chart file
    Plot {
        #[arg(short, long, default_value = "temperature")]
        metric: String,

        #[arg(short, long, help = "Comma separated region codes")]
        regions: Option<String>,

        #[arg(short, long, help = "Use a region preset from the configuration")]
        preset: Option<String>,

        #[arg(long, default_value_t = DEFAULT_QUERY_HOURS)]
        hours: u32,

        #[arg(short, long, help = "Chart file (.png or .svg); omit to draw in the terminal")]
        output: Option<PathBuf>,

        #[arg(long, help = "Also write the plotted series to a .csv, .json or .xlsx file")]
        export_data: Option<PathBuf>,

        #[arg(short, long, help = "Pick regions from a checklist")]
        interactive: bool,
    },

    /// Latest readings and temperature range per region
    Dashboard {
        #[arg(long, default_value_t = DEFAULT_QUERY_HOURS)]
        hours: u32,

        #[arg(short, long, help = "Comma separated region codes")]
        regions: Option<String>,

        #[arg(short, long, help = "Use a region preset from the configuration")]
        preset: Option<String>,
    },

    /// Serve the JSON API
    Serve {
        #[arg(long, help = "Bind address [default: web_server.default_host]")]
        host: Option<String>,

        #[arg(long, help = "Port [default: web_server.default_port]")]
        port: Option<u16>,
    },

    /// List configured regions and presets
    Regions,

    /// Min, max and average of a metric per region
    Stats {
        #[arg(short, long, default_value = "temperature")]
        metric: String,

        #[arg(long, default_value_t = DEFAULT_QUERY_HOURS)]
        hours: u32,

        #[arg(short, long, help = "Comma separated region codes")]
        regions: Option<String>,
    },
}

/// Region codes are stored lowercase.
fn parse_region_code(value: &str) -> Result<String, String> {
    let code = value.trim().to_lowercase();
    if code.is_empty() {
        return Err("region code cannot be empty".to_string());
    }
    Ok(code)
}

/// Split a comma separated list of region codes.
pub fn parse_region_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|raw| {
            raw.split(',')
                .map(|code| code.trim().to_lowercase())
                .filter(|code| !code.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
