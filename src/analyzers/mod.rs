pub mod dashboard;

pub use dashboard::{render_stats_table, DashboardReport, RegionPanel, WeatherDashboard};
