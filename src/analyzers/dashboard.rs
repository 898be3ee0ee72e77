use chrono::{DateTime, Duration, Utc};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, CellAlignment, Table};

use crate::error::Result;
use crate::models::{Metric, Region, StoredObservation};
use crate::storage::{MetricStats, WeatherDatabase};

/// One dashboard line: the latest reading plus the window's temperature range.
#[derive(Debug, Clone)]
pub struct RegionPanel {
    pub region: Region,
    pub latest: Option<StoredObservation>,
    pub temperature: Option<MetricStats>,
}

#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub hours: u32,
    pub generated_at: DateTime<Utc>,
    pub panels: Vec<RegionPanel>,
}

fn cell(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.1}{}", v, unit),
        None => "-".to_string(),
    }
}

impl DashboardReport {
    pub fn header(&self) -> String {
        format!(
            "Weather dashboard: last {} hours (generated {})",
            self.hours,
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        )
    }

    pub fn render(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                "Region",
                "Updated",
                "Temp",
                "Humidity",
                "Pressure",
                "Wind",
                "Min",
                "Max",
                "Avg",
            ]);

        for panel in &self.panels {
            let latest = panel.latest.as_ref();
            let stats = panel.temperature.as_ref();

            let wind = match latest.and_then(|o| o.wind_speed) {
                Some(speed) => match latest.and_then(|o| o.wind_direction) {
                    Some(dir) => format!("{:.1} km/h @ {:.0}°", speed, dir),
                    None => format!("{:.1} km/h", speed),
                },
                None => "-".to_string(),
            };

            table.add_row(vec![
                Cell::new(&panel.region.name),
                Cell::new(
                    latest
                        .map(|o| o.timestamp.format("%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "no data".to_string()),
                ),
                Cell::new(cell(latest.and_then(|o| o.temperature), "°C"))
                    .set_alignment(CellAlignment::Right),
                Cell::new(cell(latest.and_then(|o| o.humidity), "%"))
                    .set_alignment(CellAlignment::Right),
                Cell::new(cell(latest.and_then(|o| o.pressure), " hPa"))
                    .set_alignment(CellAlignment::Right),
                Cell::new(wind),
                Cell::new(cell(stats.and_then(|s| s.min), "°C")).set_alignment(CellAlignment::Right),
                Cell::new(cell(stats.and_then(|s| s.max), "°C")).set_alignment(CellAlignment::Right),
                Cell::new(cell(stats.and_then(|s| s.avg), "°C")).set_alignment(CellAlignment::Right),
            ]);
        }

        format!("{}\n{}", self.header(), table)
    }
}

/// Builds dashboards from the store.
pub struct WeatherDashboard {
    database: WeatherDatabase,
}

impl WeatherDashboard {
    pub fn new(database: WeatherDatabase) -> Self {
        Self { database }
    }

    pub fn build(&self, regions: &[Region], hours: u32) -> Result<DashboardReport> {
        let now = Utc::now();
        let since = now - Duration::hours(i64::from(hours));
        let mut panels = Vec::with_capacity(regions.len());

        for region in regions {
            let latest = self.database.latest_for(&region.code)?;
            let temperature = self
                .database
                .metric_stats(Metric::Temperature, std::slice::from_ref(&region.code), &since)?
                .into_iter()
                .next();

            panels.push(RegionPanel {
                region: region.clone(),
                latest,
                temperature,
            });
        }

        Ok(DashboardReport {
            hours,
            generated_at: now,
            panels,
        })
    }
}

/// Table of per-region min/max/avg for one metric.
pub fn render_stats_table(metric: Metric, hours: u32, stats: &[MetricStats]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Region", "Min", "Max", "Avg", "Count"]);

    for row in stats {
        table.add_row(vec![
            row.region_code.clone(),
            cell(row.min, ""),
            cell(row.max, ""),
            cell(row.avg, ""),
            row.count.to_string(),
        ]);
    }

    format!(
        "{} ({}) over the last {} hours\n{}",
        metric.display_name(),
        metric.units(),
        hours,
        table
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ObservationReading;
    use chrono::DurationRound;
    use tempfile::TempDir;

    #[test]
    fn test_dashboard_shows_latest_and_range() {
        let dir = TempDir::new().unwrap();
        let db = WeatherDatabase::initialize(dir.path().join("weather.db")).unwrap();
        let base = Utc::now().duration_trunc(Duration::hours(1)).unwrap();

        for (offset, temp) in [(3, 4.0), (2, 8.0), (1, 6.0)] {
            let reading = ObservationReading::at(base - Duration::hours(offset))
                .with_metric(Metric::Temperature, Some(temp))
                .with_metric(Metric::Humidity, Some(70.0))
                .with_metric(Metric::WindSpeed, Some(12.0))
                .with_metric(Metric::WindDirection, Some(180.0));
            db.save("london", "London", 51.5, -0.12, &reading).unwrap();
        }

        let regions = vec![
            Region::new("london", "London", 51.5, -0.12),
            Region::new("oslo", "Oslo", 59.9, 10.7),
        ];
        let report = WeatherDashboard::new(db).build(&regions, 24).unwrap();

        assert_eq!(report.panels.len(), 2);
        assert_eq!(report.panels[0].latest.as_ref().unwrap().temperature, Some(6.0));
        assert_eq!(report.panels[0].temperature.as_ref().unwrap().max, Some(8.0));
        assert!(report.panels[1].latest.is_none());

        let text = report.render();
        assert!(text.starts_with("Weather dashboard: last 24 hours"));
        assert!(text.contains("London"));
        assert!(text.contains("6.0°C"));
        assert!(text.contains("12.0 km/h @ 180°"));
        assert!(text.contains("no data"));
    }

    #[test]
    fn test_stats_table() {
        let stats = vec![MetricStats {
            region_code: "london".to_string(),
            min: Some(1.5),
            max: Some(9.25),
            avg: Some(5.0),
            count: 12,
        }];
        let text = render_stats_table(Metric::Humidity, 6, &stats);
        assert!(text.starts_with("Humidity (%) over the last 6 hours"));
        assert!(text.contains("london"));
        assert!(text.contains("9.2") || text.contains("9.3"));
        assert!(text.contains("12"));
    }
}
