use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::MonitorError;

/// A plottable, aggregatable numeric field of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Temperature,
    Dewpoint,
    Humidity,
    Precipitation,
    Pressure,
    WindSpeed,
    WindDirection,
    CloudCover,
    SnowDepth,
    WindGust,
    Sunshine,
}

impl Metric {
    pub const ALL: [Metric; 11] = [
        Metric::Temperature,
        Metric::Dewpoint,
        Metric::Humidity,
        Metric::Precipitation,
        Metric::Pressure,
        Metric::WindSpeed,
        Metric::WindDirection,
        Metric::CloudCover,
        Metric::SnowDepth,
        Metric::WindGust,
        Metric::Sunshine,
    ];

    /// Column name in the observation table; also the JSON/CSV field name.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Dewpoint => "dewpoint",
            Metric::Humidity => "humidity",
            Metric::Precipitation => "precipitation",
            Metric::Pressure => "pressure",
            Metric::WindSpeed => "wind_speed",
            Metric::WindDirection => "wind_direction",
            Metric::CloudCover => "cloud_cover",
            Metric::SnowDepth => "snow_depth",
            Metric::WindGust => "wind_gust",
            Metric::Sunshine => "sunshine",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature",
            Metric::Dewpoint => "Dew Point",
            Metric::Humidity => "Humidity",
            Metric::Precipitation => "Precipitation",
            Metric::Pressure => "Pressure",
            Metric::WindSpeed => "Wind Speed",
            Metric::WindDirection => "Wind Direction",
            Metric::CloudCover => "Cloud Cover",
            Metric::SnowDepth => "Snow Depth",
            Metric::WindGust => "Wind Gust",
            Metric::Sunshine => "Sunshine",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            Metric::Temperature | Metric::Dewpoint => "°C",
            Metric::Humidity | Metric::CloudCover => "%",
            Metric::Precipitation | Metric::SnowDepth => "mm",
            Metric::Pressure => "hPa",
            Metric::WindSpeed | Metric::WindGust => "km/h",
            Metric::WindDirection => "°",
            Metric::Sunshine => "min",
        }
    }

    /// Comma separated list of accepted names, for error messages.
    pub fn available_names() -> String {
        Metric::ALL
            .iter()
            .map(|m| m.column())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn parse(name: &str) -> Result<Self, MonitorError> {
        let normalized = name.trim().to_lowercase().replace('-', "_");
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.column() == normalized)
            .ok_or_else(|| MonitorError::UnknownMetric {
                name: name.to_string(),
                available: Metric::available_names(),
            })
    }
}

impl FromStr for Metric {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::parse(s)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_parse_accepts_column_names_and_aliases() {
        assert_eq!(Metric::parse("temperature").unwrap(), Metric::Temperature);
        assert_eq!(Metric::parse("wind-speed").unwrap(), Metric::WindSpeed);
        assert_eq!(Metric::parse("wind_speed").unwrap(), Metric::WindSpeed);
        assert_eq!(Metric::parse(" Humidity ").unwrap(), Metric::Humidity);
    }

    #[test]
    fn test_metric_parse_rejects_unknown() {
        let err = Metric::parse("visibility").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("visibility"));
        assert!(err.to_string().contains("wind_speed"));
    }

    #[test]
    fn test_metric_display_and_units() {
        assert_eq!(Metric::WindSpeed.to_string(), "Wind Speed");
        assert_eq!(Metric::Pressure.units(), "hPa");
        assert_eq!(Metric::Sunshine.units(), "min");
    }
}
