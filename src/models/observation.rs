use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Metric;
use crate::utils::timestamp::{self, format_canonical};

/// Field names of a stored observation, in export order.
///
/// Used verbatim as CSV headers, JSON keys, XML element names and SQL columns.
pub const FIELD_NAMES: [&str; 18] = [
    "id",
    "region_code",
    "region_name",
    "latitude",
    "longitude",
    "timestamp",
    "temperature",
    "dewpoint",
    "humidity",
    "precipitation",
    "pressure",
    "wind_speed",
    "wind_direction",
    "cloud_cover",
    "snow_depth",
    "wind_gust",
    "sunshine",
    "created_at",
];

/// Fields holding floating point values.
pub const NUMERIC_FIELDS: [&str; 13] = [
    "latitude",
    "longitude",
    "temperature",
    "dewpoint",
    "humidity",
    "precipitation",
    "pressure",
    "wind_speed",
    "wind_direction",
    "cloud_cover",
    "snow_depth",
    "wind_gust",
    "sunshine",
];

/// One hourly reading as delivered by a provider, before persistence.
///
/// Every metric is independently optional; absent means "not reported", never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationReading {
    pub timestamp: Option<DateTime<Utc>>,
    pub temperature: Option<f64>,
    pub dewpoint: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub snow_depth: Option<f64>,
    pub wind_gust: Option<f64>,
    pub sunshine: Option<f64>,
}

impl ObservationReading {
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..Self::default()
        }
    }

    pub fn with_metric(mut self, metric: Metric, value: Option<f64>) -> Self {
        *self.slot_mut(metric) = value;
        self
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Dewpoint => self.dewpoint,
            Metric::Humidity => self.humidity,
            Metric::Precipitation => self.precipitation,
            Metric::Pressure => self.pressure,
            Metric::WindSpeed => self.wind_speed,
            Metric::WindDirection => self.wind_direction,
            Metric::CloudCover => self.cloud_cover,
            Metric::SnowDepth => self.snow_depth,
            Metric::WindGust => self.wind_gust,
            Metric::Sunshine => self.sunshine,
        }
    }

    fn slot_mut(&mut self, metric: Metric) -> &mut Option<f64> {
        match metric {
            Metric::Temperature => &mut self.temperature,
            Metric::Dewpoint => &mut self.dewpoint,
            Metric::Humidity => &mut self.humidity,
            Metric::Precipitation => &mut self.precipitation,
            Metric::Pressure => &mut self.pressure,
            Metric::WindSpeed => &mut self.wind_speed,
            Metric::WindDirection => &mut self.wind_direction,
            Metric::CloudCover => &mut self.cloud_cover,
            Metric::SnowDepth => &mut self.snow_depth,
            Metric::WindGust => &mut self.wind_gust,
            Metric::Sunshine => &mut self.sunshine,
        }
    }

    /// Copy with the timestamp made canonical and every non-finite value dropped.
    pub fn sanitized(&self) -> Self {
        let mut clean = self.clone();
        clean.timestamp = self.timestamp.map(timestamp::canonicalize);
        for metric in Metric::ALL {
            let slot = clean.slot_mut(metric);
            *slot = sanitize_value(*slot);
        }
        clean
    }

    pub fn metric_count(&self) -> usize {
        Metric::ALL
            .iter()
            .filter(|m| self.value(**m).is_some())
            .count()
    }
}

/// NaN and infinities are stored as absent.
pub fn sanitize_value(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// A persisted observation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObservation {
    pub id: i64,
    pub region_code: String,
    pub region_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(with = "timestamp::canonical")]
    pub timestamp: DateTime<Utc>,
    pub temperature: Option<f64>,
    pub dewpoint: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub snow_depth: Option<f64>,
    pub wind_gust: Option<f64>,
    pub sunshine: Option<f64>,
    #[serde(with = "timestamp::canonical")]
    pub created_at: DateTime<Utc>,
}

/// A single cell value, typed for the text-based writers.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Null,
}

impl FieldValue {
    fn real(value: Option<f64>) -> Self {
        value.map_or(FieldValue::Null, FieldValue::Real)
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Real(v) => write!(f, "{}", v),
            FieldValue::Text(v) => write!(f, "{}", v),
            FieldValue::Null => Ok(()),
        }
    }
}

impl StoredObservation {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        self.reading().value(metric)
    }

    /// The provider-facing view of this row.
    pub fn reading(&self) -> ObservationReading {
        ObservationReading {
            timestamp: Some(self.timestamp),
            temperature: self.temperature,
            dewpoint: self.dewpoint,
            humidity: self.humidity,
            precipitation: self.precipitation,
            pressure: self.pressure,
            wind_speed: self.wind_speed,
            wind_direction: self.wind_direction,
            cloud_cover: self.cloud_cover,
            snow_depth: self.snow_depth,
            wind_gust: self.wind_gust,
            sunshine: self.sunshine,
        }
    }

    /// Values in `FIELD_NAMES` order.
    pub fn field_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Integer(self.id),
            FieldValue::Text(self.region_code.clone()),
            FieldValue::Text(self.region_name.clone()),
            FieldValue::Real(self.latitude),
            FieldValue::Real(self.longitude),
            FieldValue::Text(format_canonical(&self.timestamp)),
            FieldValue::real(self.temperature),
            FieldValue::real(self.dewpoint),
            FieldValue::real(self.humidity),
            FieldValue::real(self.precipitation),
            FieldValue::real(self.pressure),
            FieldValue::real(self.wind_speed),
            FieldValue::real(self.wind_direction),
            FieldValue::real(self.cloud_cover),
            FieldValue::real(self.snow_depth),
            FieldValue::real(self.wind_gust),
            FieldValue::real(self.sunshine),
            FieldValue::Text(format_canonical(&self.created_at)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_row() -> StoredObservation {
        StoredObservation {
            id: 7,
            region_code: "london".to_string(),
            region_name: "London".to_string(),
            latitude: 51.5074,
            longitude: -0.1278,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
            temperature: Some(5.5),
            dewpoint: None,
            humidity: Some(75.0),
            precipitation: Some(0.0),
            pressure: Some(1013.2),
            wind_speed: Some(12.5),
            wind_direction: Some(225.0),
            cloud_cover: None,
            snow_depth: None,
            wind_gust: None,
            sunshine: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 12, 5, 0).unwrap(),
        }
    }

    #[test]
    fn test_sanitized_drops_nan_and_infinity() {
        let reading = ObservationReading::at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
            .with_metric(Metric::Temperature, Some(f64::NAN))
            .with_metric(Metric::Humidity, Some(80.0))
            .with_metric(Metric::Pressure, Some(f64::INFINITY))
            .with_metric(Metric::Precipitation, Some(0.0));

        let clean = reading.sanitized();
        assert_eq!(clean.temperature, None);
        assert_eq!(clean.humidity, Some(80.0));
        assert_eq!(clean.pressure, None);
        assert_eq!(clean.precipitation, Some(0.0));
        assert_eq!(clean.metric_count(), 2);
    }

    #[test]
    fn test_field_values_follow_field_names() {
        let values = sample_row().field_values();
        assert_eq!(values.len(), FIELD_NAMES.len());
        assert_eq!(values[0], FieldValue::Integer(7));
        assert_eq!(values[5], FieldValue::Text("2024-01-15T12:00:00Z".to_string()));
        assert_eq!(values[7], FieldValue::Null);
        assert_eq!(values[0].to_string(), "7");
        assert_eq!(values[7].to_string(), "");
    }

    #[test]
    fn test_numeric_fields_are_field_names() {
        for name in NUMERIC_FIELDS {
            assert!(FIELD_NAMES.contains(&name), "{} missing", name);
        }
        for metric in Metric::ALL {
            assert!(NUMERIC_FIELDS.contains(&metric.column()));
        }
    }

    #[test]
    fn test_stored_json_uses_field_names() {
        let json = serde_json::to_value(sample_row()).unwrap();
        let object = json.as_object().unwrap();
        let keys: Vec<&str> = object.keys().map(|k| k.as_str()).collect();
        for name in FIELD_NAMES {
            assert!(keys.contains(&name), "{} missing", name);
        }
        assert_eq!(json["timestamp"], "2024-01-15T12:00:00Z");
        assert!(json["dewpoint"].is_null());
    }
}
