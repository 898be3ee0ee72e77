pub mod csv_writer;
pub mod exporter;
pub mod json_writer;
pub mod sql_writer;
pub mod text_writer;
pub mod xml_writer;

pub use csv_writer::CsvWriter;
pub use exporter::{ExportOutcome, Exporter};
pub use json_writer::JsonWriter;
pub use sql_writer::SqlWriter;
pub use text_writer::TextWriter;
pub use xml_writer::XmlWriter;

use crate::error::{MonitorError, Result};
use crate::models::StoredObservation;

/// Serializes a batch of observations into a complete document.
pub trait RecordWriter {
    fn render(&self, records: &[StoredObservation]) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
    Json,
    Xml,
    Txt,
    Sql,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 6] = [
        ExportFormat::Csv,
        ExportFormat::Tsv,
        ExportFormat::Json,
        ExportFormat::Xml,
        ExportFormat::Txt,
        ExportFormat::Sql,
    ];

    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "tsv" => Ok(ExportFormat::Tsv),
            "json" => Ok(ExportFormat::Json),
            "xml" => Ok(ExportFormat::Xml),
            "txt" | "text" => Ok(ExportFormat::Txt),
            "sql" => Ok(ExportFormat::Sql),
            other => Err(MonitorError::InvalidInput(format!(
                "Unsupported export format: {}. Supported: csv, tsv, json, xml, txt, sql",
                other
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
            ExportFormat::Xml => "xml",
            ExportFormat::Txt => "txt",
            ExportFormat::Sql => "sql",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Tsv => "text/tab-separated-values",
            ExportFormat::Json => "application/json",
            ExportFormat::Xml => "application/xml",
            ExportFormat::Txt => "text/plain",
            ExportFormat::Sql => "application/sql",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self> {
        ExportFormat::parse(s)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::StoredObservation;
    use chrono::{TimeZone, Utc};

    pub fn sample_records() -> Vec<StoredObservation> {
        vec![
            StoredObservation {
                id: 2,
                region_code: "london".to_string(),
                region_name: "London".to_string(),
                latitude: 51.5074,
                longitude: -0.1278,
                timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 13, 0, 0).unwrap(),
                temperature: Some(6.25),
                dewpoint: Some(2.5),
                humidity: Some(81.0),
                precipitation: Some(0.0),
                pressure: Some(1012.5),
                wind_speed: Some(14.0),
                wind_direction: Some(230.0),
                cloud_cover: None,
                snow_depth: None,
                wind_gust: Some(30.5),
                sunshine: None,
                created_at: Utc.with_ymd_and_hms(2024, 1, 15, 13, 5, 0).unwrap(),
            },
            StoredObservation {
                id: 1,
                region_code: "kings_lynn".to_string(),
                region_name: "King's Lynn".to_string(),
                latitude: 52.7543,
                longitude: 0.3976,
                timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
                temperature: Some(5.5),
                dewpoint: None,
                humidity: None,
                precipitation: None,
                pressure: None,
                wind_speed: None,
                wind_direction: None,
                cloud_cover: Some(75.0),
                snow_depth: None,
                wind_gust: None,
                sunshine: Some(12.0),
                created_at: Utc.with_ymd_and_hms(2024, 1, 15, 12, 5, 0).unwrap(),
            },
        ]
    }
}
