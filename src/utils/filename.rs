use chrono::{DateTime, Local, TimeZone};
use std::path::PathBuf;

/// Generate default export filename with format: weather_export_{YYYYMMDD_HHMMSS}.{ext}
pub fn generate_default_export_filename(extension: &str) -> PathBuf {
    export_filename_at("weather_export", extension, &Local::now())
}

/// Generate default chart filename with format: weather_chart_{metric}_{YYYYMMDD_HHMMSS}.{ext}
pub fn generate_default_chart_filename(metric: &str, extension: &str) -> PathBuf {
    export_filename_at(&format!("weather_chart_{}", metric), extension, &Local::now())
}

/// Attachment name used by the HTTP export endpoints.
pub fn attachment_filename<Tz: TimeZone>(prefix: &str, extension: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}.{}", prefix, at.format("%Y%m%d_%H%M%S"), extension)
}

fn export_filename_at<Tz: TimeZone>(prefix: &str, extension: &str, at: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    PathBuf::from("output").join(attachment_filename(prefix, extension, at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_generate_default_export_filename() {
        let filename = generate_default_export_filename("csv");
        let filename_str = filename.to_string_lossy();

        assert!(filename_str.starts_with("output/"));
        assert!(filename_str.contains("weather_export_"));
        assert!(filename_str.ends_with(".csv"));
    }

    #[test]
    fn test_generate_default_chart_filename() {
        let filename = generate_default_chart_filename("temperature", "svg");
        let filename_str = filename.to_string_lossy();

        assert!(filename_str.contains("weather_chart_temperature_"));
        assert!(filename_str.ends_with(".svg"));
    }

    #[test]
    fn test_attachment_filename_is_stable_for_instant() {
        let at = Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap();
        assert_eq!(
            attachment_filename("weather_data_temperature", "json", &at),
            "weather_data_temperature_20240203_040506.json"
        );
    }
}
