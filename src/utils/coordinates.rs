use crate::error::{MonitorError, Result};

/// Validate that a point lies on the globe.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(MonitorError::InvalidInput(format!(
            "Latitude {} is outside [-90, 90]",
            latitude
        )));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(MonitorError::InvalidInput(format!(
            "Longitude {} is outside [-180, 180]",
            longitude
        )));
    }

    Ok(())
}

/// Format a coordinate pair for display, e.g. `51.5074°N, 0.1278°W`.
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    let ns = if latitude < 0.0 { 'S' } else { 'N' };
    let ew = if longitude < 0.0 { 'W' } else { 'E' };
    format!(
        "{:.4}°{}, {:.4}°{}",
        latitude.abs(),
        ns,
        longitude.abs(),
        ew
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validation() {
        assert!(validate_coordinates(51.5074, -0.1278).is_ok()); // London
        assert!(validate_coordinates(-33.8688, 151.2093).is_ok()); // Sydney
        assert!(validate_coordinates(90.0, 180.0).is_ok());
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, -181.0).is_err());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_format_coordinates() {
        assert_eq!(
            format_coordinates(51.5074, -0.1278),
            "51.5074°N, 0.1278°W"
        );
        assert_eq!(format_coordinates(-33.8688, 151.2093), "33.8688°S, 151.2093°E");
    }
}
