use serde::{Deserialize, Serialize};
use validator::Validate;

/// A region as it appears in the configuration file, keyed by its code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RegionConfig {
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// A named geographic point; the unit of ingestion and querying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Region {
    #[validate(length(min = 1))]
    pub code: String,

    #[validate(length(min = 1))]
    pub name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl Region {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            latitude,
            longitude,
        }
    }

    pub fn from_config(code: &str, config: &RegionConfig) -> Self {
        Self::new(
            code,
            config.name.as_str(),
            config.latitude,
            config.longitude,
        )
    }
}
