use std::collections::BTreeMap;

use tracing::warn;

use crate::config::AppConfig;
use crate::error::{MonitorError, Result};

/// Named region groups from the `region_presets` section.
#[derive(Debug, Clone, Default)]
pub struct PresetManager {
    presets: BTreeMap<String, Vec<String>>,
}

impl PresetManager {
    pub fn new(presets: BTreeMap<String, Vec<String>>) -> Self {
        Self { presets }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.region_presets.clone())
    }

    pub fn list_presets(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).collect()
    }

    /// Region codes of a preset, as configured.
    pub fn preset_regions(&self, name: &str) -> Result<&[String]> {
        self.presets
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                MonitorError::InvalidInput(format!(
                    "Preset '{}' not found. Available: {}",
                    name,
                    self.list_presets().join(", ")
                ))
            })
    }

    /// Preset codes that appear in `available`, in preset order.
    pub fn validate_preset(&self, name: &str, available: &[String]) -> Result<Vec<String>> {
        let (valid, invalid): (Vec<String>, Vec<String>) = self
            .preset_regions(name)?
            .iter()
            .cloned()
            .partition(|code| available.contains(code));

        if !invalid.is_empty() {
            warn!(
                "Invalid regions in preset '{}': {}",
                name,
                invalid.join(", ")
            );
        }
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn manager() -> PresetManager {
        let mut presets = BTreeMap::new();
        presets.insert(
            "scotland".to_string(),
            vec!["edinburgh".to_string(), "glasgow".to_string(), "atlantis".to_string()],
        );
        presets.insert("capitals".to_string(), vec!["london".to_string()]);
        PresetManager::new(presets)
    }

    #[test]
    fn test_list_and_resolve() {
        let manager = manager();
        assert_eq!(manager.list_presets(), vec!["capitals", "scotland"]);
        assert_eq!(manager.preset_regions("capitals").unwrap().to_vec(), vec!["london".to_string()]);
    }

    #[test]
    fn test_unknown_preset_is_validation_error() {
        let err = manager().preset_regions("wales").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("capitals, scotland"));
    }

    #[test]
    fn test_validate_drops_unknown_regions() {
        let available = vec!["glasgow".to_string(), "edinburgh".to_string()];
        let valid = manager().validate_preset("scotland", &available).unwrap();
        assert_eq!(valid, vec!["edinburgh".to_string(), "glasgow".to_string()]);
    }
}
