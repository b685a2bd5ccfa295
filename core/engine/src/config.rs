//! FILENAME: core/engine/src/config.rs
//! PURPOSE: Tunables for batch application and the live preview.
//! CONTEXT: Hosts load this from JSON (usually a section of their own
//! settings file). Every field has a default, so an empty object is a valid
//! configuration.

use crate::environment::Environment;
use crate::number_format::NumberFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default sale price used by the preview.
pub const DEFAULT_SAMPLE_ACTUAL: f64 = 1000.0;
/// Default purchase price used by the preview.
pub const DEFAULT_SAMPLE_COMPRA: f64 = 700.0;
/// Batches smaller than this are always evaluated sequentially.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 2048;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub batch: BatchConfig,
    pub preview: PreviewConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Allow splitting large batches across the rayon thread pool.
    pub parallel: bool,
    pub parallel_threshold: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            parallel: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// The example item every preview is evaluated against.
    pub sample: Environment,
    pub number_format: NumberFormat,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        PreviewConfig {
            sample: Environment::new(Some(DEFAULT_SAMPLE_ACTUAL), Some(DEFAULT_SAMPLE_COMPRA)),
            number_format: NumberFormat::General,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.batch.parallel_threshold == 0 {
            return Err(ConfigError::Invalid(
                "batch.parallel_threshold must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("actual", self.preview.sample.actual),
            ("compra", self.preview.sample.compra),
        ] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(ConfigError::Invalid(format!(
                        "preview.sample.{} must be a finite number",
                        name
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(config.batch.parallel);
        assert_eq!(config.preview.sample.actual, Some(DEFAULT_SAMPLE_ACTUAL));
        assert_eq!(config.preview.sample.compra, Some(DEFAULT_SAMPLE_COMPRA));
    }

    #[test]
    fn test_partial_json_overrides_fields() {
        let json = r#"{
            "batch": { "parallel": false },
            "preview": {
                "sample": { "actual": 2500.0, "compra": null },
                "number_format": { "Number": { "decimal_places": 2, "use_thousands_separator": true } }
            }
        }"#;
        let config = EngineConfig::from_json_str(json).unwrap();

        assert!(!config.batch.parallel);
        assert_eq!(config.batch.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
        assert_eq!(config.preview.sample, Environment::new(Some(2500.0), None));
        assert_eq!(
            config.preview.number_format,
            NumberFormat::number_with_separators(2)
        );
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = EngineConfig::from_json_str(r#"{ "batch": { "parallel_threshold": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = EngineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let config = EngineConfig::default();
        let json = config.to_json_string().unwrap();
        assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_loads_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "batch": {{ "parallel_threshold": 64 }} }}"#).unwrap();

        let config = EngineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.batch.parallel_threshold, 64);
        assert_eq!(config.preview, PreviewConfig::default());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EngineConfig::from_json_file("/nonexistent/pricing-engine.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
