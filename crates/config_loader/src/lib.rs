//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `RecorderBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("config.toml")).unwrap();
//! println!("Base dir: {}", blueprint.storage.base_dir.display());
//! ```

mod parser;
mod validator;

pub use contracts::RecorderBlueprint;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<RecorderBlueprint, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<RecorderBlueprint, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize RecorderBlueprint to TOML string
    pub fn to_toml(blueprint: &RecorderBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize RecorderBlueprint to JSON string
    pub fn to_json(blueprint: &RecorderBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<RecorderBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
[storage]
base_dir = "/tmp/imu-data"

[[channels]]
kind = "accel"

[[channels]]
kind = "gyro"
rate = { hz = 100.0 }

[[channels]]
kind = "gyro_uncalibrated"

[session]
name = "bench_walk"

[ingestion]
channel_capacity = 100
drop_policy = "drop_oldest"

[[sinks]]
name = "imu_csv"
sink_type = "csv"
queue_capacity = 100
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.storage.base_dir.to_str(), Some("/tmp/imu-data"));
        assert_eq!(bp.channels.len(), 3);
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.storage.base_dir, bp2.storage.base_dir);
        assert_eq!(bp.channels.len(), bp2.channels.len());
        assert_eq!(bp.channels[0].kind, bp2.channels[0].kind);
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.storage.base_dir, bp2.storage.base_dir);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        // Duplicate channel kind should fail validation
        let content = r#"
[storage]
base_dir = "/tmp/imu-data"

[[channels]]
kind = "accel"

[[channels]]
kind = "accel"

[[sinks]]
name = "imu_csv"
sink_type = "csv"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }
}
