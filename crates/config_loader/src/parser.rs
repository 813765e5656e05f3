//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。

use contracts::{ContractError, RecorderBlueprint};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 解析 TOML 格式配置
pub fn parse_toml(content: &str) -> Result<RecorderBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 JSON 格式配置
pub fn parse_json(content: &str) -> Result<RecorderBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<RecorderBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ChannelKind, SinkType};

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[storage]
base_dir = "/tmp/imu-data"

[[channels]]
kind = "accel"

[[channels]]
kind = "gyro"
rate = { hz = 200.0 }

[[channels]]
kind = "gyro_uncalibrated"
rate = { period_micros = 5000 }

[session]
name = "bench_walk"

[[sinks]]
name = "imu_csv"
sink_type = "csv"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.storage.base_dir.to_str(), Some("/tmp/imu-data"));
        assert_eq!(bp.channels.len(), 3);
        assert_eq!(bp.channels[1].kind, ChannelKind::Gyro);
        assert_eq!(bp.session.name.as_deref(), Some("bench_walk"));
    }

    #[test]
    fn test_parse_toml_defaults() {
        // 只有 storage 是必填的
        let content = r#"
[storage]
base_dir = "/data"
"#;
        let bp = parse_toml(content).unwrap();
        assert_eq!(bp.channels.len(), 3);
        assert_eq!(bp.sinks.len(), 1);
        assert_eq!(bp.sinks[0].sink_type, SinkType::Csv);
        assert!(bp.session.name.is_none());
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "storage": { "base_dir": "/tmp/imu-data" },
            "channels": [
                { "kind": "accel" },
                { "kind": "gyro", "rate": { "hz": 100.0 } }
            ],
            "session": { "name": "walk_01" },
            "ingestion": { "channel_capacity": 64, "drop_policy": "drop_newest" },
            "sinks": [{ "name": "imu_csv", "sink_type": "csv" }]
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.ingestion.channel_capacity, 64);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
