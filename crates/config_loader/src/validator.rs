//! 配置校验模块
//!
//! 校验规则：
//! - 通道唯一且 2~4 个
//! - 必须包含校准加速度计
//! - 采样率提示为正
//! - base_dir 非空
//! - 会话名称合法 (不含路径分隔符)
//! - sink 名称唯一非空, 队列容量 > 0

use std::collections::HashSet;

use contracts::{ChannelKind, ContractError, RateHint, RecorderBlueprint};

/// 校验 RecorderBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &RecorderBlueprint) -> Result<(), ContractError> {
    validate_channels(blueprint)?;
    validate_rates(blueprint)?;
    validate_storage(blueprint)?;
    validate_session(blueprint)?;
    validate_ingestion(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// 校验通道集合: 唯一、包含加速度计、数量 2~4
fn validate_channels(blueprint: &RecorderBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, channel) in blueprint.channels.iter().enumerate() {
        if !seen.insert(channel.kind) {
            return Err(ContractError::config_validation(
                format!("channels[{idx}].kind"),
                format!("duplicate channel '{}'", channel.kind),
            ));
        }
    }

    if !seen.contains(&ChannelKind::Accel) {
        return Err(ContractError::config_validation(
            "channels",
            "tracked channels must include the calibrated accelerometer",
        ));
    }

    let count = blueprint.channels.len();
    if !(2..=4).contains(&count) {
        return Err(ContractError::config_validation(
            "channels",
            format!("expected 2 to 4 tracked channels, got {count}"),
        ));
    }

    Ok(())
}

/// 校验采样率提示
fn validate_rates(blueprint: &RecorderBlueprint) -> Result<(), ContractError> {
    for (idx, channel) in blueprint.channels.iter().enumerate() {
        let invalid = match channel.rate {
            RateHint::Hz(hz) => hz <= 0.0 || !hz.is_finite(),
            RateHint::PeriodMicros(us) => us == 0,
        };
        if invalid {
            return Err(ContractError::config_validation(
                format!("channels[{idx}].rate"),
                format!("rate must be positive, got {:?}", channel.rate),
            ));
        }
    }
    Ok(())
}

/// 校验存储配置
fn validate_storage(blueprint: &RecorderBlueprint) -> Result<(), ContractError> {
    if blueprint.storage.base_dir.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "storage.base_dir",
            "base_dir cannot be empty",
        ));
    }
    Ok(())
}

/// 校验会话名称 (为空时由宿主生成, 跳过)
fn validate_session(blueprint: &RecorderBlueprint) -> Result<(), ContractError> {
    let Some(name) = blueprint.session.name.as_deref() else {
        return Ok(());
    };

    if name.is_empty() {
        return Err(ContractError::config_validation(
            "session.name",
            "session name cannot be empty",
        ));
    }
    if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        return Err(ContractError::config_validation(
            "session.name",
            format!("session name '{name}' must not contain path components"),
        ));
    }
    Ok(())
}

/// 校验摄取背压设置
fn validate_ingestion(blueprint: &RecorderBlueprint) -> Result<(), ContractError> {
    if blueprint.ingestion.channel_capacity == 0 {
        return Err(ContractError::config_validation(
            "ingestion.channel_capacity",
            "channel capacity must be > 0",
        ));
    }
    Ok(())
}

/// 校验 sink 配置
fn validate_sinks(blueprint: &RecorderBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[{idx}].name"),
                format!("duplicate sink name '{}'", sink.name),
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{idx}].queue_capacity"),
                "queue capacity must be > 0",
            ));
        }
    }
    Ok(())
}
