// ==========================================
// 考官排班约束核心 - 引擎配置
// ==========================================
// 职责: 配置加载、默认值、取值校验
// 来源: key-value 映射（宿主系统的配置表）或 JSON 文件
// 说明: 引擎只持有配置,不持有跨调用状态
// ==========================================

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

/// 配置键
pub mod config_keys {
    pub const REQUIRE_BACKUP_EXAMINER: &str = "require_backup_examiner";
    pub const BOTTLENECK_RATIO: &str = "bottleneck_ratio";
    pub const CROSS_SUPPORT_BOOST: &str = "cross_support_boost";
    pub const SUGGESTION_TOLERANCE: &str = "suggestion_tolerance";
}

// ==========================================
// EngineConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// 是否要求备份考官（三考官制）
    pub require_backup_examiner: bool,
    /// 科室考官/考生比低于该值视为瓶颈
    pub bottleneck_ratio: f64,
    /// 瓶颈科室跨科室支援权重加成
    pub cross_support_boost: f64,
    /// 软约束权重偏离最优值超过该容差时给出建议
    pub suggestion_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            require_backup_examiner: true,
            bottleneck_ratio: 1.5,
            cross_support_boost: 10.0,
            suggestion_tolerance: 15.0,
        }
    }
}

impl EngineConfig {
    /// 从 key-value 映射加载,缺失的键取默认值
    pub fn from_kv(values: &HashMap<String, String>) -> EngineResult<Self> {
        let defaults = Self::default();
        let config = Self {
            require_backup_examiner: read_value(
                values,
                config_keys::REQUIRE_BACKUP_EXAMINER,
                defaults.require_backup_examiner,
            )?,
            bottleneck_ratio: read_value(
                values,
                config_keys::BOTTLENECK_RATIO,
                defaults.bottleneck_ratio,
            )?,
            cross_support_boost: read_value(
                values,
                config_keys::CROSS_SUPPORT_BOOST,
                defaults.cross_support_boost,
            )?,
            suggestion_tolerance: read_value(
                values,
                config_keys::SUGGESTION_TOLERANCE,
                defaults.suggestion_tolerance,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文本加载
    pub fn from_json_str(raw: &str) -> EngineResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// 取值范围校验
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.bottleneck_ratio.is_finite() && self.bottleneck_ratio > 0.0) {
            return Err(config_error(
                config_keys::BOTTLENECK_RATIO,
                &self.bottleneck_ratio.to_string(),
                "必须为正数",
            ));
        }
        if !(self.cross_support_boost.is_finite() && self.cross_support_boost >= 0.0) {
            return Err(config_error(
                config_keys::CROSS_SUPPORT_BOOST,
                &self.cross_support_boost.to_string(),
                "不能为负数",
            ));
        }
        if !(self.suggestion_tolerance.is_finite() && self.suggestion_tolerance >= 0.0) {
            return Err(config_error(
                config_keys::SUGGESTION_TOLERANCE,
                &self.suggestion_tolerance.to_string(),
                "不能为负数",
            ));
        }
        Ok(())
    }
}

fn read_value<T: FromStr>(
    values: &HashMap<String, String>,
    key: &str,
    default: T,
) -> EngineResult<T> {
    match values.get(key).map(|v| v.trim()) {
        None | Some("") => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| config_error(key, raw, "格式无法解析")),
    }
}

fn config_error(key: &str, value: &str, message: &str) -> EngineError {
    EngineError::ConfigValue {
        key: key.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}
