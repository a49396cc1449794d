// ==========================================
// 考官排班约束核心 - 约束配置校验与评分
// ==========================================
// 职责: 在提交求解器前检查约束/权重配置
// 规则: 硬约束缺失或关闭 → 错误
// 规则: 软约束越界 → 警告（附建议区间）; 偏离最优值超出容差 → 建议
// 规则: 软约束关闭但权重非零 → 警告
// 规则: 冲突规则命中 → 严重为错误,否则为警告
// ==========================================

use crate::config::constraint_catalog::{
    soft_spec, CONFLICT_RULES, HARD_CONSTRAINTS, SOFT_CONSTRAINTS, SOFT_SWEET_SPOT,
};
use crate::config::EngineConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

const ERROR_PENALTY: f64 = 20.0;
const WARNING_PENALTY: f64 = 5.0;
const CLOSENESS_REWARD: f64 = 10.0;
const SWEET_SPOT_BONUS: f64 = 5.0;

// ==========================================
// ConstraintConfig - 待校验的约束配置
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftConstraintSetting {
    pub enabled: bool,
    #[serde(default)]
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintConfig {
    #[serde(default)]
    pub hard_constraints: BTreeMap<String, bool>,
    #[serde(default)]
    pub soft_constraints: BTreeMap<String, SoftConstraintSetting>,
}

impl Default for ConstraintConfig {
    /// 全部硬约束启用,全部软约束以最优权重启用
    fn default() -> Self {
        Self {
            hard_constraints: HARD_CONSTRAINTS
                .iter()
                .map(|spec| (spec.key.to_string(), true))
                .collect(),
            soft_constraints: SOFT_CONSTRAINTS
                .iter()
                .map(|spec| {
                    (
                        spec.key.to_string(),
                        SoftConstraintSetting {
                            enabled: true,
                            weight: spec.optimal,
                        },
                    )
                })
                .collect(),
        }
    }
}

impl ConstraintConfig {
    pub fn set_soft(&mut self, key: &str, enabled: bool, weight: f64) {
        self.soft_constraints
            .insert(key.to_string(), SoftConstraintSetting { enabled, weight });
    }

    fn enabled_weight(&self, key: &str) -> Option<f64> {
        self.soft_constraints
            .get(key)
            .filter(|setting| setting.enabled)
            .map(|setting| setting.weight)
    }
}

/// 校验结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    /// [0, 100]
    pub score: f64,
}

// ==========================================
// ConstraintValidator - 约束配置校验器
// ==========================================
#[derive(Debug, Clone)]
pub struct ConstraintValidator {
    suggestion_tolerance: f64,
}

impl Default for ConstraintValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintValidator {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            suggestion_tolerance: config.suggestion_tolerance,
        }
    }

    /// 校验约束配置并评分
    ///
    /// # 返回
    /// `ValidationResult`: errors 为空即 is_valid
    #[instrument(skip_all)]
    pub fn validate(&self, config: &ConstraintConfig) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut suggestions = Vec::new();

        // 1. 硬约束
        for spec in HARD_CONSTRAINTS.iter() {
            match config.hard_constraints.get(spec.key) {
                None => errors.push(format!("硬约束 {}（{}）缺失,必须启用", spec.id, spec.title)),
                Some(false) => {
                    errors.push(format!("硬约束 {}（{}）不可关闭", spec.id, spec.title))
                }
                Some(true) => {}
            }
        }

        // 2. 软约束
        let mut closeness_total = 0.0;
        let mut enabled_count = 0;
        for spec in SOFT_CONSTRAINTS.iter() {
            let Some(setting) = config.soft_constraints.get(spec.key) else {
                continue;
            };
            if !setting.enabled {
                if setting.weight != 0.0 {
                    warnings.push(format!(
                        "软约束 {}（{}）已关闭但权重为 {},配置无效",
                        spec.id, spec.title, setting.weight
                    ));
                }
                continue;
            }

            enabled_count += 1;
            closeness_total += spec.closeness(setting.weight);
            if !spec.in_band(setting.weight) {
                warnings.push(format!(
                    "软约束 {}（{}）权重 {} 超出范围,建议范围 {}-{}",
                    spec.id, spec.title, setting.weight, spec.min, spec.max
                ));
            }
            if !setting.weight.is_finite()
                || (setting.weight - spec.optimal).abs() > self.suggestion_tolerance
            {
                suggestions.push(format!(
                    "软约束 {}（{}）权重 {} 偏离推荐值 {}",
                    spec.id, spec.title, setting.weight, spec.optimal
                ));
            }
        }

        for key in config.soft_constraints.keys() {
            if soft_spec(key).is_none() {
                warnings.push(format!("未知软约束 {},将被求解器忽略", key));
            }
        }

        // 3. 冲突规则
        for rule in CONFLICT_RULES.iter() {
            let (Some(first), Some(second)) =
                (config.enabled_weight(rule.first), config.enabled_weight(rule.second))
            else {
                continue;
            };
            if first > rule.first_threshold && second > rule.second_threshold {
                let message = format!(
                    "{}（{}）与 {}（{}）冲突: {}",
                    rule.first, first, rule.second, second, rule.reason
                );
                if rule.severe {
                    errors.push(message);
                } else {
                    warnings.push(message);
                }
            }
        }

        if !SOFT_SWEET_SPOT.contains(&enabled_count) {
            suggestions.push(format!(
                "当前启用 {} 项软约束,建议启用 {}-{} 项",
                enabled_count,
                SOFT_SWEET_SPOT.start(),
                SOFT_SWEET_SPOT.end()
            ));
        }

        // 4. 评分
        let mut score = 100.0 - ERROR_PENALTY * errors.len() as f64
            - WARNING_PENALTY * warnings.len() as f64
            + CLOSENESS_REWARD * closeness_total;
        if SOFT_SWEET_SPOT.contains(&enabled_count) {
            score += SWEET_SPOT_BONUS;
        }
        let score = score.clamp(0.0, 100.0);

        debug!(
            errors = errors.len(),
            warnings = warnings.len(),
            suggestions = suggestions.len(),
            score,
            "约束配置校验完成"
        );

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            suggestions,
            score,
        }
    }
}
