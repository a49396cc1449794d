// ==========================================
// 考官排班约束核心 - 自适应约束策略
// ==========================================
// 职责: 评估考官资源紧张度,选择降级策略,生成求解器权重
// 输入: 考生需求 + 考官花名册 + 基础权重
// 输出: 资源分析 + 推荐权重/开关 + 预测成功率（仅供参考）
// ==========================================
// 规则: 紧张度 = 0.40·f(最小科室比) + 0.35·f(平均科室比) + 0.25·f(全局比)
// 规则: 选择阈值 ≤ 紧张度的最后一个策略（单调,不跳过）
// ==========================================

use crate::config::constraint_catalog::{flag_keys, CROSS_DEPARTMENT_SUPPORT_KEY};
use crate::config::EngineConfig;
use crate::domain::teacher::{Student, Teacher};
use crate::engine::department::DepartmentNormalizer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

const MIN_RATIO_SHARE: f64 = 0.40;
const MEAN_RATIO_SHARE: f64 = 0.35;
const GLOBAL_RATIO_SHARE: f64 = 0.25;

/// 科室字段缺失时的统计键
const UNKNOWN_DEPARTMENT: &str = "未知";

/// 比例 → 紧张度贡献（阶梯函数）
fn ratio_pressure(ratio: f64) -> f64 {
    if ratio < 1.0 {
        1.0
    } else if ratio < 1.5 {
        0.7
    } else if ratio < 2.0 {
        0.4
    } else if ratio < 2.5 {
        0.15
    } else {
        0.0
    }
}

// ==========================================
// DegradationStrategy - 降级策略
// ==========================================
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DegradationStrategy {
    pub name: &'static str,
    pub title: &'static str,
    pub threshold: f64,
    /// 软约束权重全量覆盖
    pub weights: &'static [(&'static str, f64)],
    pub flags: &'static [(&'static str, bool)],
    pub adjustments: &'static [&'static str],
}

/// 按阈值升序排列
pub const DEGRADATION_STRATEGIES: [DegradationStrategy; 5] = [
    DegradationStrategy {
        name: "standard",
        title: "标准",
        threshold: 0.0,
        weights: &[
            ("nightShiftPreference", 90.0),
            ("restDayPreference", 70.0),
            ("workloadBalance", 50.0),
            ("consecutiveDays", 80.0),
            ("preferLaterDates", 20.0),
            ("crossDepartmentSupport", 30.0),
            ("examiner2CrossDepartment", 40.0),
            ("backupRestPreference", 50.0),
        ],
        flags: &[
            (flag_keys::THREE_EXAMINERS, true),
            (flag_keys::ENFORCE_CONSECUTIVE_DAYS, true),
            (flag_keys::STRICT_WORKLOAD_BALANCE, true),
        ],
        adjustments: &["资源充足,使用标准约束权重"],
    },
    DegradationStrategy {
        name: "mild",
        title: "轻度放宽",
        threshold: 0.3,
        weights: &[
            ("nightShiftPreference", 85.0),
            ("restDayPreference", 65.0),
            ("workloadBalance", 45.0),
            ("consecutiveDays", 70.0),
            ("preferLaterDates", 20.0),
            ("crossDepartmentSupport", 40.0),
            ("examiner2CrossDepartment", 45.0),
            ("backupRestPreference", 45.0),
        ],
        flags: &[
            (flag_keys::THREE_EXAMINERS, true),
            (flag_keys::ENFORCE_CONSECUTIVE_DAYS, true),
            (flag_keys::STRICT_WORKLOAD_BALANCE, true),
        ],
        adjustments: &["适度降低连续考试天数权重", "提高跨科室支援权重"],
    },
    DegradationStrategy {
        name: "moderate",
        title: "中度放宽",
        threshold: 0.5,
        weights: &[
            ("nightShiftPreference", 80.0),
            ("restDayPreference", 60.0),
            ("workloadBalance", 35.0),
            ("consecutiveDays", 60.0),
            ("preferLaterDates", 15.0),
            ("crossDepartmentSupport", 50.0),
            ("examiner2CrossDepartment", 50.0),
            ("backupRestPreference", 40.0),
        ],
        flags: &[
            (flag_keys::THREE_EXAMINERS, true),
            (flag_keys::ENFORCE_CONSECUTIVE_DAYS, true),
            (flag_keys::STRICT_WORKLOAD_BALANCE, false),
        ],
        adjustments: &["关闭严格工作量均衡", "降低休息日偏好权重", "进一步提高跨科室支援权重"],
    },
    DegradationStrategy {
        name: "aggressive",
        title: "大幅放宽",
        threshold: 0.75,
        weights: &[
            ("nightShiftPreference", 70.0),
            ("restDayPreference", 50.0),
            ("workloadBalance", 30.0),
            ("consecutiveDays", 40.0),
            ("preferLaterDates", 10.0),
            ("crossDepartmentSupport", 60.0),
            ("examiner2CrossDepartment", 60.0),
            ("backupRestPreference", 30.0),
        ],
        flags: &[
            (flag_keys::THREE_EXAMINERS, true),
            (flag_keys::ENFORCE_CONSECUTIVE_DAYS, false),
            (flag_keys::STRICT_WORKLOAD_BALANCE, false),
        ],
        adjustments: &["不再强制连续考试天数", "关闭严格工作量均衡", "跨科室支援权重取上限"],
    },
    DegradationStrategy {
        name: "extreme",
        title: "极限降级",
        threshold: 0.95,
        weights: &[
            ("nightShiftPreference", 60.0),
            ("restDayPreference", 40.0),
            ("workloadBalance", 20.0),
            ("consecutiveDays", 20.0),
            ("preferLaterDates", 0.0),
            ("crossDepartmentSupport", 60.0),
            ("examiner2CrossDepartment", 70.0),
            ("backupRestPreference", 20.0),
        ],
        flags: &[
            (flag_keys::THREE_EXAMINERS, false),
            (flag_keys::ENFORCE_CONSECUTIVE_DAYS, false),
            (flag_keys::STRICT_WORKLOAD_BALANCE, false),
        ],
        adjustments: &["取消备份考官（两考官制）", "软约束权重全部降至下限附近"],
    },
];

// ==========================================
// 资源分析结果
// ==========================================

/// 单个科室的供需情况
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentResource {
    pub department: String,
    /// 在岗考官数
    pub teachers: usize,
    pub students: usize,
    pub ratio: f64,
    pub is_bottleneck: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAnalysis {
    pub total_teachers: usize,
    pub total_students: usize,
    pub overall_ratio: f64,
    pub department_stats: Vec<DepartmentResource>,
    pub min_ratio: f64,
    pub mean_ratio: f64,
    pub bottlenecks: Vec<String>,
    pub tension: f64,
}

/// 推荐给求解器的约束配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveConstraints {
    pub resource_tension: f64,
    pub strategy_used: String,
    pub adjustments: Vec<String>,
    pub weights: BTreeMap<String, f64>,
    pub flags: BTreeMap<String, bool>,
    /// 瓶颈科室 → 加成后的跨科室支援权重
    pub department_boosts: BTreeMap<String, f64>,
    pub bottleneck_departments: Vec<String>,
    pub predicted_success_rate: f64,
}

// ==========================================
// AdaptiveConstraintStrategist - 自适应约束策略
// ==========================================
#[derive(Debug, Clone)]
pub struct AdaptiveConstraintStrategist {
    bottleneck_ratio: f64,
    cross_support_boost: f64,
}

impl Default for AdaptiveConstraintStrategist {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveConstraintStrategist {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            bottleneck_ratio: config.bottleneck_ratio,
            cross_support_boost: config.cross_support_boost,
        }
    }

    // ==========================================
    // 资源分析
    // ==========================================

    /// 分析考官供需
    ///
    /// # 规则
    /// - 只统计在岗考官
    /// - 没有考生的科室不参与比例统计
    /// - 没有考生时紧张度为 0,全局比例取在岗考官数
    #[instrument(skip_all, fields(students = students.len(), teachers = teachers.len()))]
    pub fn analyze(&self, students: &[Student], teachers: &[Teacher]) -> ResourceAnalysis {
        let mut demand: BTreeMap<String, usize> = BTreeMap::new();
        for student in students {
            *demand.entry(department_key(student.department.as_deref())).or_insert(0) += 1;
        }

        let mut supply: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_teachers = 0;
        for teacher in teachers.iter().filter(|t| t.is_active) {
            total_teachers += 1;
            *supply.entry(department_key(teacher.department.as_deref())).or_insert(0) += 1;
        }

        let department_stats: Vec<DepartmentResource> = demand
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(department, &count)| {
                let available = supply.get(department).copied().unwrap_or(0);
                let ratio = available as f64 / count as f64;
                DepartmentResource {
                    department: department.clone(),
                    teachers: available,
                    students: count,
                    ratio,
                    is_bottleneck: ratio < self.bottleneck_ratio,
                }
            })
            .collect();

        let total_students = students.len();
        if total_students == 0 {
            return ResourceAnalysis {
                total_teachers,
                total_students,
                overall_ratio: total_teachers as f64,
                department_stats,
                min_ratio: total_teachers as f64,
                mean_ratio: total_teachers as f64,
                bottlenecks: Vec::new(),
                tension: 0.0,
            };
        }

        let overall_ratio = total_teachers as f64 / total_students as f64;
        let (min_ratio, mean_ratio) = if department_stats.is_empty() {
            (overall_ratio, overall_ratio)
        } else {
            let min = department_stats
                .iter()
                .map(|d| d.ratio)
                .fold(f64::INFINITY, f64::min);
            let mean = department_stats.iter().map(|d| d.ratio).sum::<f64>()
                / department_stats.len() as f64;
            (min, mean)
        };

        let tension = MIN_RATIO_SHARE * ratio_pressure(min_ratio)
            + MEAN_RATIO_SHARE * ratio_pressure(mean_ratio)
            + GLOBAL_RATIO_SHARE * ratio_pressure(overall_ratio);
        let bottlenecks: Vec<String> = department_stats
            .iter()
            .filter(|d| d.is_bottleneck)
            .map(|d| d.department.clone())
            .collect();

        debug!(
            min_ratio,
            mean_ratio,
            overall_ratio,
            tension,
            bottlenecks = bottlenecks.len(),
            "资源分析完成"
        );

        ResourceAnalysis {
            total_teachers,
            total_students,
            overall_ratio,
            department_stats,
            min_ratio,
            mean_ratio,
            bottlenecks,
            tension,
        }
    }

    // ==========================================
    // 策略选择
    // ==========================================

    /// 阈值 ≤ 紧张度的最后一个策略的下标
    pub fn strategy_index(tension: f64) -> usize {
        DEGRADATION_STRATEGIES
            .iter()
            .rposition(|s| s.threshold <= tension)
            .unwrap_or(0)
    }

    pub fn select_strategy(tension: f64) -> &'static DegradationStrategy {
        &DEGRADATION_STRATEGIES[Self::strategy_index(tension)]
    }

    /// 生成推荐约束配置
    ///
    /// # 参数
    /// - `base_weights`: 调用方当前权重（策略覆盖其中同名项,其余保留）
    pub fn recommend(
        &self,
        students: &[Student],
        teachers: &[Teacher],
        base_weights: &BTreeMap<String, f64>,
    ) -> AdaptiveConstraints {
        let analysis = self.analyze(students, teachers);
        let strategy = Self::select_strategy(analysis.tension);

        let mut weights = base_weights.clone();
        for (key, value) in strategy.weights {
            weights.insert(key.to_string(), *value);
        }
        let flags: BTreeMap<String, bool> = strategy
            .flags
            .iter()
            .map(|(key, value)| (key.to_string(), *value))
            .collect();

        let mut adjustments: Vec<String> =
            strategy.adjustments.iter().map(|s| s.to_string()).collect();
        let mut department_boosts = BTreeMap::new();
        if let Some(&cross_support) = weights.get(CROSS_DEPARTMENT_SUPPORT_KEY) {
            for resource in analysis.department_stats.iter().filter(|d| d.is_bottleneck) {
                let boosted = cross_support + self.cross_support_boost;
                department_boosts.insert(resource.department.clone(), boosted);
                adjustments.push(format!(
                    "科室 {} 考官紧张（比例 {:.2}）,跨科室支援权重 {} → {}",
                    resource.department, resource.ratio, cross_support, boosted
                ));
            }
        }

        let predicted_success_rate = Self::predict_success_rate(&analysis);
        info!(
            tension = analysis.tension,
            strategy = strategy.name,
            bottlenecks = analysis.bottlenecks.len(),
            predicted_success_rate,
            "约束策略推荐完成"
        );

        AdaptiveConstraints {
            resource_tension: analysis.tension,
            strategy_used: strategy.name.to_string(),
            adjustments,
            weights,
            flags,
            department_boosts,
            bottleneck_departments: analysis.bottlenecks,
            predicted_success_rate,
        }
    }

    /// 预测排班成功率（经验启发式,仅供参考）
    ///
    /// # 规则
    /// 1. 按紧张度分档: 0.95 / 0.85 / 0.70 / 0.55 / 0.40
    /// 2. 全局比例 ≥ 2 加 0.03,< 1 减 0.10
    /// 3. 每个瓶颈科室减 0.02,最多减 0.10
    /// 4. 结果限制在 [0.30, 0.98]
    pub fn predict_success_rate(analysis: &ResourceAnalysis) -> f64 {
        let tension = analysis.tension;
        let mut rate = if tension < 0.3 {
            0.95
        } else if tension < 0.5 {
            0.85
        } else if tension < 0.75 {
            0.7
        } else if tension < 0.95 {
            0.55
        } else {
            0.4
        };

        if analysis.overall_ratio >= 2.0 {
            rate += 0.03;
        } else if analysis.overall_ratio < 1.0 {
            rate -= 0.1;
        }
        rate -= (0.02 * analysis.bottlenecks.len() as f64).min(0.1);

        rate.clamp(0.3, 0.98)
    }
}

fn department_key(label: Option<&str>) -> String {
    DepartmentNormalizer::normalize(label).unwrap_or_else(|| UNKNOWN_DEPARTMENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_weights;
    use crate::domain::types::RotationGroup;

    fn teachers(spec: &[(&str, usize)]) -> Vec<Teacher> {
        let mut list = Vec::new();
        for (dept, count) in spec {
            for i in 0..*count {
                let id = format!("{}-{}", dept, i);
                list.push(Teacher::new(&id, &id, dept, RotationGroup::None));
            }
        }
        list
    }

    fn students(spec: &[(&str, usize)]) -> Vec<Student> {
        let mut list = Vec::new();
        for (dept, count) in spec {
            for i in 0..*count {
                list.push(Student::new(&format!("学员{}-{}", dept, i), dept));
            }
        }
        list
    }

    #[test]
    fn test_ratio_pressure_steps() {
        assert_eq!(ratio_pressure(0.5), 1.0);
        assert_eq!(ratio_pressure(1.0), 0.7);
        assert_eq!(ratio_pressure(1.7), 0.4);
        assert_eq!(ratio_pressure(2.2), 0.15);
        assert_eq!(ratio_pressure(2.5), 0.0);
    }

    #[test]
    fn test_thresholds_strictly_increasing() {
        for pair in DEGRADATION_STRATEGIES.windows(2) {
            assert!(pair[0].threshold < pair[1].threshold);
        }
    }

    #[test]
    fn test_scarce_roster_selects_extreme() {
        let strategist = AdaptiveConstraintStrategist::new();
        let result = strategist.recommend(
            &students(&[("一", 3), ("二", 3)]),
            &teachers(&[("一", 2), ("二", 1)]),
            &default_weights(),
        );
        assert!(result.resource_tension >= 0.95);
        assert_eq!(result.strategy_used, "extreme");
        assert!(!result.flags[flag_keys::THREE_EXAMINERS]);
        assert_eq!(result.bottleneck_departments, vec!["一", "二"]);
        assert_eq!(result.department_boosts["一"], 70.0);
        assert_eq!(result.predicted_success_rate, 0.3);
    }

    #[test]
    fn test_abundant_roster_selects_standard() {
        let strategist = AdaptiveConstraintStrategist::new();
        let analysis = strategist.analyze(
            &students(&[("一", 2)]),
            &teachers(&[("一", 6), ("二", 4)]),
        );
        assert_eq!(analysis.tension, 0.0);
        assert!(analysis.bottlenecks.is_empty());
        assert_eq!(AdaptiveConstraintStrategist::select_strategy(analysis.tension).name, "standard");
        assert!((AdaptiveConstraintStrategist::predict_success_rate(&analysis) - 0.98).abs() < 1e-9);
    }

    #[test]
    fn test_inactive_teachers_and_empty_departments_are_skipped() {
        let mut roster = teachers(&[("一", 3)]);
        roster[0] = roster[0].clone().inactive();
        let analysis = AdaptiveConstraintStrategist::new().analyze(&students(&[("一", 1)]), &roster);
        assert_eq!(analysis.total_teachers, 2);
        assert_eq!(analysis.department_stats.len(), 1);
        assert_eq!(analysis.department_stats[0].ratio, 2.0);
    }

    #[test]
    fn test_no_students_means_no_tension() {
        let analysis = AdaptiveConstraintStrategist::new().analyze(&[], &teachers(&[("一", 2)]));
        assert_eq!(analysis.tension, 0.0);
        assert_eq!(analysis.overall_ratio, 2.0);
    }

    #[test]
    fn test_base_weights_outside_strategy_are_kept() {
        let mut base = default_weights();
        base.insert("customPreference".to_string(), 12.0);
        let result = AdaptiveConstraintStrategist::new().recommend(
            &students(&[("一", 1)]),
            &teachers(&[("一", 3)]),
            &base,
        );
        assert_eq!(result.weights["customPreference"], 12.0);
        assert_eq!(result.weights.len(), 9);
    }
}
