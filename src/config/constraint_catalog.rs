// ==========================================
// 考官排班约束核心 - 约束目录
// ==========================================
// 硬约束（HC）: 固定清单,不可配置,必须启用
// 软约束（SC）: 权重带 {min, max, optimal}
// 冲突规则: 两项软约束同时高权重时会互相拉扯
// ==========================================

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// 硬约束定义
#[derive(Debug, Clone, Copy)]
pub struct HardConstraintSpec {
    pub id: &'static str,
    pub key: &'static str,
    pub title: &'static str,
}

/// 软约束定义
#[derive(Debug, Clone, Copy)]
pub struct SoftConstraintSpec {
    pub id: &'static str,
    pub key: &'static str,
    pub title: &'static str,
    pub min: f64,
    pub max: f64,
    pub optimal: f64,
}

impl SoftConstraintSpec {
    /// 非有限值（NaN / 无穷）一律视为越界
    pub fn in_band(&self, weight: f64) -> bool {
        weight.is_finite() && weight >= self.min && weight <= self.max
    }

    /// 与最优权重的接近程度 [0, 1]; 非有限值为 0
    pub fn closeness(&self, weight: f64) -> f64 {
        if !weight.is_finite() {
            return 0.0;
        }
        let span = (self.optimal - self.min).max(self.max - self.optimal);
        if span <= 0.0 {
            return if weight == self.optimal { 1.0 } else { 0.0 };
        }
        (1.0 - (weight - self.optimal).abs() / span).clamp(0.0, 1.0)
    }
}

/// 软约束对冲突规则
#[derive(Debug, Clone, Copy)]
pub struct ConflictRule {
    pub first: &'static str,
    pub second: &'static str,
    pub first_threshold: f64,
    pub second_threshold: f64,
    /// 严重冲突记为错误,否则记为警告
    pub severe: bool,
    pub reason: &'static str,
}

pub const HARD_CONSTRAINTS: [HardConstraintSpec; 4] = [
    HardConstraintSpec {
        id: "HC1",
        key: "examDateWorkday",
        title: "考试安排在工作日",
    },
    HardConstraintSpec {
        id: "HC2",
        key: "examinerDepartmentRules",
        title: "考官一与考生同科室（三七互通）,考官二不同科室",
    },
    HardConstraintSpec {
        id: "HC3",
        key: "dayShiftExclusion",
        title: "白班考官不参加考试",
    },
    HardConstraintSpec {
        id: "HC4",
        key: "noDoubleBooking",
        title: "同一考官同日只参加一场考试",
    },
];

pub const SOFT_CONSTRAINTS: [SoftConstraintSpec; 8] = [
    SoftConstraintSpec {
        id: "SC1",
        key: "nightShiftPreference",
        title: "晚班考官优先",
        min: 60.0,
        max: 100.0,
        optimal: 90.0,
    },
    SoftConstraintSpec {
        id: "SC2",
        key: "restDayPreference",
        title: "休息班考官次优先",
        min: 40.0,
        max: 90.0,
        optimal: 70.0,
    },
    SoftConstraintSpec {
        id: "SC3",
        key: "workloadBalance",
        title: "考官工作量均衡",
        min: 30.0,
        max: 80.0,
        optimal: 50.0,
    },
    SoftConstraintSpec {
        id: "SC4",
        key: "consecutiveDays",
        title: "两天考试日期连续",
        min: 50.0,
        max: 100.0,
        optimal: 80.0,
    },
    SoftConstraintSpec {
        id: "SC5",
        key: "preferLaterDates",
        title: "优先安排较晚日期",
        min: 0.0,
        max: 50.0,
        optimal: 20.0,
    },
    SoftConstraintSpec {
        id: "SC6",
        key: "crossDepartmentSupport",
        title: "跨科室支援",
        min: 0.0,
        max: 60.0,
        optimal: 30.0,
    },
    SoftConstraintSpec {
        id: "SC7",
        key: "examiner2CrossDepartment",
        title: "考官二优先非互通科室",
        min: 20.0,
        max: 70.0,
        optimal: 40.0,
    },
    SoftConstraintSpec {
        id: "SC8",
        key: "backupRestPreference",
        title: "备份考官优先休息班",
        min: 20.0,
        max: 80.0,
        optimal: 50.0,
    },
];

pub const CONFLICT_RULES: [ConflictRule; 4] = [
    ConflictRule {
        first: "consecutiveDays",
        second: "preferLaterDates",
        first_threshold: 80.0,
        second_threshold: 40.0,
        severe: true,
        reason: "连续日期与晚期日期偏好同时高权重,可排日期被双向挤压",
    },
    ConflictRule {
        first: "nightShiftPreference",
        second: "workloadBalance",
        first_threshold: 95.0,
        second_threshold: 70.0,
        severe: false,
        reason: "晚班优先过强会集中使用少数考官,与工作量均衡相互抵消",
    },
    ConflictRule {
        first: "crossDepartmentSupport",
        second: "examiner2CrossDepartment",
        first_threshold: 50.0,
        second_threshold: 60.0,
        severe: false,
        reason: "跨科室支援与考官二科室偏好同时高权重,候选池被重复筛选",
    },
    ConflictRule {
        first: "restDayPreference",
        second: "backupRestPreference",
        first_threshold: 85.0,
        second_threshold: 70.0,
        severe: false,
        reason: "休息班考官被主考官与备份考官同时争抢",
    },
];

/// 启用软约束数量的推荐区间
pub const SOFT_SWEET_SPOT: RangeInclusive<usize> = 3..=6;

/// 约束开关（由降级策略改写）
pub mod flag_keys {
    pub const THREE_EXAMINERS: &str = "threeExaminers";
    pub const ENFORCE_CONSECUTIVE_DAYS: &str = "enforceConsecutiveDays";
    pub const STRICT_WORKLOAD_BALANCE: &str = "strictWorkloadBalance";
}

pub const CROSS_DEPARTMENT_SUPPORT_KEY: &str = "crossDepartmentSupport";

pub fn soft_spec(key: &str) -> Option<&'static SoftConstraintSpec> {
    SOFT_CONSTRAINTS.iter().find(|spec| spec.key == key)
}

pub fn hard_spec(key: &str) -> Option<&'static HardConstraintSpec> {
    HARD_CONSTRAINTS.iter().find(|spec| spec.key == key)
}

/// 默认软约束权重（各自最优值）
pub fn default_weights() -> BTreeMap<String, f64> {
    SOFT_CONSTRAINTS
        .iter()
        .map(|spec| (spec.key.to_string(), spec.optimal))
        .collect()
}
