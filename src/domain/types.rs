// ==========================================
// 考官排班约束核心 - 领域类型定义
// ==========================================
// 轮班组 / 值班状态 / 考官角色 / 违规类型 / 严重程度
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 轮班组 (Rotation Group)
// ==========================================
// 一~四组参与 4 天轮转; 无班组 / 行政班不受白班限制
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum RotationGroup {
    One,
    Two,
    Three,
    Four,
    None,
    Administrative,
}

impl RotationGroup {
    /// 参与轮转的四个班组（按编号顺序）
    pub const ROTATING: [RotationGroup; 4] = [
        RotationGroup::One,
        RotationGroup::Two,
        RotationGroup::Three,
        RotationGroup::Four,
    ];

    /// 从花名册中的班组文本解析
    ///
    /// 支持: "一组" / "一" / "1" / "1组" / "group-one" / "one" / "无" / "none" / "行政" / "administrative"
    /// 无法识别的文本按无班组处理（始终可用）
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim().to_lowercase();
        let s = s
            .trim_start_matches("group-")
            .trim_start_matches("group_")
            .trim_end_matches("班组")
            .trim_end_matches('组');
        match s {
            "一" | "1" | "one" => RotationGroup::One,
            "二" | "2" | "two" => RotationGroup::Two,
            "三" | "3" | "three" => RotationGroup::Three,
            "四" | "4" | "four" => RotationGroup::Four,
            "行政" | "行政班" | "admin" | "administrative" => RotationGroup::Administrative,
            _ => RotationGroup::None,
        }
    }

    /// 是否参与 4 天轮转
    pub fn is_rotating(&self) -> bool {
        !matches!(self, RotationGroup::None | RotationGroup::Administrative)
    }

    pub fn title_cn(&self) -> &'static str {
        match self {
            RotationGroup::One => "一组",
            RotationGroup::Two => "二组",
            RotationGroup::Three => "三组",
            RotationGroup::Four => "四组",
            RotationGroup::None => "无班组",
            RotationGroup::Administrative => "行政班",
        }
    }
}

impl Default for RotationGroup {
    fn default() -> Self {
        RotationGroup::None
    }
}

impl From<String> for RotationGroup {
    fn from(value: String) -> Self {
        RotationGroup::parse(&value)
    }
}

impl fmt::Display for RotationGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title_cn())
    }
}

// ==========================================
// 值班状态 (Duty Shift)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyShift {
    DayShift,     // 白班（不可监考）
    NightShift,   // 晚班（最优先）
    Resting,      // 休息
    Unrestricted, // 无班组/行政班
}

impl DutyShift {
    /// 考官选择优先级（越小越优先）; 白班返回 None 表示排除
    pub fn examiner_priority(&self) -> Option<u8> {
        match self {
            DutyShift::NightShift => Some(0),
            DutyShift::Resting => Some(1),
            DutyShift::Unrestricted => Some(2),
            DutyShift::DayShift => None,
        }
    }
}

impl fmt::Display for DutyShift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DutyShift::DayShift => write!(f, "白班"),
            DutyShift::NightShift => write!(f, "晚班"),
            DutyShift::Resting => write!(f, "休息"),
            DutyShift::Unrestricted => write!(f, "不轮班"),
        }
    }
}

// ==========================================
// 考官角色 (Examiner Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExaminerRole {
    Examiner1,
    Examiner2,
    Backup,
}

impl ExaminerRole {
    pub const ALL: [ExaminerRole; 3] = [
        ExaminerRole::Examiner1,
        ExaminerRole::Examiner2,
        ExaminerRole::Backup,
    ];

    /// 导出层使用的字段名
    pub fn field_name(&self) -> &'static str {
        match self {
            ExaminerRole::Examiner1 => "examiner1",
            ExaminerRole::Examiner2 => "examiner2",
            ExaminerRole::Backup => "backupExaminer",
        }
    }

    pub fn title_cn(&self) -> &'static str {
        match self {
            ExaminerRole::Examiner1 => "考官一",
            ExaminerRole::Examiner2 => "考官二",
            ExaminerRole::Backup => "备份考官",
        }
    }
}

impl fmt::Display for ExaminerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title_cn())
    }
}

// ==========================================
// 违规类型 (Violation Type)
// ==========================================
// 机器可判别的类型标签,修复引擎与导出层据此分支
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationType {
    TimeConflict,
    DepartmentMismatchExaminer1,
    DepartmentMismatchExaminer2,
    SameDepartmentPair,
    DuplicateExaminer,
    DayShiftExaminer,
    MissingExaminer,
}

impl ViolationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationType::TimeConflict => "time-conflict",
            ViolationType::DepartmentMismatchExaminer1 => "department-mismatch-examiner1",
            ViolationType::DepartmentMismatchExaminer2 => "department-mismatch-examiner2",
            ViolationType::SameDepartmentPair => "same-department-pair",
            ViolationType::DuplicateExaminer => "duplicate-examiner",
            ViolationType::DayShiftExaminer => "day-shift-examiner",
            ViolationType::MissingExaminer => "missing-examiner",
        }
    }

    /// 缺省严重程度
    pub fn severity(&self) -> Severity {
        match self {
            ViolationType::MissingExaminer => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 严重程度 (Severity)
// ==========================================
// 顺序: Info < Warning < Error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}
