use crate::domain::assignment::Assignment;
use crate::domain::types::ExaminerRole;
use serde::{Deserialize, Serialize};

// ==========================================
// RepairFailure - 无法修复的角色
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairFailure {
    pub assignment_id: String,
    pub student_name: String,
    pub role: ExaminerRole,
    /// 失败原因
    pub reason: String,
    /// 当前考官（保留的违规考官或 None）
    pub current: Option<String>,
}

// ==========================================
// RepairSummary - 修复摘要
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairSummary {
    pub success: bool,
    pub fixed_count: usize,
    pub remaining_issues: usize,
}

// ==========================================
// RepairReport - 修复报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairReport {
    /// 可读变更日志（按发生顺序）
    pub change_log: Vec<String>,

    /// 修复前后问题数之差
    pub fixed_count: usize,

    /// 修复后剩余问题数
    pub remaining_issues: usize,

    /// 剩余问题为 0
    pub success: bool,

    /// 最后一轮仍无法修复的角色
    pub failures: Vec<RepairFailure>,

    /// 实际执行的补充/替换轮数
    pub passes: usize,
}

impl RepairReport {
    pub fn summary(&self) -> RepairSummary {
        RepairSummary {
            success: self.success,
            fixed_count: self.fixed_count,
            remaining_issues: self.remaining_issues,
        }
    }
}

/// 纯函数修复结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairOutcome {
    pub assignments: Vec<Assignment>,
    pub report: RepairReport,
}
