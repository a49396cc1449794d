// ==========================================
// 考官排班约束核心 - 冲突 / 违规记录
// ==========================================
// 冲突与违规都是"发现",以结构化数据返回,不抛错
// 导出层依据 field / violation_type / severity 着色,无需重新推导
// ==========================================

use crate::domain::types::{ExaminerRole, Severity, ViolationType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 冲突涉及的单个角色
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictInvolvement {
    pub assignment_id: String,
    pub student_name: String,
    pub role: ExaminerRole,
}

// ==========================================
// Conflict - 同日重复排班
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub date: NaiveDate,
    pub examiner_identity: String,
    pub roles: BTreeSet<ExaminerRole>,
    /// 字典序排列,至少两个
    pub affected_assignment_ids: Vec<String>,
    pub involvements: Vec<ConflictInvolvement>,
}

impl Conflict {
    pub fn violation_type(&self) -> ViolationType {
        ViolationType::TimeConflict
    }

    /// 按字典序保留的安排（其余安排需清空该考官）
    pub fn kept_assignment_id(&self) -> Option<&str> {
        self.affected_assignment_ids.first().map(String::as_str)
    }

    pub fn describe(&self) -> String {
        let parts: Vec<String> = self
            .involvements
            .iter()
            .map(|inv| format!("{}({})-{}", inv.student_name, inv.assignment_id, inv.role))
            .collect();
        format!(
            "{} 考官 {} 同日出现 {} 次: {}",
            self.date,
            self.examiner_identity,
            self.involvements.len(),
            parts.join(", ")
        )
    }
}

// ==========================================
// Violation - 单条规则违规
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub violation_type: ViolationType,
    pub severity: Severity,
    pub assignment_id: String,
    pub student_name: String,
    pub exam_date: NaiveDate,
    pub role: ExaminerRole,
    /// 导出层字段名（examiner1 / examiner2 / backupExaminer）
    pub field: String,
    pub examiner: Option<String>,
    pub message: String,
}

impl Violation {
    pub fn new(
        violation_type: ViolationType,
        assignment_id: &str,
        student_name: &str,
        exam_date: NaiveDate,
        role: ExaminerRole,
        examiner: Option<&str>,
        message: String,
    ) -> Self {
        Self {
            violation_type,
            severity: violation_type.severity(),
            assignment_id: assignment_id.to_string(),
            student_name: student_name.to_string(),
            exam_date,
            role,
            field: role.field_name().to_string(),
            examiner: examiner.map(str::to_string),
            message,
        }
    }
}
