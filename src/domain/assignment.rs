// ==========================================
// 考官排班约束核心 - 考试安排实体
// ==========================================
// 生命周期: 由求解器生成 → 本核心修复 → 外部持久化/导出
// ==========================================

use crate::domain::teacher::Teacher;
use crate::domain::types::ExaminerRole;
use chrono::NaiveDate;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// 未分配占位符（与上游约定的字面量）
pub const UNASSIGNED_LABEL: &str = "未分配";

// ==========================================
// ExaminerRef - 考官引用
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExaminerRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl ExaminerRef {
    /// 仅有姓名的引用
    pub fn named(name: &str) -> Self {
        Self {
            id: None,
            name: name.trim().to_string(),
            department: None,
        }
    }

    pub fn from_teacher(teacher: &Teacher) -> Self {
        Self {
            id: Some(teacher.id.clone()),
            name: teacher.name.trim().to_string(),
            department: teacher.department.clone(),
        }
    }

    /// 冲突检测使用的身份键
    pub fn identity(&self) -> &str {
        &self.name
    }
}

// ==========================================
// ExaminerSlot - 考官槽位
// ==========================================
// Absent: 字段缺失; Unassigned: 显式标记为"未分配"（修复引擎清空角色时使用）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExaminerSlot {
    #[default]
    Absent,
    Unassigned,
    Assigned(ExaminerRef),
}

impl ExaminerSlot {
    pub fn assigned(&self) -> Option<&ExaminerRef> {
        match self {
            ExaminerSlot::Assigned(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, ExaminerSlot::Assigned(_))
    }

    pub fn display_name(&self) -> &str {
        match self {
            ExaminerSlot::Assigned(r) => &r.name,
            _ => UNASSIGNED_LABEL,
        }
    }
}

impl Serialize for ExaminerSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ExaminerSlot::Absent => serializer.serialize_none(),
            ExaminerSlot::Unassigned => serializer.serialize_str(UNASSIGNED_LABEL),
            ExaminerSlot::Assigned(r) => r.serialize(serializer),
        }
    }
}

// ==========================================
// Assignment - 考试安排
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "serde_json::Value")]
pub struct Assignment {
    pub id: String,
    pub student_name: String,
    pub student_department: Option<String>,
    pub exam_date: NaiveDate,
    pub examiner1: ExaminerSlot,
    pub examiner2: ExaminerSlot,
    pub backup_examiner: ExaminerSlot,
}

impl Assignment {
    pub fn new(id: &str, student_name: &str, student_department: &str, exam_date: NaiveDate) -> Self {
        Self {
            id: id.to_string(),
            student_name: student_name.to_string(),
            student_department: Some(student_department.to_string()),
            exam_date,
            examiner1: ExaminerSlot::Absent,
            examiner2: ExaminerSlot::Absent,
            backup_examiner: ExaminerSlot::Absent,
        }
    }

    pub fn slot(&self, role: ExaminerRole) -> &ExaminerSlot {
        match role {
            ExaminerRole::Examiner1 => &self.examiner1,
            ExaminerRole::Examiner2 => &self.examiner2,
            ExaminerRole::Backup => &self.backup_examiner,
        }
    }

    pub fn slot_mut(&mut self, role: ExaminerRole) -> &mut ExaminerSlot {
        match role {
            ExaminerRole::Examiner1 => &mut self.examiner1,
            ExaminerRole::Examiner2 => &mut self.examiner2,
            ExaminerRole::Backup => &mut self.backup_examiner,
        }
    }

    /// 已填写的考官（按角色顺序）
    pub fn examiners(&self) -> impl Iterator<Item = (ExaminerRole, &ExaminerRef)> + '_ {
        ExaminerRole::ALL
            .into_iter()
            .filter_map(move |role| self.slot(role).assigned().map(|r| (role, r)))
    }

    /// 某考官在本场考试中担任的角色
    pub fn roles_of(&self, identity: &str) -> Vec<ExaminerRole> {
        self.examiners()
            .filter(|(_, r)| r.identity() == identity)
            .map(|(role, _)| role)
            .collect()
    }

    pub fn with_examiner(mut self, role: ExaminerRole, name: &str) -> Self {
        *self.slot_mut(role) = ExaminerSlot::Assigned(ExaminerRef::named(name));
        self
    }
}
