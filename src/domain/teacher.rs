// ==========================================
// 考官排班约束核心 - 考官 / 考生实体
// ==========================================
// 花名册由外部存储维护,本核心每次调用只读
// ==========================================

use crate::domain::types::RotationGroup;
use serde::{Deserialize, Serialize};

// ==========================================
// Teacher - 考官（花名册条目）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "serde_json::Value")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    /// 科室原始文本（读取时标准化）
    pub department: Option<String>,
    pub rotation_group: RotationGroup,
    /// 已承担的值班/监考次数
    pub workload: u32,
    pub is_active: bool,
}

impl Teacher {
    pub fn new(id: &str, name: &str, department: &str, rotation_group: RotationGroup) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            department: Some(department.to_string()),
            rotation_group,
            workload: 0,
            is_active: true,
        }
    }

    pub fn with_workload(mut self, workload: u32) -> Self {
        self.workload = workload;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

// ==========================================
// Student - 考生（需求侧）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "serde_json::Value")]
pub struct Student {
    pub id: Option<String>,
    pub name: String,
    pub department: Option<String>,
}

impl Student {
    pub fn new(name: &str, department: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            department: Some(department.to_string()),
        }
    }
}
