// ==========================================
// 考官排班约束核心 - 花名册索引
// ==========================================
// 每次调用构建一次: 科室只标准化一次,按编号/姓名查找考官
// 不跨调用缓存
// ==========================================

use crate::domain::assignment::ExaminerRef;
use crate::domain::teacher::Teacher;
use crate::domain::types::RotationGroup;
use crate::engine::department::DepartmentNormalizer;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::warn;

/// 花名册条目（附标准化科室）
#[derive(Debug, Clone)]
pub struct RosterEntry<'a> {
    /// 花名册原始顺序（平局时的最终排序键）
    pub index: usize,
    pub teacher: &'a Teacher,
    pub department: Option<String>,
}

impl RosterEntry<'_> {
    pub fn identity(&self) -> &str {
        self.teacher.name.trim()
    }
}

pub struct RosterIndex<'a> {
    entries: Vec<RosterEntry<'a>>,
    by_id: HashMap<&'a str, usize>,
    by_name: HashMap<&'a str, usize>,
}

impl<'a> RosterIndex<'a> {
    pub fn new(roster: &'a [Teacher]) -> Self {
        let mut by_id = HashMap::new();
        let mut by_name = HashMap::new();
        let entries = roster
            .iter()
            .enumerate()
            .map(|(index, teacher)| {
                by_id.entry(teacher.id.trim()).or_insert(index);
                match by_name.entry(teacher.name.trim()) {
                    Entry::Occupied(_) => {
                        warn!(name = %teacher.name, "花名册存在重名考官,按首次出现处理");
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(index);
                    }
                }
                RosterEntry {
                    index,
                    teacher,
                    department: DepartmentNormalizer::normalize(teacher.department.as_deref()),
                }
            })
            .collect();

        Self {
            entries,
            by_id,
            by_name,
        }
    }

    pub fn entries(&self) -> &[RosterEntry<'a>] {
        &self.entries
    }

    /// 解析考官引用: 先按编号,再按姓名
    pub fn resolve(&self, examiner: &ExaminerRef) -> Option<&RosterEntry<'a>> {
        examiner
            .id
            .as_deref()
            .and_then(|id| self.by_id.get(id.trim()))
            .or_else(|| self.by_name.get(examiner.name.trim()))
            .map(|&i| &self.entries[i])
    }

    /// 考官的标准化科室: 花名册优先,其次引用自带科室
    pub fn department_of(&self, examiner: &ExaminerRef) -> Option<String> {
        match self.resolve(examiner) {
            Some(entry) => entry.department.clone(),
            None => DepartmentNormalizer::normalize(examiner.department.as_deref()),
        }
    }

    /// 考官轮班组（不在花名册中按无班组处理）
    pub fn rotation_group_of(&self, examiner: &ExaminerRef) -> RotationGroup {
        self.resolve(examiner)
            .map(|entry| entry.teacher.rotation_group)
            .unwrap_or_default()
    }

    /// 身份键: 花名册中的姓名,否则引用姓名
    pub fn identity_of<'r>(&'r self, examiner: &'r ExaminerRef) -> &'r str {
        self.resolve(examiner)
            .map(|entry| entry.identity())
            .unwrap_or_else(|| examiner.identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_id_then_name() {
        let roster = vec![
            Teacher::new("T1", "张三", "一室", RotationGroup::One),
            Teacher::new("T2", "李四", "区域七室", RotationGroup::None),
        ];
        let index = RosterIndex::new(&roster);

        let by_id = ExaminerRef {
            id: Some("T2".to_string()),
            name: "别名".to_string(),
            department: None,
        };
        assert_eq!(index.resolve(&by_id).unwrap().teacher.name, "李四");
        assert_eq!(index.department_of(&by_id).as_deref(), Some("七"));
        assert_eq!(index.identity_of(&by_id), "李四");

        let by_name = ExaminerRef::named("张三");
        assert_eq!(index.rotation_group_of(&by_name), RotationGroup::One);
    }

    #[test]
    fn test_unknown_examiner_uses_embedded_department() {
        let roster: Vec<Teacher> = Vec::new();
        let index = RosterIndex::new(&roster);
        let examiner = ExaminerRef {
            id: None,
            name: "外聘".to_string(),
            department: Some("3室".to_string()),
        };
        assert_eq!(index.department_of(&examiner).as_deref(), Some("三"));
        assert_eq!(index.rotation_group_of(&examiner), RotationGroup::None);
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let roster = vec![
            Teacher::new("T1", "张三", "一室", RotationGroup::One),
            Teacher::new("T9", "张三", "二室", RotationGroup::Two),
        ];
        let index = RosterIndex::new(&roster);
        assert_eq!(index.resolve(&ExaminerRef::named("张三")).unwrap().teacher.id, "T1");
    }
}
