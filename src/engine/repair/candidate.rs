// ==========================================
// 候选考官筛选
// ==========================================
// 排序键: (科室层级, 当前工作量, 轮班优先级, 花名册顺序)
// 当前工作量 = 花名册工作量 + 本次会话已担任角色数
// ==========================================

use crate::domain::assignment::Assignment;
use crate::domain::types::ExaminerRole;
use crate::engine::department::DepartmentNormalizer;
use crate::engine::roster::{RosterEntry, RosterIndex};
use crate::engine::rotation::RotationCalculator;
use chrono::NaiveDate;
use std::collections::HashMap;

// ==========================================
// SessionLoad - 会话内占用情况
// ==========================================
#[derive(Debug, Default)]
pub(super) struct SessionLoad {
    /// 日期 → 考官 → 当日担任角色数
    busy: HashMap<NaiveDate, HashMap<String, usize>>,
    /// 考官 → 本次会话担任角色总数
    roles_held: HashMap<String, u32>,
}

impl SessionLoad {
    pub(super) fn build(assignments: &[Assignment], index: &RosterIndex<'_>) -> Self {
        let mut load = Self::default();
        for a in assignments {
            for (_, r) in a.examiners() {
                load.occupy(a.exam_date, index.identity_of(r));
            }
        }
        load
    }

    pub(super) fn occupy(&mut self, date: NaiveDate, identity: &str) {
        *self
            .busy
            .entry(date)
            .or_default()
            .entry(identity.to_string())
            .or_insert(0) += 1;
        *self.roles_held.entry(identity.to_string()).or_insert(0) += 1;
    }

    pub(super) fn release(&mut self, date: NaiveDate, identity: &str) {
        if let Some(day) = self.busy.get_mut(&date) {
            if let Some(count) = day.get_mut(identity) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    day.remove(identity);
                }
            }
        }
        if let Some(held) = self.roles_held.get_mut(identity) {
            *held = held.saturating_sub(1);
        }
    }

    pub(super) fn is_busy(&self, date: NaiveDate, identity: &str) -> bool {
        self.busy
            .get(&date)
            .map(|day| day.contains_key(identity))
            .unwrap_or(false)
    }

    pub(super) fn current_load(&self, entry: &RosterEntry<'_>) -> u32 {
        entry.teacher.workload + self.roles_held.get(entry.identity()).copied().unwrap_or(0)
    }
}

// ==========================================
// SlotContext - 待填角色的科室上下文
// ==========================================
pub(super) struct SlotContext<'c> {
    pub date: NaiveDate,
    pub role: ExaminerRole,
    pub student_department: Option<&'c str>,
    pub examiner1_department: Option<&'c str>,
    pub examiner2_department: Option<&'c str>,
}

impl SlotContext<'_> {
    /// 科室层级: None 表示不合规; 只有考官二区分层级（互通科室靠后）
    fn tier(&self, department: Option<&str>) -> Option<u8> {
        match self.role {
            ExaminerRole::Examiner1 => {
                if !DepartmentNormalizer::is_valid_examiner1_department(
                    self.student_department,
                    department,
                ) || DepartmentNormalizer::same_department(department, self.examiner2_department)
                {
                    return None;
                }
                // 同科室与三七互通同层,按工作量择优
                Some(0)
            }
            ExaminerRole::Examiner2 => {
                let dept = department?;
                if DepartmentNormalizer::same_department(Some(dept), self.student_department)
                    || DepartmentNormalizer::same_department(Some(dept), self.examiner1_department)
                {
                    return None;
                }
                let is_partner = self
                    .student_department
                    .and_then(DepartmentNormalizer::cross_use_partner)
                    == Some(dept);
                Some(if is_partner { 1 } else { 0 })
            }
            ExaminerRole::Backup => Some(0),
        }
    }
}

/// 选出排序键最小的合规候选
pub(super) fn best_candidate<'r, 'a>(
    index: &'r RosterIndex<'a>,
    load: &SessionLoad,
    context: &SlotContext<'_>,
) -> Option<&'r RosterEntry<'a>> {
    index
        .entries()
        .iter()
        .filter(|entry| entry.teacher.is_active)
        .filter(|entry| !load.is_busy(context.date, entry.identity()))
        .filter_map(|entry| {
            let priority =
                RotationCalculator::examiner_priority(entry.teacher.rotation_group, context.date)?;
            let tier = context.tier(entry.department.as_deref())?;
            Some(((tier, load.current_load(entry), priority, entry.index), entry))
        })
        .min_by_key(|(key, _)| *key)
        .map(|(_, entry)| entry)
}
