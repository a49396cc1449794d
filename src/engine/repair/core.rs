// ==========================================
// 考官排班约束核心 - 排班修复引擎
// ==========================================
// 流程:
// 1. 同日重复排班: 涉及安排按编号字典序排列,保留第一场,其余场次该考官角色置为"未分配"
// 2. 同场重复: 同一考官担任多个角色时清空后出现的角色
// 3. 逐轮补充缺失角色 / 替换违规考官,直到某一轮无任何改动
// ==========================================
// 保证: 修复结果再次修复时 fixed_count 为 0
// ==========================================

use crate::config::EngineConfig;
use crate::domain::assignment::{Assignment, ExaminerRef, ExaminerSlot, UNASSIGNED_LABEL};
use crate::domain::conflict::Conflict;
use crate::domain::teacher::Teacher;
use crate::domain::types::{DutyShift, ExaminerRole};
use crate::engine::conflict_detector::ConflictDetector;
use crate::engine::department::DepartmentNormalizer;
use crate::engine::roster::RosterIndex;
use crate::engine::rotation::RotationCalculator;
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, info, instrument, warn};

use super::candidate::{best_candidate, SessionLoad, SlotContext};
use super::report::{RepairFailure, RepairOutcome, RepairReport};

const NO_CANDIDATE_REASON: &str = "无满足约束的候选考官";

// ==========================================
// AssignmentRepairEngine - 排班修复引擎
// ==========================================
// 无状态引擎,只持有配置
#[derive(Debug, Clone)]
pub struct AssignmentRepairEngine {
    config: EngineConfig,
    detector: ConflictDetector,
}

impl Default for AssignmentRepairEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AssignmentRepairEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let detector = ConflictDetector::with_config(&config);
        Self { config, detector }
    }

    // ==========================================
    // 对外接口
    // ==========================================

    /// 修复排班（纯函数,不修改输入）
    ///
    /// # 参数
    /// - `assignments`: 考试安排
    /// - `roster`: 考官花名册
    /// - `conflicts`: 调用方已检测到的时间冲突（可选,与内部检测结果合并）
    ///
    /// # 返回
    /// 修复后的安排副本与修复报告
    pub fn repair(
        &self,
        assignments: &[Assignment],
        roster: &[Teacher],
        conflicts: Option<&[Conflict]>,
    ) -> RepairOutcome {
        let mut repaired = assignments.to_vec();
        let report = self.repair_in_place(&mut repaired, roster, conflicts);
        RepairOutcome {
            assignments: repaired,
            report,
        }
    }

    /// 原地修复排班
    #[instrument(skip_all, fields(assignments = assignments.len(), roster = roster.len()))]
    pub fn repair_in_place(
        &self,
        assignments: &mut [Assignment],
        roster: &[Teacher],
        conflicts: Option<&[Conflict]>,
    ) -> RepairReport {
        let index = RosterIndex::new(roster);
        let before = self.detector.check_with(assignments, &index);
        let issues_before = before.issue_count();
        let mut change_log = Vec::new();

        // 1. 时间冲突（外部提供 + 本次检测）
        let mut all_conflicts: Vec<Conflict> = conflicts.map(<[Conflict]>::to_vec).unwrap_or_default();
        all_conflicts.extend(before.conflicts.iter().cloned());
        clear_time_conflicts(assignments, &all_conflicts, &index, &mut change_log);

        // 2. 同场重复
        clear_duplicate_roles(assignments, &index, &mut change_log);

        // 3. 补充 / 替换,直到某一轮无改动
        // 每次改动都把一个缺失/违规槽位变为合规且不再变回,轮数不超过槽位数 + 1
        let pass_bound = assignments.len() * ExaminerRole::ALL.len() + 1;
        let mut passes = 0;
        let mut failures = Vec::new();
        loop {
            passes += 1;
            let (changes, pass_failures) = self.fill_pass(assignments, &index, &mut change_log);
            failures = pass_failures;
            debug!(pass = passes, changes, failures = failures.len(), "修复轮次完成");
            if changes == 0 {
                break;
            }
            if passes >= pass_bound {
                error!(passes, pass_bound, "修复轮次超过槽位上界,补充/替换未收敛");
                break;
            }
        }

        let after = self.detector.check_with(assignments, &index);
        let remaining_issues = after.issue_count();
        let report = RepairReport {
            change_log,
            fixed_count: issues_before.saturating_sub(remaining_issues),
            remaining_issues,
            success: remaining_issues == 0,
            failures,
            passes,
        };

        info!(
            issues_before,
            fixed = report.fixed_count,
            remaining = report.remaining_issues,
            passes,
            "排班修复完成"
        );
        if !report.failures.is_empty() {
            warn!(failures = report.failures.len(), "部分角色无合规候选考官");
        }
        report
    }

    /// 仅执行时间冲突清理（不需要花名册）
    ///
    /// # 返回
    /// (修复后的安排副本, 变更日志)
    pub fn auto_fix_time_conflicts(
        &self,
        assignments: &[Assignment],
        conflicts: &[Conflict],
    ) -> (Vec<Assignment>, Vec<String>) {
        let roster: [Teacher; 0] = [];
        let index = RosterIndex::new(&roster);
        let mut repaired = assignments.to_vec();
        let mut change_log = Vec::new();
        clear_time_conflicts(&mut repaired, conflicts, &index, &mut change_log);
        (repaired, change_log)
    }

    // ==========================================
    // 补充 / 替换轮次
    // ==========================================

    fn fill_pass(
        &self,
        assignments: &mut [Assignment],
        index: &RosterIndex<'_>,
        change_log: &mut Vec<String>,
    ) -> (usize, Vec<RepairFailure>) {
        let mut load = SessionLoad::build(assignments, index);
        let mut changes = 0;
        let mut failures = Vec::new();

        for assignment in assignments.iter_mut() {
            for role in ExaminerRole::ALL {
                let reason = match assignment.slot(role).assigned() {
                    Some(current) => match invalid_reason(assignment, role, current, index) {
                        Some(reason) => reason,
                        None => continue,
                    },
                    None if self.is_required(role) => "补充缺失考官",
                    None => continue,
                };

                let student_department =
                    DepartmentNormalizer::normalize(assignment.student_department.as_deref());
                let examiner1_department = other_department(assignment, role, ExaminerRole::Examiner1, index);
                let examiner2_department = other_department(assignment, role, ExaminerRole::Examiner2, index);
                let context = SlotContext {
                    date: assignment.exam_date,
                    role,
                    student_department: student_department.as_deref(),
                    examiner1_department: examiner1_department.as_deref(),
                    examiner2_department: examiner2_department.as_deref(),
                };

                let current = assignment.slot(role).assigned().cloned();
                match best_candidate(index, &load, &context) {
                    Some(entry) => {
                        let old_label = current
                            .as_ref()
                            .map(|r| r.name.clone())
                            .unwrap_or_else(|| UNASSIGNED_LABEL.to_string());
                        if let Some(old) = &current {
                            load.release(assignment.exam_date, index.identity_of(old));
                        }
                        load.occupy(assignment.exam_date, entry.identity());
                        *assignment.slot_mut(role) =
                            ExaminerSlot::Assigned(ExaminerRef::from_teacher(entry.teacher));
                        change_log.push(change_line(assignment, role, &old_label, entry.identity(), reason));
                        changes += 1;
                    }
                    None => {
                        debug!(
                            assignment_id = %assignment.id,
                            role = %role,
                            reason,
                            "无合规候选考官,保留当前状态"
                        );
                        failures.push(RepairFailure {
                            assignment_id: assignment.id.clone(),
                            student_name: assignment.student_name.clone(),
                            role,
                            reason: format!("{}: {}", reason, NO_CANDIDATE_REASON),
                            current: current.map(|r| r.name),
                        });
                    }
                }
            }
        }
        (changes, failures)
    }

    fn is_required(&self, role: ExaminerRole) -> bool {
        role != ExaminerRole::Backup || self.config.require_backup_examiner
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 清空时间冲突中非保留场次的该考官角色
fn clear_time_conflicts(
    assignments: &mut [Assignment],
    conflicts: &[Conflict],
    index: &RosterIndex<'_>,
    change_log: &mut Vec<String>,
) {
    let mut positions: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, a) in assignments.iter().enumerate() {
        positions.entry(a.id.as_str()).or_default().push(i);
    }
    let positions: HashMap<String, Vec<usize>> = positions
        .into_iter()
        .map(|(id, list)| (id.to_string(), list))
        .collect();

    for conflict in conflicts {
        let mut ids: Vec<&String> = conflict.affected_assignment_ids.iter().collect();
        ids.sort();
        ids.dedup();
        let Some((kept, others)) = ids.split_first() else {
            continue;
        };

        for id in others {
            for &i in positions.get(id.as_str()).into_iter().flatten() {
                let assignment = &mut assignments[i];
                if assignment.exam_date != conflict.date {
                    continue;
                }
                let roles: Vec<ExaminerRole> = assignment
                    .examiners()
                    .filter(|(_, r)| {
                        index.identity_of(r) == conflict.examiner_identity
                            || r.identity() == conflict.examiner_identity
                    })
                    .map(|(role, _)| role)
                    .collect();
                for role in roles {
                    let reason = format!("{} 同日重复排班,保留 {}", conflict.date, kept);
                    change_log.push(change_line(
                        assignment,
                        role,
                        &conflict.examiner_identity,
                        UNASSIGNED_LABEL,
                        &reason,
                    ));
                    *assignment.slot_mut(role) = ExaminerSlot::Unassigned;
                }
            }
        }
    }
}

/// 同一考官在一场考试中担任多个角色时,清空后出现的角色
fn clear_duplicate_roles(
    assignments: &mut [Assignment],
    index: &RosterIndex<'_>,
    change_log: &mut Vec<String>,
) {
    for assignment in assignments.iter_mut() {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for (role, r) in assignment.examiners() {
            if !seen.insert(index.identity_of(r).to_string()) {
                duplicates.push((role, r.name.clone()));
            }
        }
        for (role, name) in duplicates {
            change_log.push(change_line(assignment, role, &name, UNASSIGNED_LABEL, "同场重复担任"));
            *assignment.slot_mut(role) = ExaminerSlot::Unassigned;
        }
    }
}

/// 已填写考官的违规原因（与冲突检测规则一致）
fn invalid_reason(
    assignment: &Assignment,
    role: ExaminerRole,
    examiner: &ExaminerRef,
    index: &RosterIndex<'_>,
) -> Option<&'static str> {
    let group = index.rotation_group_of(examiner);
    if RotationCalculator::duty_of(group, assignment.exam_date) == DutyShift::DayShift {
        return Some("当日白班");
    }

    let student = DepartmentNormalizer::normalize(assignment.student_department.as_deref());
    let dept = index.department_of(examiner);
    match role {
        ExaminerRole::Examiner1
            if !DepartmentNormalizer::is_valid_examiner1_department(
                student.as_deref(),
                dept.as_deref(),
            ) =>
        {
            Some("考官一科室不符")
        }
        ExaminerRole::Examiner2
            if !DepartmentNormalizer::is_valid_examiner2_department(
                student.as_deref(),
                dept.as_deref(),
            ) =>
        {
            Some("考官二与考生同科室")
        }
        ExaminerRole::Examiner2 => {
            let examiner1 = assignment
                .examiner1
                .assigned()
                .and_then(|r| index.department_of(r));
            if DepartmentNormalizer::same_department(dept.as_deref(), examiner1.as_deref()) {
                Some("两名考官同科室")
            } else {
                None
            }
        }
        _ => None,
    }
}

/// 另一考官角色的标准化科室（当前角色自身不计入）
fn other_department(
    assignment: &Assignment,
    current: ExaminerRole,
    other: ExaminerRole,
    index: &RosterIndex<'_>,
) -> Option<String> {
    if current == other {
        return None;
    }
    assignment.slot(other).assigned().and_then(|r| index.department_of(r))
}

fn change_line(assignment: &Assignment, role: ExaminerRole, from: &str, to: &str, reason: &str) -> String {
    format!(
        "考生 {}({}) {}: {} → {}（{}）",
        assignment.student_name, assignment.id, role, from, to, reason
    )
}
