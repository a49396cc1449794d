// ==========================================
// 考官排班约束核心 - 冲突检测引擎
// ==========================================
// 检查项:
// 1. 时间冲突: 同一考官同日出现在多场考试（任意角色）
// 2. 科室规则: 考官一同科室（三七互通）/ 考官二不同科室 / 两考官不同科室
// 3. 同场重复: 同一考官在一场考试中担任多个角色
// 4. 白班排除: 当日白班班组的考官
// 5. 缺失考官: 考官一/二未分配（三考官制下含备份考官）
// ==========================================
// 红线: 违规是发现,以数据返回,从不报错
// ==========================================

use crate::config::EngineConfig;
use crate::domain::assignment::Assignment;
use crate::domain::conflict::{Conflict, ConflictInvolvement, Violation};
use crate::domain::teacher::Teacher;
use crate::domain::types::{DutyShift, ExaminerRole, Severity, ViolationType};
use crate::engine::department::DepartmentNormalizer;
use crate::engine::roster::RosterIndex;
use crate::engine::rotation::RotationCalculator;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info, instrument};

// ==========================================
// DetectionReport - 检测结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub conflicts: Vec<Conflict>,
    pub violations: Vec<Violation>,
    pub has_conflicts: bool,
    pub summary: String,
}

impl DetectionReport {
    fn new(conflicts: Vec<Conflict>, violations: Vec<Violation>) -> Self {
        let summary = ConflictDetector::format_summary(&conflicts, &violations);
        Self {
            has_conflicts: !conflicts.is_empty() || !violations.is_empty(),
            conflicts,
            violations,
            summary,
        }
    }

    /// 问题数: 每处时间冲突计 (涉及安排数 - 1),每条违规计 1
    pub fn issue_count(&self) -> usize {
        let time: usize = self
            .conflicts
            .iter()
            .map(|c| c.affected_assignment_ids.len().saturating_sub(1))
            .sum();
        time + self.violations.len()
    }

    /// 导出层使用: 某场考试的全部违规（含时间冲突转成的字段标注）
    pub fn annotations_for(&self, assignment_id: &str) -> Vec<Violation> {
        let mut annotations: Vec<Violation> = self
            .violations
            .iter()
            .filter(|v| v.assignment_id == assignment_id)
            .cloned()
            .collect();

        for conflict in &self.conflicts {
            for inv in conflict
                .involvements
                .iter()
                .filter(|inv| inv.assignment_id == assignment_id)
            {
                annotations.push(Violation::new(
                    ViolationType::TimeConflict,
                    &inv.assignment_id,
                    &inv.student_name,
                    conflict.date,
                    inv.role,
                    Some(&conflict.examiner_identity),
                    format!("考官 {} 在 {} 已被安排多场考试", conflict.examiner_identity, conflict.date),
                ));
            }
        }
        annotations
    }
}

// ==========================================
// ConflictDetector - 冲突检测引擎
// ==========================================
// 无状态引擎,只持有配置
#[derive(Debug, Clone)]
pub struct ConflictDetector {
    require_backup_examiner: bool,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ConflictDetector {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            require_backup_examiner: config.require_backup_examiner,
        }
    }

    // ==========================================
    // 时间冲突
    // ==========================================

    /// 检测同日重复排班
    ///
    /// 按考试日期分组,统计每个考官出现的安排集合,集合大小 > 1 即为冲突
    #[instrument(skip(self, assignments), fields(assignments = assignments.len()))]
    pub fn detect_time_conflicts(&self, assignments: &[Assignment]) -> Vec<Conflict> {
        self.time_conflicts_with(assignments, None)
    }

    pub(crate) fn time_conflicts_with(
        &self,
        assignments: &[Assignment],
        index: Option<&RosterIndex<'_>>,
    ) -> Vec<Conflict> {
        // date → identity → involvements
        let mut by_date: BTreeMap<NaiveDate, BTreeMap<String, Vec<ConflictInvolvement>>> =
            BTreeMap::new();

        for assignment in assignments {
            let day = by_date.entry(assignment.exam_date).or_default();
            for (role, examiner) in assignment.examiners() {
                let identity = match index {
                    Some(index) => index.identity_of(examiner),
                    None => examiner.identity(),
                };
                day.entry(identity.to_string())
                    .or_default()
                    .push(ConflictInvolvement {
                        assignment_id: assignment.id.clone(),
                        student_name: assignment.student_name.clone(),
                        role,
                    });
            }
        }

        let mut conflicts = Vec::new();
        for (date, examiners) in by_date {
            for (identity, mut involvements) in examiners {
                let ids: BTreeSet<&str> = involvements
                    .iter()
                    .map(|inv| inv.assignment_id.as_str())
                    .collect();
                if ids.len() < 2 {
                    continue;
                }
                let affected_assignment_ids: Vec<String> =
                    ids.into_iter().map(str::to_string).collect();
                involvements.sort();
                let roles = involvements.iter().map(|inv| inv.role).collect();

                debug!(
                    date = %date,
                    examiner = %identity,
                    count = affected_assignment_ids.len(),
                    "检测到时间冲突"
                );
                conflicts.push(Conflict {
                    date,
                    examiner_identity: identity,
                    roles,
                    affected_assignment_ids,
                    involvements,
                });
            }
        }
        conflicts
    }

    // ==========================================
    // 科室规则
    // ==========================================

    /// 检测科室规则违规
    pub fn detect_department_conflicts(
        &self,
        assignments: &[Assignment],
        roster: &[Teacher],
    ) -> Vec<Violation> {
        let index = RosterIndex::new(roster);
        self.department_violations_with(assignments, &index)
    }

    pub(crate) fn department_violations_with(
        &self,
        assignments: &[Assignment],
        index: &RosterIndex<'_>,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();

        for a in assignments {
            let d = DepartmentNormalizer::normalize(a.student_department.as_deref());
            let e1 = a.examiner1.assigned().map(|r| (r, index.department_of(r)));
            let e2 = a.examiner2.assigned().map(|r| (r, index.department_of(r)));

            if let Some((r, dept)) = &e1 {
                if !DepartmentNormalizer::is_valid_examiner1_department(d.as_deref(), dept.as_deref())
                {
                    violations.push(Violation::new(
                        ViolationType::DepartmentMismatchExaminer1,
                        &a.id,
                        &a.student_name,
                        a.exam_date,
                        ExaminerRole::Examiner1,
                        Some(&r.name),
                        format!(
                            "考官一 {}（{}）须与考生科室（{}）相同或三七互通",
                            r.name,
                            dept_label(dept.as_deref()),
                            dept_label(d.as_deref())
                        ),
                    ));
                }
            }

            if let Some((r, dept)) = &e2 {
                if !DepartmentNormalizer::is_valid_examiner2_department(d.as_deref(), dept.as_deref())
                {
                    violations.push(Violation::new(
                        ViolationType::DepartmentMismatchExaminer2,
                        &a.id,
                        &a.student_name,
                        a.exam_date,
                        ExaminerRole::Examiner2,
                        Some(&r.name),
                        format!(
                            "考官二 {}（{}）不能与考生同科室",
                            r.name,
                            dept_label(dept.as_deref())
                        ),
                    ));
                }
            }

            if let (Some((r1, dept1)), Some((r2, dept2))) = (&e1, &e2) {
                if DepartmentNormalizer::same_department(dept1.as_deref(), dept2.as_deref()) {
                    let message = format!(
                        "考官一 {} 与考官二 {} 同属 {},两名考官须来自不同科室",
                        r1.name,
                        r2.name,
                        dept_label(dept1.as_deref())
                    );
                    for (role, r) in [(ExaminerRole::Examiner1, r1), (ExaminerRole::Examiner2, r2)] {
                        violations.push(Violation::new(
                            ViolationType::SameDepartmentPair,
                            &a.id,
                            &a.student_name,
                            a.exam_date,
                            role,
                            Some(&r.name),
                            message.clone(),
                        ));
                    }
                }
            }
        }
        violations
    }

    // ==========================================
    // 同场重复 / 白班 / 缺失
    // ==========================================

    /// 同一考官在一场考试中担任多个角色（标注在后出现的角色上）
    pub fn detect_duplicate_examiners(&self, assignments: &[Assignment]) -> Vec<Violation> {
        let roster: [Teacher; 0] = [];
        self.duplicate_violations_with(assignments, &RosterIndex::new(&roster))
    }

    pub(crate) fn duplicate_violations_with(
        &self,
        assignments: &[Assignment],
        index: &RosterIndex<'_>,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();
        for a in assignments {
            let mut seen: HashMap<&str, ExaminerRole> = HashMap::new();
            for (role, r) in a.examiners() {
                let identity = index.identity_of(r);
                if let Some(first) = seen.get(identity) {
                    violations.push(Violation::new(
                        ViolationType::DuplicateExaminer,
                        &a.id,
                        &a.student_name,
                        a.exam_date,
                        role,
                        Some(&r.name),
                        format!("考官 {} 已担任{},不能同时担任{}", r.name, first, role),
                    ));
                } else {
                    seen.insert(identity, role);
                }
            }
        }
        violations
    }

    /// 当日白班的考官
    pub fn detect_day_shift_examiners(
        &self,
        assignments: &[Assignment],
        roster: &[Teacher],
    ) -> Vec<Violation> {
        let index = RosterIndex::new(roster);
        self.day_shift_violations_with(assignments, &index)
    }

    pub(crate) fn day_shift_violations_with(
        &self,
        assignments: &[Assignment],
        index: &RosterIndex<'_>,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();
        for a in assignments {
            for (role, r) in a.examiners() {
                let group = index.rotation_group_of(r);
                if RotationCalculator::duty_of(group, a.exam_date) == DutyShift::DayShift {
                    violations.push(Violation::new(
                        ViolationType::DayShiftExaminer,
                        &a.id,
                        &a.student_name,
                        a.exam_date,
                        role,
                        Some(&r.name),
                        format!("考官 {}（{}）在 {} 为白班,不能参加考试", r.name, group, a.exam_date),
                    ));
                }
            }
        }
        violations
    }

    /// 未分配的考官角色
    pub fn detect_missing_examiners(&self, assignments: &[Assignment]) -> Vec<Violation> {
        let mut violations = Vec::new();
        for a in assignments {
            for role in self.required_roles() {
                if !a.slot(role).is_filled() {
                    violations.push(Violation::new(
                        ViolationType::MissingExaminer,
                        &a.id,
                        &a.student_name,
                        a.exam_date,
                        role,
                        None,
                        format!("{} 未分配", role),
                    ));
                }
            }
        }
        violations
    }

    /// 必须填写的角色
    pub fn required_roles(&self) -> Vec<ExaminerRole> {
        if self.require_backup_examiner {
            ExaminerRole::ALL.to_vec()
        } else {
            vec![ExaminerRole::Examiner1, ExaminerRole::Examiner2]
        }
    }

    // ==========================================
    // 汇总
    // ==========================================

    /// 执行全部检查
    #[instrument(skip(self, assignments, roster), fields(assignments = assignments.len(), roster = roster.len()))]
    pub fn check_all(&self, assignments: &[Assignment], roster: &[Teacher]) -> DetectionReport {
        let index = RosterIndex::new(roster);
        let report = self.check_with(assignments, &index);
        info!(
            conflicts = report.conflicts.len(),
            violations = report.violations.len(),
            "冲突检测完成"
        );
        report
    }

    pub(crate) fn check_with(
        &self,
        assignments: &[Assignment],
        index: &RosterIndex<'_>,
    ) -> DetectionReport {
        let conflicts = self.time_conflicts_with(assignments, Some(index));

        let mut violations = self.detect_missing_examiners(assignments);
        violations.extend(self.department_violations_with(assignments, index));
        violations.extend(self.duplicate_violations_with(assignments, index));
        violations.extend(self.day_shift_violations_with(assignments, index));

        // 按输入顺序 → 角色 → 类型 排列,保证输出稳定
        let order: HashMap<&str, usize> = assignments
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id.as_str(), i))
            .collect();
        violations.sort_by_key(|v| {
            (
                order.get(v.assignment_id.as_str()).copied().unwrap_or(usize::MAX),
                v.role,
                v.violation_type,
            )
        });

        DetectionReport::new(conflicts, violations)
    }

    /// 生成可读摘要
    pub fn format_summary(conflicts: &[Conflict], violations: &[Violation]) -> String {
        if conflicts.is_empty() && violations.is_empty() {
            return "未检测到冲突".to_string();
        }

        let errors = violations.iter().filter(|v| v.severity == Severity::Error).count();
        let mut lines = vec![format!(
            "冲突检测结果: 时间冲突 {} 处, 规则违规 {} 条（错误 {} / 提示 {}）",
            conflicts.len(),
            violations.len(),
            errors,
            violations.len() - errors
        )];

        if !conflicts.is_empty() {
            lines.push("[时间冲突]".to_string());
            lines.extend(conflicts.iter().map(|c| format!("  - {}", c.describe())));
        }
        if !violations.is_empty() {
            lines.push("[规则违规]".to_string());
            lines.extend(violations.iter().map(|v| {
                format!(
                    "  - [{}] {} {}({}) {}: {}",
                    v.severity, v.violation_type, v.student_name, v.assignment_id, v.role, v.message
                )
            }));
        }
        lines.join("\n")
    }
}

fn dept_label(dept: Option<&str>) -> &str {
    dept.unwrap_or("未知科室")
}
