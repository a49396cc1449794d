use super::*;
use crate::config::EngineConfig;
use crate::domain::assignment::{Assignment, ExaminerSlot};
use crate::domain::teacher::Teacher;
use crate::domain::types::{ExaminerRole, RotationGroup};
use crate::engine::conflict_detector::ConflictDetector;
use chrono::NaiveDate;

// ==========================================
// 测试辅助函数
// ==========================================

/// 2025-09-10: 白班=四组, 晚班=三组, 休息=一组/二组
fn exam_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 10).unwrap()
}

fn create_test_roster() -> Vec<Teacher> {
    vec![
        Teacher::new("T1", "张三", "一室", RotationGroup::One),
        Teacher::new("T2", "李四", "一室", RotationGroup::Three).with_workload(5),
        Teacher::new("T3", "王五", "二室", RotationGroup::None),
        Teacher::new("T4", "赵六", "二室", RotationGroup::Four),
        Teacher::new("T5", "钱七", "三室", RotationGroup::Two),
        Teacher::new("T6", "孙八", "五室", RotationGroup::None),
        Teacher::new("T7", "周九", "四室", RotationGroup::None).with_workload(2),
    ]
}

fn create_double_booked_assignments() -> Vec<Assignment> {
    vec![
        Assignment::new("A2", "乙", "一室", exam_day())
            .with_examiner(ExaminerRole::Examiner1, "张三")
            .with_examiner(ExaminerRole::Examiner2, "孙八"),
        Assignment::new("A1", "甲", "一室", exam_day())
            .with_examiner(ExaminerRole::Examiner1, "张三")
            .with_examiner(ExaminerRole::Examiner2, "王五")
            .with_examiner(ExaminerRole::Backup, "钱七"),
    ]
}

fn name_of(a: &Assignment, role: ExaminerRole) -> &str {
    a.slot(role).display_name()
}

// ==========================================
// 时间冲突清理
// ==========================================

#[test]
fn test_auto_fix_clears_later_assignment_only() {
    let assignments = create_double_booked_assignments();
    let conflicts = ConflictDetector::new().detect_time_conflicts(&assignments);
    assert_eq!(conflicts.len(), 1);

    let engine = AssignmentRepairEngine::new();
    let (fixed, log) = engine.auto_fix_time_conflicts(&assignments, &conflicts);

    assert_eq!(fixed[0].id, "A2");
    assert_eq!(fixed[0].examiner1, ExaminerSlot::Unassigned);
    assert_eq!(name_of(&fixed[1], ExaminerRole::Examiner1), "张三");
    assert_eq!(log.len(), 1);
    assert!(log[0].contains("张三 → 未分配"));
    assert!(log[0].contains("保留 A1"));
}

#[test]
fn test_stale_conflict_on_other_date_is_ignored() {
    let assignments = create_double_booked_assignments();
    let mut conflicts = ConflictDetector::new().detect_time_conflicts(&assignments);
    conflicts[0].date = exam_day().succ_opt().unwrap();

    let (fixed, log) = AssignmentRepairEngine::new().auto_fix_time_conflicts(&assignments, &conflicts);
    assert_eq!(fixed, assignments);
    assert!(log.is_empty());
}

// ==========================================
// 完整修复
// ==========================================

#[test]
fn test_repair_refills_cleared_roles() {
    let roster = create_test_roster();
    let assignments = create_double_booked_assignments();

    let outcome = AssignmentRepairEngine::new().repair(&assignments, &roster, None);
    let a2 = &outcome.assignments[0];

    // 张三已在 A1,考官一改由同科室的李四担任
    assert_eq!(name_of(a2, ExaminerRole::Examiner1), "李四");
    // 备份考官: 赵六当日白班,周九为唯一空闲人选
    assert_eq!(name_of(a2, ExaminerRole::Backup), "周九");
    assert_eq!(name_of(&outcome.assignments[1], ExaminerRole::Examiner1), "张三");

    let report = &outcome.report;
    assert!(report.success);
    assert_eq!(report.remaining_issues, 0);
    assert_eq!(report.fixed_count, 2);
    assert!(report.failures.is_empty());
    assert_eq!(report.change_log.len(), 3);
}

#[test]
fn test_repair_is_pure() {
    let roster = create_test_roster();
    let assignments = create_double_booked_assignments();
    let snapshot = assignments.clone();

    let _ = AssignmentRepairEngine::new().repair(&assignments, &roster, None);
    assert_eq!(assignments, snapshot);
}

#[test]
fn test_repair_is_idempotent() {
    let roster = create_test_roster();
    let engine = AssignmentRepairEngine::new();

    let first = engine.repair(&create_double_booked_assignments(), &roster, None);
    let second = engine.repair(&first.assignments, &roster, None);

    assert_eq!(second.report.fixed_count, 0);
    assert!(second.report.change_log.is_empty());
    assert_eq!(second.assignments, first.assignments);
}

#[test]
fn test_in_place_variant_mutates_input() {
    let roster = create_test_roster();
    let mut assignments = create_double_booked_assignments();

    let report = AssignmentRepairEngine::new().repair_in_place(&mut assignments, &roster, None);
    assert!(report.summary().success);
    assert_eq!(name_of(&assignments[0], ExaminerRole::Examiner1), "李四");
}

// ==========================================
// 候选排序
// ==========================================

#[test]
fn test_examiner2_prefers_lowest_workload() {
    let roster = vec![
        Teacher::new("T1", "张三", "一室", RotationGroup::None),
        Teacher::new("T2", "王五", "二室", RotationGroup::None).with_workload(3),
        Teacher::new("T3", "孙八", "五室", RotationGroup::None).with_workload(1),
    ];
    let assignments = vec![Assignment::new("A1", "甲", "一室", exam_day())
        .with_examiner(ExaminerRole::Examiner1, "张三")];
    let config = EngineConfig {
        require_backup_examiner: false,
        ..EngineConfig::default()
    };

    let outcome = AssignmentRepairEngine::with_config(config).repair(&assignments, &roster, None);
    assert_eq!(name_of(&outcome.assignments[0], ExaminerRole::Examiner2), "孙八");
    assert!(outcome.report.success);
}

#[test]
fn test_examiner2_avoids_cross_use_partner_when_possible() {
    let roster = vec![
        Teacher::new("T1", "张三", "三室", RotationGroup::None),
        Teacher::new("T2", "李四", "七室", RotationGroup::None),
        Teacher::new("T3", "孙八", "五室", RotationGroup::None).with_workload(9),
    ];
    let assignments = vec![Assignment::new("A1", "甲", "三室", exam_day())
        .with_examiner(ExaminerRole::Examiner1, "张三")];
    let config = EngineConfig {
        require_backup_examiner: false,
        ..EngineConfig::default()
    };

    let outcome = AssignmentRepairEngine::with_config(config).repair(&assignments, &roster, None);
    assert_eq!(name_of(&outcome.assignments[0], ExaminerRole::Examiner2), "孙八");
}

#[test]
fn test_night_shift_breaks_workload_tie() {
    // 2025-09-10: 三组晚班, 一组休息
    let roster = vec![
        Teacher::new("T1", "张三", "一室", RotationGroup::One),
        Teacher::new("T2", "李四", "一室", RotationGroup::Three),
    ];
    let assignments = vec![Assignment::new("A1", "甲", "一室", exam_day())];
    let config = EngineConfig {
        require_backup_examiner: false,
        ..EngineConfig::default()
    };

    let outcome = AssignmentRepairEngine::with_config(config).repair(&assignments, &roster, None);
    assert_eq!(name_of(&outcome.assignments[0], ExaminerRole::Examiner1), "李四");
}

#[test]
fn test_examiner1_cross_use_partner_competes_on_workload() {
    let roster = vec![
        Teacher::new("T1", "三甲", "三室", RotationGroup::None).with_workload(10),
        Teacher::new("T2", "七乙", "七室", RotationGroup::None),
        Teacher::new("T3", "五丙", "五室", RotationGroup::None),
    ];
    let assignments = vec![Assignment::new("A1", "甲", "三室", exam_day())];
    let config = EngineConfig {
        require_backup_examiner: false,
        ..EngineConfig::default()
    };

    let outcome = AssignmentRepairEngine::with_config(config).repair(&assignments, &roster, None);
    assert_eq!(name_of(&outcome.assignments[0], ExaminerRole::Examiner1), "七乙");
    assert_eq!(name_of(&outcome.assignments[0], ExaminerRole::Examiner2), "五丙");
    assert!(outcome.report.success);
}

#[test]
fn test_inactive_and_day_shift_teachers_are_never_chosen() {
    let roster = vec![
        Teacher::new("T1", "张三", "一室", RotationGroup::None).inactive(),
        Teacher::new("T2", "李四", "一室", RotationGroup::Four),
        Teacher::new("T3", "王五", "一室", RotationGroup::None).with_workload(20),
    ];
    let assignments = vec![Assignment::new("A1", "甲", "一室", exam_day())];

    let outcome = AssignmentRepairEngine::new().repair(&assignments, &roster, None);
    assert_eq!(name_of(&outcome.assignments[0], ExaminerRole::Examiner1), "王五");
}

#[test]
fn test_day_shift_examiner_is_replaced() {
    let roster = vec![
        Teacher::new("T1", "赵六", "一室", RotationGroup::Four),
        Teacher::new("T2", "李四", "一室", RotationGroup::None),
        Teacher::new("T3", "王五", "二室", RotationGroup::None),
    ];
    let assignments = vec![Assignment::new("A1", "甲", "一室", exam_day())
        .with_examiner(ExaminerRole::Examiner1, "赵六")
        .with_examiner(ExaminerRole::Examiner2, "王五")];
    let config = EngineConfig {
        require_backup_examiner: false,
        ..EngineConfig::default()
    };

    let outcome = AssignmentRepairEngine::with_config(config).repair(&assignments, &roster, None);
    assert_eq!(name_of(&outcome.assignments[0], ExaminerRole::Examiner1), "李四");
    assert!(outcome.report.change_log[0].contains("当日白班"));
}

// ==========================================
// 失败场景
// ==========================================

#[test]
fn test_no_candidate_keeps_invalid_examiner_and_reports_failure() {
    let roster = vec![
        Teacher::new("T1", "王五", "二室", RotationGroup::None),
        Teacher::new("T2", "孙八", "五室", RotationGroup::None),
    ];
    let assignments = vec![Assignment::new("A1", "甲", "一室", exam_day())
        .with_examiner(ExaminerRole::Examiner1, "王五")
        .with_examiner(ExaminerRole::Examiner2, "孙八")];
    let config = EngineConfig {
        require_backup_examiner: false,
        ..EngineConfig::default()
    };

    let outcome = AssignmentRepairEngine::with_config(config).repair(&assignments, &roster, None);
    assert_eq!(outcome.assignments, assignments);

    let report = &outcome.report;
    assert!(!report.success);
    assert_eq!(report.remaining_issues, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].role, ExaminerRole::Examiner1);
    assert_eq!(report.failures[0].current.as_deref(), Some("王五"));
    assert_eq!(report.passes, 1);
}

#[test]
fn test_duplicate_role_in_one_assignment_is_cleared_and_refilled() {
    let roster = vec![
        Teacher::new("T1", "张三", "一室", RotationGroup::None),
        Teacher::new("T2", "王五", "二室", RotationGroup::None),
        Teacher::new("T3", "孙八", "五室", RotationGroup::None),
    ];
    let assignments = vec![Assignment::new("A1", "甲", "一室", exam_day())
        .with_examiner(ExaminerRole::Examiner1, "张三")
        .with_examiner(ExaminerRole::Examiner2, "王五")
        .with_examiner(ExaminerRole::Backup, "张三")];

    let outcome = AssignmentRepairEngine::new().repair(&assignments, &roster, None);
    assert_eq!(name_of(&outcome.assignments[0], ExaminerRole::Backup), "孙八");
    assert!(outcome.report.change_log[0].contains("同场重复担任"));
    assert!(outcome.report.success);
}

// ==========================================
// 收敛性
// ==========================================

/// 链式依赖: 第 i 场的考官一占用着第 i-1 场唯一合规的候选人,
/// 每轮只能释放一名考官,需要逐轮向前推进
fn create_chained_assignments(links: usize) -> (Vec<Teacher>, Vec<Assignment>) {
    let roster: Vec<Teacher> = (0..=links)
        .map(|i| {
            Teacher::new(
                &format!("T{:02}", i),
                &format!("考官{:02}", i),
                &format!("部门{:02}", i),
                RotationGroup::None,
            )
        })
        .collect();
    let assignments = (1..=links)
        .map(|i| {
            Assignment::new(
                &format!("A{:02}", i),
                &format!("考生{:02}", i),
                &format!("部门{:02}", i),
                exam_day(),
            )
            .with_examiner(ExaminerRole::Examiner1, &format!("考官{:02}", i - 1))
            .with_examiner(ExaminerRole::Examiner2, &format!("外聘{:02}", i))
        })
        .collect();
    (roster, assignments)
}

#[test]
fn test_long_dependency_chain_converges_in_one_call() {
    let (roster, assignments) = create_chained_assignments(12);
    let config = EngineConfig {
        require_backup_examiner: false,
        ..EngineConfig::default()
    };
    let engine = AssignmentRepairEngine::with_config(config);

    let first = engine.repair(&assignments, &roster, None);
    assert!(first.report.success);
    assert_eq!(first.report.fixed_count, 12);
    assert_eq!(first.report.remaining_issues, 0);
    // 12 轮各推进一环,最后一轮确认无改动
    assert_eq!(first.report.passes, 13);
    for (i, a) in first.assignments.iter().enumerate() {
        assert_eq!(name_of(a, ExaminerRole::Examiner1), format!("考官{:02}", i + 1));
    }

    let second = engine.repair(&first.assignments, &roster, None);
    assert_eq!(second.report.fixed_count, 0);
    assert!(second.report.change_log.is_empty());
    assert_eq!(second.assignments, first.assignments);
}
