// ==========================================
// 记录边界 集成测试
// ==========================================
// 测试目标: 上游别名字段 → 规范记录 → 检测/修复 → 导出 JSON
// ==========================================

use exam_scheduler_core::domain::{parse_assignments, parse_roster, parse_roster_csv};
use exam_scheduler_core::engine::{AssignmentRepairEngine, ConflictDetector};
use exam_scheduler_core::EngineError;
use serde_json::json;
use std::io::Write;

#[test]
fn test_aliased_payload_flows_through_detection() {
    let assignments = parse_assignments(&json!([
        {"编号": "A1", "考生": "王五", "科室": "区域一室", "考试日期": "2025-09-10", "考官1": "张三"},
        {"id": "A2", "student": "赵六", "department": "1", "date": "2025/09/10", "examiner1": {"name": "张三"}}
    ]))
    .unwrap();
    let roster = parse_roster(&json!([
        {"工号": "T1", "姓名": "张三", "科室": "一室", "班组": "一组"}
    ]))
    .unwrap();

    let report = ConflictDetector::new().check_all(&assignments, &roster);
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].affected_assignment_ids, vec!["A1", "A2"]);
}

#[test]
fn test_repaired_assignments_export_unassigned_label() {
    let assignments = parse_assignments(&json!([
        {"id": "A1", "studentName": "王五", "studentDepartment": "一室", "examDate": "2025-09-10", "examiner1": "张三"},
        {"id": "A2", "studentName": "赵六", "studentDepartment": "一室", "examDate": "2025-09-10", "examiner1": "张三"}
    ]))
    .unwrap();
    let conflicts = ConflictDetector::new().detect_time_conflicts(&assignments);
    let (fixed, _) = AssignmentRepairEngine::new().auto_fix_time_conflicts(&assignments, &conflicts);

    let exported = serde_json::to_value(&fixed).unwrap();
    assert_eq!(exported[0]["examiner1"]["name"], "张三");
    assert_eq!(exported[1]["examiner1"], "未分配");

    // 导出结果可以重新读入
    let reparsed = parse_assignments(&exported).unwrap();
    assert_eq!(reparsed, fixed);
}

#[test]
fn test_csv_roster_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "id,name,department,rotationGroup,workload,isActive").unwrap();
    writeln!(file, "T1,张三,三室,2,1,true").unwrap();
    writeln!(file, "T2,李四,七室,行政班,0,false").unwrap();

    let roster = parse_roster_csv(std::fs::File::open(file.path()).unwrap()).unwrap();
    assert_eq!(roster.len(), 2);
    assert!(!roster[1].is_active);
}

#[test]
fn test_malformed_record_reports_index() {
    let err = parse_roster(&json!([{"name": "张三"}, {"department": "一室"}])).unwrap_err();
    assert!(matches!(err, EngineError::InvalidRecord { index: 1, .. }));
}
