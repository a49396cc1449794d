// ==========================================
// 考官排班约束核心 - 记录边界（别名解析）
// ==========================================
// 职责: 上游记录字段命名不统一（examiner1 / 考官一 / 考官1 ...）,
//       在此一次性解析为规范类型,后续模块不再处理别名
// 红线: 输入形状错误（非数组/非对象/日期无法解析）属于契约错误,返回 EngineError
// ==========================================

use crate::domain::assignment::{Assignment, ExaminerRef, ExaminerSlot};
use crate::domain::teacher::{Student, Teacher};
use crate::domain::types::RotationGroup;
use crate::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

// ==========================================
// 字段别名表
// ==========================================

const ASSIGNMENT_ID_KEYS: &[&str] = &["id", "ID", "assignmentId", "编号", "序号"];
const STUDENT_NAME_KEYS: &[&str] = &[
    "studentName",
    "student_name",
    "student",
    "考生",
    "考生姓名",
    "学员",
    "学员姓名",
];
const STUDENT_DEPT_KEYS: &[&str] = &[
    "studentDepartment",
    "student_department",
    "department",
    "考生科室",
    "学员科室",
    "科室",
];
const EXAM_DATE_KEYS: &[&str] = &["examDate", "exam_date", "date", "考试日期", "日期"];
const EXAMINER1_KEYS: &[&str] = &["examiner1", "examiner_1", "考官一", "考官1"];
const EXAMINER2_KEYS: &[&str] = &["examiner2", "examiner_2", "考官二", "考官2"];
const BACKUP_KEYS: &[&str] = &["backupExaminer", "backup_examiner", "backup", "备份考官", "备份"];

const TEACHER_ID_KEYS: &[&str] = &["id", "ID", "teacherId", "工号", "编号"];
const TEACHER_NAME_KEYS: &[&str] = &["name", "teacherName", "姓名", "考官"];
const TEACHER_DEPT_KEYS: &[&str] = &["department", "dept", "科室", "部门"];
const TEACHER_GROUP_KEYS: &[&str] = &["rotationGroup", "rotation_group", "group", "班组", "组别"];
const TEACHER_WORKLOAD_KEYS: &[&str] = &["workload", "dutyCount", "工作量", "值班次数"];
const TEACHER_ACTIVE_KEYS: &[&str] = &["isActive", "is_active", "active", "在岗", "是否在岗"];

const STUDENT_ID_KEYS: &[&str] = &["id", "ID", "studentId", "学号", "编号"];
const STUDENT_OWN_NAME_KEYS: &[&str] = &["name", "studentName", "姓名", "考生", "学员"];

/// 上游表示"未分配"的字面量
const UNASSIGNED_SENTINELS: &[&str] = &["未分配", "unassigned"];

/// 确定性 ID 命名空间
const ASSIGNMENT_NAMESPACE: Uuid = Uuid::NAMESPACE_OID;

// ==========================================
// 基础取值工具
// ==========================================

fn pick<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !is_blank(v))
}

/// null 与空白字符串都视为缺失（CSV 空单元格即空白字符串）
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    pick(obj, keys).and_then(as_text)
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, String> {
    value
        .as_object()
        .ok_or_else(|| format!("{}记录必须是对象,实际为 {}", what, type_name(value)))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 解析日期（支持 YYYY-MM-DD / YYYY/MM/DD / YYYY.MM.DD / YYYYMMDD / 带时间的 ISO 串）
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    let date_part = if s.len() > 10 && s.is_char_boundary(10) {
        &s[..10]
    } else {
        s
    };
    ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|v| v != 0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "y" | "是" | "在岗" => Some(true),
            "false" | "0" | "no" | "n" | "否" | "离岗" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn parse_workload(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .map(|v| v.min(u32::MAX as u64) as u32),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

// ==========================================
// 考官槽位
// ==========================================

fn parse_slot(value: Option<&Value>, field: &str) -> Result<ExaminerSlot, String> {
    let Some(value) = value else {
        return Ok(ExaminerSlot::Absent);
    };
    match value {
        Value::Null => Ok(ExaminerSlot::Absent),
        Value::String(s) => {
            let name = s.trim();
            if name.is_empty() {
                Ok(ExaminerSlot::Absent)
            } else if UNASSIGNED_SENTINELS
                .iter()
                .any(|sentinel| sentinel.eq_ignore_ascii_case(name))
            {
                Ok(ExaminerSlot::Unassigned)
            } else {
                Ok(ExaminerSlot::Assigned(ExaminerRef::named(name)))
            }
        }
        Value::Object(obj) => {
            let id = text_field(obj, TEACHER_ID_KEYS);
            let name = text_field(obj, TEACHER_NAME_KEYS).or_else(|| id.clone());
            match name {
                Some(name) if UNASSIGNED_SENTINELS.contains(&name.as_str()) => {
                    Ok(ExaminerSlot::Unassigned)
                }
                Some(name) => Ok(ExaminerSlot::Assigned(ExaminerRef {
                    id,
                    name,
                    department: text_field(obj, TEACHER_DEPT_KEYS),
                })),
                None => {
                    tracing::warn!(field = field, "考官对象缺少姓名与编号,按缺失处理");
                    Ok(ExaminerSlot::Absent)
                }
            }
        }
        other => Err(format!(
            "字段 {} 类型不支持: {}",
            field,
            type_name(other)
        )),
    }
}

// ==========================================
// Assignment
// ==========================================

fn assignment_from_value(value: &Value) -> Result<Assignment, String> {
    let obj = as_object(value, "考试安排")?;

    let student_name = text_field(obj, STUDENT_NAME_KEYS).unwrap_or_default();
    let raw_date = pick(obj, EXAM_DATE_KEYS)
        .and_then(as_text)
        .ok_or_else(|| "缺少考试日期".to_string())?;
    let exam_date =
        parse_date(&raw_date).ok_or_else(|| format!("考试日期无法解析: {}", raw_date))?;

    let id = text_field(obj, ASSIGNMENT_ID_KEYS).unwrap_or_else(|| {
        let seed = format!("{}|{}", student_name, exam_date);
        Uuid::new_v5(&ASSIGNMENT_NAMESPACE, seed.as_bytes()).to_string()
    });

    Ok(Assignment {
        id,
        student_name,
        student_department: text_field(obj, STUDENT_DEPT_KEYS),
        exam_date,
        examiner1: parse_slot(pick(obj, EXAMINER1_KEYS), "examiner1")?,
        examiner2: parse_slot(pick(obj, EXAMINER2_KEYS), "examiner2")?,
        backup_examiner: parse_slot(pick(obj, BACKUP_KEYS), "backupExaminer")?,
    })
}

impl TryFrom<Value> for Assignment {
    type Error = EngineError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        assignment_from_value(&value).map_err(EngineError::InvalidInput)
    }
}

// ==========================================
// Teacher
// ==========================================

fn teacher_from_value(value: &Value) -> Result<Teacher, String> {
    let obj = as_object(value, "考官")?;

    let name = text_field(obj, TEACHER_NAME_KEYS).ok_or_else(|| "考官缺少姓名".to_string())?;
    let id = text_field(obj, TEACHER_ID_KEYS).unwrap_or_else(|| name.clone());

    let workload = match pick(obj, TEACHER_WORKLOAD_KEYS) {
        None => 0,
        Some(v) => parse_workload(v).ok_or_else(|| format!("工作量无法解析: {}", v))?,
    };
    let is_active = match pick(obj, TEACHER_ACTIVE_KEYS) {
        None => true,
        Some(v) => parse_bool(v).ok_or_else(|| format!("在岗标记无法解析: {}", v))?,
    };

    Ok(Teacher {
        id,
        name,
        department: text_field(obj, TEACHER_DEPT_KEYS),
        rotation_group: text_field(obj, TEACHER_GROUP_KEYS)
            .map(|g| RotationGroup::parse(&g))
            .unwrap_or_default(),
        workload,
        is_active,
    })
}

impl TryFrom<Value> for Teacher {
    type Error = EngineError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        teacher_from_value(&value).map_err(EngineError::InvalidInput)
    }
}

// ==========================================
// Student
// ==========================================

fn student_from_value(value: &Value) -> Result<Student, String> {
    let obj = as_object(value, "考生")?;
    Ok(Student {
        id: text_field(obj, STUDENT_ID_KEYS),
        name: text_field(obj, STUDENT_OWN_NAME_KEYS).unwrap_or_default(),
        department: text_field(obj, STUDENT_DEPT_KEYS),
    })
}

impl TryFrom<Value> for Student {
    type Error = EngineError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        student_from_value(&value).map_err(EngineError::InvalidInput)
    }
}

// ==========================================
// 列表解析（带序号的错误信息）
// ==========================================

fn as_list<'a>(value: &'a Value, what: &str) -> EngineResult<&'a Vec<Value>> {
    value.as_array().ok_or_else(|| {
        EngineError::InvalidInput(format!("{}必须是数组,实际为 {}", what, type_name(value)))
    })
}

/// 解析考试安排列表
///
/// 缺少编号的安排使用 (考生, 日期) 生成确定性 UUID; 重复编号追加序号
pub fn parse_assignments(value: &Value) -> EngineResult<Vec<Assignment>> {
    let mut seen = HashSet::new();
    as_list(value, "考试安排列表")?
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let mut assignment = assignment_from_value(item)
                .map_err(|message| EngineError::InvalidRecord { index, message })?;
            if !seen.insert(assignment.id.clone()) {
                tracing::warn!(id = %assignment.id, index = index, "考试安排编号重复,追加序号");
                assignment.id = format!("{}-{}", assignment.id, index);
                seen.insert(assignment.id.clone());
            }
            Ok(assignment)
        })
        .collect()
}

/// 解析考官花名册
pub fn parse_roster(value: &Value) -> EngineResult<Vec<Teacher>> {
    as_list(value, "考官花名册")?
        .iter()
        .enumerate()
        .map(|(index, item)| {
            teacher_from_value(item).map_err(|message| EngineError::InvalidRecord { index, message })
        })
        .collect()
}

/// 解析考生列表
pub fn parse_students(value: &Value) -> EngineResult<Vec<Student>> {
    as_list(value, "考生列表")?
        .iter()
        .enumerate()
        .map(|(index, item)| {
            student_from_value(item).map_err(|message| EngineError::InvalidRecord { index, message })
        })
        .collect()
}

/// 解析 CSV 花名册（首行为表头,列名同样支持别名）
///
/// 每行先转成 JSON 对象,再走与 JSON 花名册相同的解析路径
pub fn parse_roster_csv<R: std::io::Read>(reader: R) -> EngineResult<Vec<Teacher>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let rows = csv_reader
        .deserialize::<HashMap<String, String>>()
        .map(|row| {
            row.map(|fields| {
                Value::Object(
                    fields
                        .into_iter()
                        .map(|(key, value)| (key, Value::String(value)))
                        .collect(),
                )
            })
        })
        .collect::<Result<Vec<Value>, csv::Error>>()?;
    parse_roster(&Value::Array(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assignment_aliases_resolved_once() {
        let value = json!({
            "编号": "A001",
            "考生": "王五",
            "科室": "区域三室",
            "考试日期": "2025/09/10",
            "考官一": {"姓名": "张三", "科室": "三室"},
            "考官二": "李四",
            "备份考官": "未分配"
        });
        let a: Assignment = serde_json::from_value(value).unwrap();
        assert_eq!(a.id, "A001");
        assert_eq!(a.student_name, "王五");
        assert_eq!(a.student_department.as_deref(), Some("区域三室"));
        assert_eq!(a.exam_date, NaiveDate::from_ymd_opt(2025, 9, 10).unwrap());
        let e1 = a.examiner1.assigned().unwrap();
        assert_eq!(e1.name, "张三");
        assert_eq!(e1.department.as_deref(), Some("三室"));
        assert_eq!(a.examiner2.assigned().unwrap().name, "李四");
        assert_eq!(a.backup_examiner, ExaminerSlot::Unassigned);
    }

    #[test]
    fn test_missing_id_is_deterministic() {
        let value = json!({"studentName": "王五", "examDate": "2025-09-10T08:00:00"});
        let a1 = Assignment::try_from(value.clone()).unwrap();
        let a2 = Assignment::try_from(value).unwrap();
        assert_eq!(a1.id, a2.id);
        assert_eq!(a1.examiner1, ExaminerSlot::Absent);
    }

    #[test]
    fn test_bad_date_is_contract_error() {
        let err = parse_assignments(&json!([{"studentName": "王五", "examDate": "下周三"}]))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidRecord { index: 0, .. }));
    }

    #[test]
    fn test_non_list_roster_rejected() {
        let err = parse_roster(&json!({"name": "张三"})).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_teacher_record_parsing() {
        let roster = parse_roster(&json!([
            {"id": "T1", "name": "张三", "department": "一室", "rotationGroup": "二组", "workload": 3},
            {"姓名": "李四", "科室": "7", "班组": "行政班", "工作量": "2", "在岗": "否"}
        ]))
        .unwrap();
        assert_eq!(roster[0].rotation_group, RotationGroup::Two);
        assert_eq!(roster[0].workload, 3);
        assert!(roster[0].is_active);
        assert_eq!(roster[1].id, "李四");
        assert_eq!(roster[1].rotation_group, RotationGroup::Administrative);
        assert_eq!(roster[1].workload, 2);
        assert!(!roster[1].is_active);
    }

    #[test]
    fn test_duplicate_ids_are_suffixed() {
        let list = parse_assignments(&json!([
            {"id": "A1", "studentName": "甲", "examDate": "2025-09-10"},
            {"id": "A1", "studentName": "乙", "examDate": "2025-09-10"}
        ]))
        .unwrap();
        assert_eq!(list[0].id, "A1");
        assert_eq!(list[1].id, "A1-1");
    }

    #[test]
    fn test_csv_roster_uses_same_aliases() {
        let data = "工号,姓名,科室,班组,工作量\nT1,张三,区域三室,一组,4\nT2,李四,7室,无,\n";
        let roster = parse_roster_csv(data.as_bytes()).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].id, "T1");
        assert_eq!(roster[0].rotation_group, RotationGroup::One);
        assert_eq!(roster[0].workload, 4);
        assert_eq!(roster[1].rotation_group, RotationGroup::None);
        assert_eq!(roster[1].workload, 0);
    }
}
