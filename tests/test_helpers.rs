// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 构建考官花名册、考试安排、考生列表等测试数据
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use exam_scheduler_core::domain::{
    Assignment, ExaminerRef, ExaminerRole, ExaminerSlot, RotationGroup, Student, Teacher,
};

/// 构建日期
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ==========================================
// Teacher 构建器
// ==========================================

pub struct TeacherBuilder {
    id: String,
    name: String,
    department: Option<String>,
    rotation_group: RotationGroup,
    workload: u32,
    is_active: bool,
}

impl TeacherBuilder {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            department: None,
            rotation_group: RotationGroup::None,
            workload: 0,
            is_active: true,
        }
    }

    pub fn department(mut self, department: &str) -> Self {
        self.department = Some(department.to_string());
        self
    }

    pub fn group(mut self, group: RotationGroup) -> Self {
        self.rotation_group = group;
        self
    }

    pub fn workload(mut self, workload: u32) -> Self {
        self.workload = workload;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn build(self) -> Teacher {
        Teacher {
            id: self.id,
            name: self.name,
            department: self.department,
            rotation_group: self.rotation_group,
            workload: self.workload,
            is_active: self.is_active,
        }
    }
}

// ==========================================
// Assignment 构建器
// ==========================================

pub struct AssignmentBuilder {
    assignment: Assignment,
}

impl AssignmentBuilder {
    pub fn new(id: &str, student: &str, department: &str, exam_date: NaiveDate) -> Self {
        Self {
            assignment: Assignment::new(id, student, department, exam_date),
        }
    }

    pub fn examiner1(mut self, name: &str) -> Self {
        self.set(ExaminerRole::Examiner1, name);
        self
    }

    pub fn examiner2(mut self, name: &str) -> Self {
        self.set(ExaminerRole::Examiner2, name);
        self
    }

    pub fn backup(mut self, name: &str) -> Self {
        self.set(ExaminerRole::Backup, name);
        self
    }

    pub fn unassigned(mut self, role: ExaminerRole) -> Self {
        *self.assignment.slot_mut(role) = ExaminerSlot::Unassigned;
        self
    }

    pub fn build(self) -> Assignment {
        self.assignment
    }

    fn set(&mut self, role: ExaminerRole, name: &str) {
        *self.assignment.slot_mut(role) = ExaminerSlot::Assigned(ExaminerRef::named(name));
    }
}

// ==========================================
// 常用数据集
// ==========================================

/// 十个科室各两名考官,班组轮流分配,另有两名行政班考官
pub fn create_full_roster() -> Vec<Teacher> {
    let departments = ["一", "二", "三", "四", "五", "六", "七", "八", "九", "十"];
    let groups = RotationGroup::ROTATING;
    let mut roster = Vec::new();
    for (i, dept) in departments.iter().enumerate() {
        for j in 0..2 {
            let n = i * 2 + j;
            roster.push(
                TeacherBuilder::new(&format!("T{:02}", n), &format!("考官{:02}", n))
                    .department(&format!("{}室", dept))
                    .group(groups[n % 4])
                    .workload((n % 3) as u32)
                    .build(),
            );
        }
    }
    roster.push(
        TeacherBuilder::new("T90", "行政甲")
            .department("区域一室")
            .group(RotationGroup::Administrative)
            .build(),
    );
    roster.push(
        TeacherBuilder::new("T91", "行政乙")
            .department("区域五室")
            .group(RotationGroup::Administrative)
            .build(),
    );
    roster
}

/// 按科室批量生成考生
pub fn create_students(spec: &[(&str, usize)]) -> Vec<Student> {
    spec.iter()
        .flat_map(|(dept, count)| {
            (0..*count).map(move |i| Student::new(&format!("学员{}{}", dept, i), dept))
        })
        .collect()
}

/// 按科室批量生成考官
pub fn create_teachers(spec: &[(&str, usize)]) -> Vec<Teacher> {
    spec.iter()
        .flat_map(|(dept, count)| {
            (0..*count).map(move |i| {
                let id = format!("{}-{}", dept, i);
                TeacherBuilder::new(&id, &id).department(dept).build()
            })
        })
        .collect()
}
