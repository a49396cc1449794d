// ==========================================
// 考官排班约束核心 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、记录边界
// 红线: 不含引擎逻辑,不含 I/O
// ==========================================

pub mod assignment;
pub mod conflict;
pub mod record;
pub mod teacher;
pub mod types;

// 重导出核心类型
pub use assignment::{Assignment, ExaminerRef, ExaminerSlot, UNASSIGNED_LABEL};
pub use conflict::{Conflict, ConflictInvolvement, Violation};
pub use record::{parse_assignments, parse_date, parse_roster, parse_roster_csv, parse_students};
pub use teacher::{Student, Teacher};
pub use types::{DutyShift, ExaminerRole, RotationGroup, Severity, ViolationType};
