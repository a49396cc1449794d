// ==========================================
// 考官排班约束核心 - 核心库
// ==========================================
// 职责: 考官排班的冲突检测、自动修复、自适应约束与配置校验
// 系统定位: 求解器前后的约束核心（求解器、界面、报表不在本库内）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体、类型与记录边界
pub mod domain;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 引擎配置与约束目录
pub mod config;

// 错误类型
pub mod error;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DutyShift, ExaminerRole, RotationGroup, Severity, ViolationType};

// 领域实体
pub use domain::{Assignment, Conflict, ExaminerRef, ExaminerSlot, Student, Teacher, Violation};

// 引擎
pub use engine::{
    AdaptiveConstraintStrategist, AssignmentRepairEngine, ConflictDetector, ConstraintValidator,
    DepartmentNormalizer, RotationCalculator,
};

// 配置与错误
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "考官排班约束核心";
