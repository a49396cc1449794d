// ==========================================
// 考官排班约束核心 - 引擎层
// ==========================================
// 职责: 科室标准化 / 轮班计算 / 冲突检测 / 自动修复 / 自适应约束 / 配置校验
// 红线: 引擎无状态,只持有配置; 不做文件或网络 I/O
// 红线: 规则违规以数据返回,不作为错误抛出
// ==========================================

pub mod adaptive;
pub mod conflict_detector;
pub mod department;
pub mod repair;
pub mod roster;
pub mod rotation;
pub mod validator;

// 重导出核心引擎
pub use adaptive::{
    AdaptiveConstraintStrategist, AdaptiveConstraints, DegradationStrategy, DepartmentResource,
    ResourceAnalysis, DEGRADATION_STRATEGIES,
};
pub use conflict_detector::{ConflictDetector, DetectionReport};
pub use department::{DepartmentNormalizer, DEPARTMENT_CODES};
pub use repair::{AssignmentRepairEngine, RepairFailure, RepairOutcome, RepairReport, RepairSummary};
pub use roster::{RosterEntry, RosterIndex};
pub use rotation::{DutyState, RotationCalculator, RotationDay, ROTATION_CYCLE_DAYS};
pub use validator::{ConstraintConfig, ConstraintValidator, SoftConstraintSetting, ValidationResult};
