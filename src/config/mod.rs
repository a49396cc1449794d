// ==========================================
// 考官排班约束核心 - 配置层
// ==========================================
// 职责: 引擎配置（key-value / JSON）与约束目录常量
// ==========================================

pub mod constraint_catalog;
pub mod engine_config;

// 重导出
pub use constraint_catalog::{
    default_weights, flag_keys, hard_spec, soft_spec, ConflictRule, HardConstraintSpec,
    SoftConstraintSpec, CONFLICT_RULES, HARD_CONSTRAINTS, SOFT_CONSTRAINTS, SOFT_SWEET_SPOT,
};
pub use engine_config::{config_keys, EngineConfig};
