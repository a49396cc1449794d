// ==========================================
// 考官排班约束核心 - 排班修复引擎
// ==========================================
// 职责: 清除同日重复排班,贪心补充/替换违规考官
// 输入: 考试安排 + 考官花名册 + 可选的已知冲突列表
// 输出: 修复后的安排 + 变更日志 + 修复摘要 + 失败明细
// ==========================================
// 红线: 硬约束不放宽,无合规候选时保留原考官并报告失败
// 红线: 单条失败不影响整批修复
// ==========================================

mod candidate;
mod core;
mod report;

#[cfg(test)]
mod tests;

pub use self::core::AssignmentRepairEngine;
pub use report::{RepairFailure, RepairOutcome, RepairReport, RepairSummary};
