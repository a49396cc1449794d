// ==========================================
// 考官排班约束核心 - 错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 冲突/违规属于业务发现,以数据返回,不走错误通道;
//       这里只承载输入契约被破坏的情况
// ==========================================

use thiserror::Error;

/// 核心错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 输入契约错误 =====
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("记录格式错误 (第 {index} 条): {message}")]
    InvalidRecord { index: usize, message: String },

    #[error("日期格式错误 (字段 {field}): 无法解析 {value}")]
    DateFormat { field: String, value: String },

    // ===== 配置错误 =====
    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValue {
        key: String,
        value: String,
        message: String,
    },

    // ===== 解析错误 =====
    #[error("JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV 解析失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("文件读取失败: {0}")]
    Io(#[from] std::io::Error),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
