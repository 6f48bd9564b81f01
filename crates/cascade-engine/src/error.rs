//! 级联引擎错误类型

use std::path::PathBuf;

use thiserror::Error;

use crate::models::ModuleId;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("跟随机率无效: {0}，必须在 [0, 1] 区间内")]
    InvalidFollowProbability(f64),

    #[error("起始模块 {module} 的机率无效: {probability}，必须在 [0, 1] 区间内")]
    InvalidSeedProbability { module: ModuleId, probability: f64 },

    #[error("模拟步数超过上限 {limit}，已触发 {emitted} 个模块")]
    StepLimitExceeded { limit: usize, emitted: usize },

    #[error("批量模拟参数无效: {0}")]
    InvalidBatch(String),

    #[error("批量模拟工作线程异常: {0}")]
    Worker(String),

    #[error("触发图错误: {0}")]
    Graph(#[from] GraphError),

    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 触发图加载与校验错误
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("读取触发图文件失败: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("不支持的触发图文件格式: {0}")]
    UnsupportedFormat(String),

    #[error("触发图解析失败: {0}")]
    Parse(String),

    #[error("模块 ID 不能为空")]
    EmptyModuleId,

    #[error("模块重复声明: {0}")]
    DuplicateModule(String),

    #[error("模块 {module} 的延迟无效: {delay}，必须为正整数")]
    InvalidDelay { module: String, delay: u32 },
}

pub type Result<T> = std::result::Result<T, SimulationError>;
