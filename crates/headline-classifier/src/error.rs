//! 分类器错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("预测门槛无效: {0}，必须在 [0, 1] 区间内")]
    InvalidThreshold(f64),

    #[error("CSV 缺少列: {0}")]
    MissingColumn(String),

    #[error("CSV 读写失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
