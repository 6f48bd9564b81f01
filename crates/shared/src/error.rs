//! 统一错误处理模块
//!
//! 定义配置加载与校验阶段共享的错误类型，使用 thiserror 提供清晰的错误信息。

use thiserror::Error;

/// 应用级错误类型
#[derive(Debug, Error)]
pub enum AppError {
    // ==================== 配置错误 ====================
    #[error("配置加载失败: {0}")]
    Config(#[from] config::ConfigError),

    #[error("环境文件加载失败: {0}")]
    DotEnv(#[from] dotenvy::Error),

    // ==================== 验证错误 ====================
    #[error("无效的参数: {field} - {message}")]
    InvalidArgument { field: String, message: String },
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::DotEnv(_) => "DOTENV_ERROR",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
        }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = AppError::invalid("simulation.follow_probability", "必须在 [0, 1] 区间内");
        assert_eq!(err.code(), "INVALID_ARGUMENT");
        assert!(err.to_string().contains("simulation.follow_probability"));
    }

    #[test]
    fn test_config_error_code() {
        let err: AppError = config::ConfigError::NotFound("simulation".to_string()).into();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
