//! 统一可观测性模块
//!
//! 提供日志初始化。所有命令行入口通过单一入口点配置日志，
//! 确保一致的输出格式与字段命名。

pub mod tracing;

use serde::Deserialize;

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// 日志级别（如 "info", "debug"），RUST_LOG 环境变量优先
    pub log_level: String,
    /// 日志输出格式：json（结构化）或 pretty（人类可读）
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// 使用命令行指定的日志级别覆盖配置
    pub fn with_log_level(mut self, level: Option<&str>) -> Self {
        if let Some(level) = level {
            self.log_level = level.to_string();
        }
        self
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

pub use self::tracing::init;
