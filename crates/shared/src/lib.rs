//! 共享库
//!
//! 包含模拟器各组件共用的配置加载、错误处理与日志初始化代码。

pub mod config;
pub mod error;
pub mod observability;

pub use config::AppConfig;
pub use error::{AppError, Result};
