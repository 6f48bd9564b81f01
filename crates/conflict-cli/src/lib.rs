//! 冲突情境模拟命令行工具
//!
//! - `cli`: 命令定义与执行
//! - `render`: 终端输出格式化

pub mod cli;
pub mod render;
