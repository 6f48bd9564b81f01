//! CLI 模块
//!
//! 提供命令行接口，支持以下功能：
//!
//! - `predict` - 预测新闻标题的起始模块
//! - `simulate` - 预测并执行一次级联模拟
//! - `batch` - 蒙特卡罗批量模拟
//! - `label` - 以关键词批量标注新闻标题
//! - `graph` - 显示当前触发图
//!
//! # 使用示例
//!
//! ```bash
//! # 预测起始模块
//! conflict-sim predict --headline "Iran launched missiles toward Israel"
//!
//! # 固定种子模拟并导出历程
//! conflict-sim simulate --headline "Iran launched missiles toward Israel" -s 42 -o data/simulation_log.csv
//!
//! # 批量模拟
//! conflict-sim batch --headline "Hezbollah fires rockets" -r 5000 -w 8
//!
//! # 使用自定义触发图
//! conflict-sim --graph graphs/reference.toml graph
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands, OutputFormat, SeedSelection};
pub use runner::{BatchOptions, CommandRunner, SimulateOptions};
