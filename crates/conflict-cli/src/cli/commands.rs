//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。
//! 未指定的参数回落到配置文件（config/*.toml 与 CONFLICT_ 环境变量）中的取值。

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// 冲突情境级联模拟工具
///
/// 由新闻标题预测起始模块，沿触发图模拟后续模块的连锁触发。
#[derive(Parser, Debug)]
#[command(name = "conflict-sim")]
#[command(version, about = "冲突情境模块触发模拟工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// 触发图定义文件（TOML/YAML/JSON），覆盖配置
    #[arg(short, long, global = true)]
    pub graph: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 输出格式
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// 起始模块筛选参数，未指定时使用 `[classifier]` 配置
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct SeedSelection {
    /// 模块预测门槛
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// 只保留机率最高的模块
    #[arg(long, conflicts_with = "all")]
    pub top_only: bool,

    /// 保留所有达到门槛的模块（覆盖配置中的 top_only = true）
    #[arg(long)]
    pub all: bool,
}

impl SeedSelection {
    /// 命令行对 top_only 的覆盖，None 表示沿用配置
    pub fn top_only_override(&self) -> Option<bool> {
        match (self.top_only, self.all) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 预测新闻标题的起始模块
    Predict {
        /// 新闻标题
        #[arg(long)]
        headline: String,

        #[command(flatten)]
        selection: SeedSelection,
    },

    /// 预测起始模块并执行一次级联模拟
    ///
    /// 输出触发历程与模拟诠释；指定 `--output` 时另存历程（.json 为 JSON，其余为 CSV）。
    Simulate {
        /// 新闻标题
        #[arg(long)]
        headline: String,

        #[command(flatten)]
        selection: SeedSelection,

        /// 随机种子，未指定时使用系统熵源
        #[arg(short, long)]
        seed: Option<u64>,

        /// 跟随触发机率
        #[arg(long)]
        follow_probability: Option<f64>,

        /// 标准输出格式
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// 历程导出路径
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 蒙特卡罗批量模拟
    Batch {
        /// 新闻标题
        #[arg(long)]
        headline: String,

        /// 模拟次数
        #[arg(short, long)]
        runs: Option<usize>,

        /// 基础随机种子，第 i 次模拟使用 seed + i
        #[arg(short, long)]
        seed: Option<u64>,

        /// 工作线程数
        #[arg(short, long)]
        workers: Option<usize>,

        #[command(flatten)]
        selection: SeedSelection,

        /// 跟随触发机率
        #[arg(long)]
        follow_probability: Option<f64>,

        /// 标准输出格式（table 或 json）
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// 以关键词为新闻标题打模块标签
    ///
    /// 输入 CSV 需包含 `title` 列，输出 `title,modules` 两列。
    Label {
        /// 输入 CSV 文件
        #[arg(short, long)]
        input: PathBuf,

        /// 输出 CSV 文件，未指定时写到标准输出
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 显示当前使用的触发图与延迟表
    Graph {
        /// 输出格式（table 或 json）
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

// ============================================================================
// 单元测试
// ============================================================================
