//! 终端输出格式化
//!
//! 所有函数只拼接字符串，由命令执行器决定写到标准输出还是文件。

use std::fmt::Write as _;

use cascade_engine::{BatchReport, ModuleCatalog, SeedActivation, Trace};
use serde::Serialize;

const RULE_WIDTH: usize = 48;

fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

/// 起始模块预测结果
pub fn predictions(headline: &str, seeds: &[SeedActivation], catalog: &ModuleCatalog) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "新闻标题: {}", headline);

    if seeds.is_empty() {
        let _ = writeln!(out, "无符合门槛的模块，请调整门槛或更换标题。");
        return out;
    }

    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "{:<8} {:>11}  说明", "module", "probability");
    for seed in seeds {
        let _ = writeln!(
            out,
            "{:<8} {:>11.4}  {}",
            seed.module,
            seed.probability,
            catalog.label_of(seed.module.as_str()).unwrap_or("-")
        );
    }
    let _ = writeln!(out, "{}", rule());
    out
}

/// 触发历程表格
pub fn trace_table(trace: &Trace) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:<14} {:>11} {:>5}",
        "module", "triggered_by", "probability", "time"
    );
    for event in trace {
        let _ = writeln!(
            out,
            "{:<8} {:<14} {:>11.4} {:>5}",
            event.module,
            event.triggered_by.as_str(),
            event.probability,
            event.time
        );
    }
    out
}

/// 模拟诠释：触发模块数、阶段数与逐条事件摘要
pub fn narrative(seeds: &[SeedActivation], trace: &Trace) -> String {
    let mut out = String::new();

    if trace.is_empty() {
        let _ = writeln!(out, "没有模块被触发。");
        return out;
    }

    let starting: Vec<&str> = seeds.iter().map(|s| s.module.as_str()).collect();
    let _ = writeln!(
        out,
        "根据输入的新闻标题，系统预测最可能起始模块为：{}",
        starting.join(", ")
    );
    let _ = writeln!(
        out,
        "透过模块间的触发链模拟，共触发 {} 个模块，历经 {} 个阶段。",
        trace.len(),
        trace.stage_count()
    );
    let _ = writeln!(out, "模拟事件摘要如下：");
    for event in trace {
        let _ = writeln!(
            out,
            "- 模块 {} 在第 {} 阶段被触发，由 `{}` 引起，预估触发机率为 {:.2}。",
            event.module,
            event.time,
            event.triggered_by.as_str(),
            event.probability
        );
    }
    out
}

/// 批量模拟报告表格
pub fn batch_table(report: &BatchReport, catalog: &ModuleCatalog) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "批量模拟完成:");
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "模拟次数: {}", report.runs);
    let _ = writeln!(out, "基础种子: {}", report.base_seed);
    let _ = writeln!(out, "工作线程: {}", report.workers);
    let _ = writeln!(out, "平均触发模块数: {:.3}", report.mean_trace_length);
    let _ = writeln!(out, "执行耗时: {} ms", report.elapsed_ms);
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(
        out,
        "{:<8} {:>6} {:>9} {:>9} {:>9}  说明",
        "module", "fired", "rate", "mean_p", "mean_t"
    );
    for stats in &report.modules {
        let _ = writeln!(
            out,
            "{:<8} {:>6} {:>9.4} {:>9.4} {:>9.3}  {}",
            stats.module,
            stats.fired_runs,
            stats.fire_rate,
            stats.mean_probability,
            stats.mean_time,
            catalog.label_of(stats.module.as_str()).unwrap_or("-")
        );
    }
    out
}

/// 触发图中单个模块的展示视图
#[derive(Debug, Serialize)]
pub struct ModuleView<'a> {
    pub id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'a str>,
    pub delay: u32,
    pub triggers: Vec<&'a str>,
}

/// 按声明顺序列出触发图模块
pub fn graph_view(catalog: &ModuleCatalog) -> Vec<ModuleView<'_>> {
    catalog
        .graph
        .modules()
        .iter()
        .map(|module| ModuleView {
            id: module.as_str(),
            label: catalog.label_of(module.as_str()),
            delay: catalog.delays.delay_of(module.as_str()),
            triggers: catalog
                .graph
                .successors(module.as_str())
                .iter()
                .map(|m| m.as_str())
                .collect(),
        })
        .collect()
}

pub fn graph_table(catalog: &ModuleCatalog) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "触发图: {} 个模块，{} 条边",
        catalog.graph.len(),
        catalog.graph.edge_count()
    );
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "{:<8} {:>5}  {:<20} 说明", "module", "delay", "triggers");
    for view in graph_view(catalog) {
        let triggers = if view.triggers.is_empty() {
            "-".to_string()
        } else {
            view.triggers.join(", ")
        };
        let _ = writeln!(
            out,
            "{:<8} {:>5}  {:<20} {}",
            view.id,
            view.delay,
            triggers,
            view.label.unwrap_or("-")
        );
    }
    out
}
