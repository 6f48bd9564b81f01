//! 蒙特卡罗批量模拟
//!
//! 同一组起始模块独立模拟多次，统计各模块被触发的频率。
//! 第 i 次模拟使用种子 `base_seed + i`，因此报告与工作线程数无关。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::error::{Result, SimulationError};
use crate::models::{ModuleId, SeedActivation, Trace};
use crate::random::RngSource;
use crate::simulator::CascadeSimulator;

/// 单个模块的批量统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleStatistics {
    pub module: ModuleId,
    /// 触发该模块的模拟次数
    pub fired_runs: usize,
    /// 触发比例
    pub fire_rate: f64,
    /// 触发时的平均累乘机率
    pub mean_probability: f64,
    /// 触发时的平均发现阶段
    pub mean_time: f64,
}

/// 批量模拟报告
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub runs: usize,
    pub base_seed: u64,
    pub workers: usize,
    pub mean_trace_length: f64,
    /// 按触发次数降序、模块代码升序排列
    pub modules: Vec<ModuleStatistics>,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl BatchReport {
    pub fn module(&self, module: &str) -> Option<&ModuleStatistics> {
        self.modules.iter().find(|m| m.module.as_str() == module)
    }
}

#[derive(Default)]
struct Accumulator {
    fired: usize,
    probability_sum: f64,
    time_sum: f64,
}

/// 批量模拟执行器
pub struct BatchRunner {
    simulator: CascadeSimulator,
    workers: usize,
}

impl BatchRunner {
    pub fn new(simulator: CascadeSimulator) -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self { simulator, workers }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// 执行批量模拟
    ///
    /// 每个工作线程在阻塞线程池中处理编号 `worker, worker + workers, ...` 的模拟，
    /// 各自持有独立的随机源。
    pub async fn run(
        &self,
        seeds: &[SeedActivation],
        runs: usize,
        base_seed: u64,
    ) -> Result<BatchReport> {
        if runs == 0 {
            return Err(SimulationError::InvalidBatch("runs 必须大于 0".to_string()));
        }

        let started_at = Utc::now();
        let start = Instant::now();
        let workers = self.workers.min(runs);
        let seeds: Arc<[SeedActivation]> = seeds.into();

        info!(runs, workers, base_seed, seed_count = seeds.len(), "开始批量模拟");

        let mut tasks = JoinSet::new();
        for worker in 0..workers {
            let simulator = self.simulator.clone();
            let seeds = Arc::clone(&seeds);
            tasks.spawn_blocking(move || -> Result<Vec<(usize, Trace)>> {
                let mut traces = Vec::new();
                for run in (worker..runs).step_by(workers) {
                    let mut rng = RngSource::seeded(base_seed.wrapping_add(run as u64));
                    traces.push((run, simulator.run(&seeds, &mut rng)?));
                }
                debug!(worker, completed = traces.len(), "工作线程完成");
                Ok(traces)
            });
        }

        let mut traces = Vec::with_capacity(runs);
        while let Some(joined) = tasks.join_next().await {
            let chunk = joined.map_err(|e| SimulationError::Worker(e.to_string()))??;
            traces.extend(chunk);
        }
        // 按模拟编号汇总，浮点累加顺序与线程调度无关
        traces.sort_by_key(|(run, _)| *run);

        let mut report = aggregate(traces.iter().map(|(_, trace)| trace), runs);
        report.base_seed = base_seed;
        report.workers = workers;
        report.started_at = started_at;
        report.elapsed_ms = start.elapsed().as_millis() as u64;

        info!(
            runs,
            elapsed_ms = report.elapsed_ms,
            mean_trace_length = report.mean_trace_length,
            "批量模拟完成"
        );

        Ok(report)
    }
}

fn aggregate<'a>(traces: impl Iterator<Item = &'a Trace>, runs: usize) -> BatchReport {
    let mut totals: HashMap<ModuleId, Accumulator> = HashMap::new();
    let mut event_count = 0usize;

    for trace in traces {
        event_count += trace.len();
        for event in trace {
            let acc = totals.entry(event.module.clone()).or_default();
            acc.fired += 1;
            acc.probability_sum += event.probability;
            acc.time_sum += event.time as f64;
        }
    }

    let mut modules: Vec<ModuleStatistics> = totals
        .into_iter()
        .map(|(module, acc)| ModuleStatistics {
            module,
            fired_runs: acc.fired,
            fire_rate: acc.fired as f64 / runs as f64,
            mean_probability: acc.probability_sum / acc.fired as f64,
            mean_time: acc.time_sum / acc.fired as f64,
        })
        .collect();
    modules.sort_by(|a, b| {
        b.fired_runs
            .cmp(&a.fired_runs)
            .then_with(|| a.module.cmp(&b.module))
    });

    BatchReport {
        runs,
        base_seed: 0,
        workers: 0,
        mean_trace_length: event_count as f64 / runs as f64,
        modules,
        started_at: Utc::now(),
        elapsed_ms: 0,
    }
}
