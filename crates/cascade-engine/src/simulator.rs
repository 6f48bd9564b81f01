//! 级联模拟器
//!
//! 广度优先遍历触发图，每条出边抽一次随机数决定是否跟随：
//!
//! 1. 起始模块按给定顺序入队，来源为 "Model"
//! 2. 出队时若模块已触发则丢弃（不记录、不推进时间）
//! 3. 否则记录触发事件，time 加一，并按声明顺序检查每个后继：
//!    抽样值 `<= follow_probability` 时以 `机率 * follow_probability` 入队，
//!    跟随机率为 0 时一律不入队（抽样照常消耗）
//!
//! 同一模块多条路径到达时先出队者胜出（FIFO），不比较机率高低。

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{Result, SimulationError};
use crate::graph::{DelayTable, ModuleCatalog, TriggerGraph};
use crate::models::{ModuleId, SeedActivation, Trace, TriggerEvent, TriggerSource, round_probability};
use crate::random::RandomSource;

/// 模拟配置
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// 模块触发后，每条出边被跟随的机率
    pub follow_probability: f64,
    /// 单次模拟最大出队次数，None 表示不限制
    pub max_steps: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            follow_probability: 0.85,
            max_steps: None,
        }
    }
}

impl SimulationConfig {
    pub fn new(follow_probability: f64) -> Self {
        Self {
            follow_probability,
            max_steps: None,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !is_unit_probability(self.follow_probability) {
            return Err(SimulationError::InvalidFollowProbability(
                self.follow_probability,
            ));
        }
        Ok(())
    }
}

/// 执行一次级联模拟
///
/// 起始模块须已由调用方按门槛过滤并排序，这里不再重新处理。
/// 空输入返回空历程。
pub fn simulate<R>(
    seeds: &[SeedActivation],
    graph: &TriggerGraph,
    delays: &DelayTable,
    follow_probability: f64,
    rng: &mut R,
) -> Result<Trace>
where
    R: RandomSource + ?Sized,
{
    let config = SimulationConfig::new(follow_probability);
    run_cascade(seeds, graph, delays, &config, rng)
}

/// 待处理的候选模块
struct Pending {
    module: ModuleId,
    source: TriggerSource,
    probability: f64,
}

fn run_cascade<R>(
    seeds: &[SeedActivation],
    graph: &TriggerGraph,
    delays: &DelayTable,
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<Trace>
where
    R: RandomSource + ?Sized,
{
    config.validate()?;
    validate_seeds(seeds)?;

    let follow = config.follow_probability;
    let mut queue: VecDeque<Pending> = seeds
        .iter()
        .map(|seed| Pending {
            module: seed.module.clone(),
            source: TriggerSource::Model,
            probability: seed.probability,
        })
        .collect();
    let mut visited: HashSet<ModuleId> = HashSet::new();
    let mut events: Vec<TriggerEvent> = Vec::new();
    let mut steps = 0usize;

    while let Some(entry) = queue.pop_front() {
        steps += 1;
        if let Some(limit) = config.max_steps {
            if steps > limit {
                return Err(SimulationError::StepLimitExceeded {
                    limit,
                    emitted: events.len(),
                });
            }
        }

        if visited.contains(&entry.module) {
            trace!(module = %entry.module, source = %entry.source, "模块已触发，丢弃重复候选");
            continue;
        }
        visited.insert(entry.module.clone());

        let time = events.len();
        for successor in graph.successors(entry.module.as_str()) {
            let draw = rng.next_unit();
            // 跟随机率为 0 时任何边都不跟随
            if follow > 0.0 && draw <= follow {
                // 延迟目前只记录，不影响 time
                trace!(
                    module = %entry.module,
                    successor = %successor,
                    draw,
                    delay = delays.delay_of(successor.as_str()),
                    "跟随触发"
                );
                queue.push_back(Pending {
                    module: successor.clone(),
                    source: TriggerSource::Module(entry.module.clone()),
                    probability: entry.probability * follow,
                });
            } else {
                trace!(module = %entry.module, successor = %successor, draw, "未跟随");
            }
        }

        events.push(TriggerEvent {
            module: entry.module,
            triggered_by: entry.source,
            probability: round_probability(entry.probability),
            time,
        });
    }

    Ok(Trace::new(events))
}

fn validate_seeds(seeds: &[SeedActivation]) -> Result<()> {
    match seeds.iter().find(|s| !is_unit_probability(s.probability)) {
        Some(seed) => Err(SimulationError::InvalidSeedProbability {
            module: seed.module.clone(),
            probability: seed.probability,
        }),
        None => Ok(()),
    }
}

fn is_unit_probability(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

/// 级联模拟器
///
/// 持有只读的触发图、延迟表与模拟配置，可在多个线程间克隆共享。
/// 每次调用 `run` 都使用调用方传入的独立随机源。
#[derive(Debug, Clone)]
pub struct CascadeSimulator {
    graph: Arc<TriggerGraph>,
    delays: Arc<DelayTable>,
    config: SimulationConfig,
}

impl CascadeSimulator {
    /// 创建模拟器，配置无效时直接报错
    pub fn new(graph: TriggerGraph, delays: DelayTable, config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            graph: Arc::new(graph),
            delays: Arc::new(delays),
            config,
        })
    }

    /// 使用模块目录创建
    pub fn from_catalog(catalog: &ModuleCatalog, config: SimulationConfig) -> Result<Self> {
        Self::new(catalog.graph.clone(), catalog.delays.clone(), config)
    }

    /// 使用内置触发图创建
    pub fn builtin(config: SimulationConfig) -> Result<Self> {
        Self::new(TriggerGraph::builtin(), DelayTable::builtin(), config)
    }

    pub fn graph(&self) -> &TriggerGraph {
        &self.graph
    }

    pub fn delays(&self) -> &DelayTable {
        &self.delays
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// 执行一次模拟
    pub fn run<R>(&self, seeds: &[SeedActivation], rng: &mut R) -> Result<Trace>
    where
        R: RandomSource + ?Sized,
    {
        let trace = run_cascade(seeds, &self.graph, &self.delays, &self.config, rng)?;

        debug!(
            seed_count = seeds.len(),
            triggered = trace.len(),
            stages = trace.stage_count(),
            "级联模拟完成"
        );

        Ok(trace)
    }
}
