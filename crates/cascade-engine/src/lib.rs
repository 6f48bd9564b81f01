//! 级联模拟引擎
//!
//! 给定一组起始模块及其信心值，沿固定的触发图传播激活，
//! 每条边按跟随机率随机放行，输出按发现时间排序的触发历程。
//!
//! ## 核心组件
//!
//! - `TriggerGraph` / `DelayTable` - 只读的触发图与模块延迟表
//! - `RandomSource` - 注入式随机源，保证模拟可重现
//! - `simulate` / `CascadeSimulator` - 广度优先的级联模拟
//! - `BatchRunner` - 多线程蒙特卡罗批量模拟

pub mod batch;
pub mod error;
pub mod export;
pub mod graph;
pub mod models;
pub mod random;
pub mod simulator;

pub use batch::{BatchReport, BatchRunner, ModuleStatistics};
pub use error::{GraphError, Result, SimulationError};
pub use graph::{
    DefinitionFormat, DelayTable, GraphDefinition, ModuleCatalog, ModuleDefinition, TriggerGraph,
};
pub use models::{ModuleId, SeedActivation, Trace, TriggerEvent, TriggerSource};
pub use random::{RandomSource, RngSource, SequenceSource};
pub use simulator::{CascadeSimulator, SimulationConfig, simulate};
