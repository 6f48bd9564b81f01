//! 级联模拟集成测试
//!
//! 覆盖固定随机序列下的确定场景，以及随机种子下必须始终成立的性质。

use std::collections::HashSet;

use cascade_engine::{
    CascadeSimulator, DelayTable, RngSource, SeedActivation, SequenceSource, SimulationConfig,
    Trace, TriggerGraph, TriggerSource, simulate,
};

fn chain_graph() -> TriggerGraph {
    TriggerGraph::from_adjacency([("A", vec!["B"]), ("B", vec!["C"]), ("C", vec![])])
}

fn diamond_graph() -> TriggerGraph {
    TriggerGraph::from_adjacency([
        ("A", vec!["B", "C"]),
        ("B", vec!["D"]),
        ("C", vec!["D"]),
        ("D", vec![]),
    ])
}

/// 带环的稠密图，用于随机性质测试
fn cyclic_graph() -> TriggerGraph {
    TriggerGraph::from_adjacency([
        ("A", vec!["B", "C", "D"]),
        ("B", vec!["C", "A", "E"]),
        ("C", vec!["A", "D"]),
        ("D", vec!["B", "E", "F"]),
        ("E", vec!["A", "F"]),
        ("F", vec!["C"]),
    ])
}

fn rows(trace: &Trace) -> Vec<(&str, &str, f64, usize)> {
    trace
        .iter()
        .map(|e| (e.module.as_str(), e.triggered_by.as_str(), e.probability, e.time))
        .collect()
}

// ==================== 确定场景 ====================

#[test]
fn test_linear_chain_with_certain_follow() {
    let mut rng = SequenceSource::constant(0.0);
    let trace = simulate(
        &[SeedActivation::new("A", 0.9)],
        &chain_graph(),
        &DelayTable::new(),
        1.0,
        &mut rng,
    )
    .unwrap();

    assert_eq!(
        rows(&trace),
        vec![("A", "Model", 0.9, 0), ("B", "A", 0.9, 1), ("C", "B", 0.9, 2)]
    );
}

#[test]
fn test_linear_chain_with_zero_follow() {
    // 抽样恒为 0.0 时，跟随机率为 0 也不跟随任何边
    let mut rng = SequenceSource::constant(0.0);
    let trace = simulate(
        &[SeedActivation::new("A", 0.9)],
        &chain_graph(),
        &DelayTable::new(),
        0.0,
        &mut rng,
    )
    .unwrap();

    assert_eq!(rows(&trace), vec![("A", "Model", 0.9, 0)]);
    assert_eq!(rng.consumed(), 1);
}

#[test]
fn test_reconvergent_paths_fire_once_first_arrival_wins() {
    let mut rng = SequenceSource::constant(0.0);
    let trace = simulate(
        &[SeedActivation::new("A", 1.0)],
        &diamond_graph(),
        &DelayTable::new(),
        1.0,
        &mut rng,
    )
    .unwrap();

    assert_eq!(
        rows(&trace),
        vec![
            ("A", "Model", 1.0, 0),
            ("B", "A", 1.0, 1),
            ("C", "A", 1.0, 2),
            ("D", "B", 1.0, 3),
        ]
    );
}

#[test]
fn test_empty_seeds_yield_empty_trace() {
    let mut rng = SequenceSource::constant(0.0);
    let trace = simulate(&[], &chain_graph(), &DelayTable::new(), 0.85, &mut rng).unwrap();
    assert!(trace.is_empty());
}

#[test]
fn test_seed_without_graph_entry_is_terminal() {
    let mut rng = SequenceSource::constant(0.0);
    let trace = simulate(
        &[SeedActivation::new("ZZ", 0.42)],
        &chain_graph(),
        &DelayTable::new(),
        0.85,
        &mut rng,
    )
    .unwrap();

    assert_eq!(rows(&trace), vec![("ZZ", "Model", 0.42, 0)]);
}

#[test]
fn test_seed_reached_by_cascade_keeps_model_source() {
    // 所有起始模块先入队，因此 B 以 "Model" 来源先出队，A->B 的候选被丢弃
    let mut rng = SequenceSource::constant(0.0);
    let trace = simulate(
        &[SeedActivation::new("A", 0.9), SeedActivation::new("B", 0.6)],
        &chain_graph(),
        &DelayTable::new(),
        1.0,
        &mut rng,
    )
    .unwrap();

    assert_eq!(
        rows(&trace),
        vec![("A", "Model", 0.9, 0), ("B", "Model", 0.6, 1), ("C", "B", 0.6, 2)]
    );
}

/// 延迟表目前不影响 time：每接受一个模块 time 只加一
#[test]
fn test_delay_table_does_not_shift_time() {
    let seeds = [SeedActivation::new("R2", 0.9)];
    let graph = TriggerGraph::builtin();

    let with_delays = simulate(
        &seeds,
        &graph,
        &DelayTable::builtin(),
        0.85,
        &mut RngSource::seeded(11),
    )
    .unwrap();
    let without_delays = simulate(
        &seeds,
        &graph,
        &DelayTable::new(),
        0.85,
        &mut RngSource::seeded(11),
    )
    .unwrap();

    assert_eq!(with_delays, without_delays);
    let times: Vec<usize> = with_delays.iter().map(|e| e.time).collect();
    assert_eq!(times, (0..with_delays.len()).collect::<Vec<_>>());
}

// ==================== 随机性质 ====================

#[test]
fn test_determinism_under_fixed_seed() {
    let simulator = CascadeSimulator::new(
        cyclic_graph(),
        DelayTable::new(),
        SimulationConfig::new(0.6),
    )
    .unwrap();
    let seeds = [SeedActivation::new("A", 0.95), SeedActivation::new("E", 0.5)];

    for seed in 0..50 {
        let first = simulator.run(&seeds, &mut RngSource::seeded(seed)).unwrap();
        let second = simulator.run(&seeds, &mut RngSource::seeded(seed)).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.to_csv_string().unwrap(), second.to_csv_string().unwrap());
    }
}

#[test]
fn test_trace_invariants_hold_for_random_runs() {
    let simulator = CascadeSimulator::new(
        cyclic_graph(),
        DelayTable::new(),
        SimulationConfig::new(0.7),
    )
    .unwrap();
    let seeds = [
        SeedActivation::new("C", 0.9),
        SeedActivation::new("F", 0.55),
        SeedActivation::new("X", 0.3),
    ];
    let seed_modules: HashSet<&str> = seeds.iter().map(|s| s.module.as_str()).collect();

    for seed in 0..300 {
        let trace = simulator.run(&seeds, &mut RngSource::seeded(seed)).unwrap();

        // 每个模块至多出现一次
        let mut seen = HashSet::new();
        for event in &trace {
            assert!(seen.insert(event.module.as_str()), "模块重复触发: {}", event.module);
        }

        // time 连续且严格递增
        for (index, event) in trace.iter().enumerate() {
            assert_eq!(event.time, index);
        }

        for event in &trace {
            match &event.triggered_by {
                TriggerSource::Model => {
                    assert!(seed_modules.contains(event.module.as_str()));
                }
                TriggerSource::Module(source) => {
                    // 级联事件的机率不超过触发它的事件，且来源先于它出现
                    let parent = trace.get(source.as_str()).expect("来源模块必须已触发");
                    assert!(parent.time < event.time);
                    assert!(event.probability <= parent.probability);
                }
            }
        }

        // 起始模块总是以 "Model" 来源触发
        for module in &seed_modules {
            let event = trace.get(module).expect("起始模块必须触发");
            assert!(event.triggered_by.is_model());
        }
    }
}

#[test]
fn test_cyclic_graph_terminates_with_certain_follow() {
    let mut rng = SequenceSource::constant(0.0);
    let trace = simulate(
        &[SeedActivation::new("A", 1.0)],
        &cyclic_graph(),
        &DelayTable::new(),
        1.0,
        &mut rng,
    )
    .unwrap();

    assert_eq!(trace.len(), 6);
    assert_eq!(trace.stage_count(), 6);
}
