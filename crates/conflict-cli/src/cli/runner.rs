//! 命令执行器
//!
//! 负责执行各 CLI 子命令的具体逻辑。
//! 命令行参数优先，未指定时使用 `AppConfig` 中的配置值。

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use cascade_engine::{
    BatchReport, BatchRunner, CascadeSimulator, ModuleCatalog, RngSource, SeedActivation,
    SimulationConfig, Trace,
};
use conflict_shared::AppConfig;
use headline_classifier::{KeywordClassifier, KeywordLabeler, LabelStats, predict_modules};

use super::commands::{OutputFormat, SeedSelection};
use crate::render;

/// simulate 命令参数
#[derive(Debug, Clone, Default)]
pub struct SimulateOptions {
    pub threshold: Option<f64>,
    /// None 时使用配置中的 classifier.top_only
    pub top_only: Option<bool>,
    pub seed: Option<u64>,
    pub follow_probability: Option<f64>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

/// batch 命令参数
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub runs: Option<usize>,
    pub seed: Option<u64>,
    pub workers: Option<usize>,
    pub threshold: Option<f64>,
    /// None 时使用配置中的 classifier.top_only
    pub top_only: Option<bool>,
    pub follow_probability: Option<f64>,
    pub format: OutputFormat,
}

/// 命令执行器
///
/// 持有配置、模块目录与分类器，作为 CLI 与模拟引擎之间的桥梁。
pub struct CommandRunner {
    config: AppConfig,
    catalog: ModuleCatalog,
    classifier: KeywordClassifier,
}

impl CommandRunner {
    /// 创建命令执行器
    ///
    /// `graph_override` 优先于配置中的 `simulation.graph_path`，都未指定时使用内置触发图。
    pub fn new(config: AppConfig, graph_override: Option<PathBuf>) -> Result<Self> {
        let graph_path = graph_override.or_else(|| {
            config
                .simulation
                .graph_path
                .as_deref()
                .map(PathBuf::from)
        });

        let catalog = match graph_path {
            Some(path) => {
                let catalog = ModuleCatalog::from_path(&path)
                    .with_context(|| format!("加载触发图失败: {}", path.display()))?;
                info!(
                    path = %path.display(),
                    modules = catalog.graph.len(),
                    edges = catalog.graph.edge_count(),
                    "已加载触发图定义"
                );
                catalog
            }
            None => ModuleCatalog::builtin(),
        };

        Ok(Self {
            config,
            catalog,
            classifier: KeywordClassifier::builtin(),
        })
    }

    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }

    // ========================================================================
    // 命令入口
    // ========================================================================

    /// 执行 predict 命令
    pub fn run_predict(&self, headline: &str, selection: &SeedSelection) -> Result<()> {
        let seeds = self.predict(
            headline,
            selection.threshold,
            selection.top_only_override(),
        )?;
        print!("{}", render::predictions(headline, &seeds, &self.catalog));
        Ok(())
    }

    /// 执行 simulate 命令
    ///
    /// 预测起始模块后执行一次模拟，输出历程与诠释，并按需导出历程文件。
    pub fn run_simulate(&self, headline: &str, options: &SimulateOptions) -> Result<()> {
        let run_id = Uuid::new_v4();
        let span = info_span!("simulate", %run_id);
        let _guard = span.enter();

        let seeds = self.predict(headline, options.threshold, options.top_only)?;
        let trace = self.simulate(&seeds, options.seed, options.follow_probability)?;

        info!(
            seed_count = seeds.len(),
            triggered = trace.len(),
            stages = trace.stage_count(),
            "模拟完成"
        );

        match options.format {
            OutputFormat::Table => {
                print!("{}", render::predictions(headline, &seeds, &self.catalog));
                println!("\n模块触发流程:");
                print!("{}", render::trace_table(&trace));
                println!("\n模拟诠释:");
                print!("{}", render::narrative(&seeds, &trace));
            }
            OutputFormat::Json => println!("{}", trace.to_json_pretty()?),
            OutputFormat::Csv => {
                trace
                    .write_csv(io::stdout().lock())
                    .context("写出 CSV 失败")?;
            }
        }

        let output = options
            .output
            .clone()
            .or_else(|| self.config.output.trace_path.as_deref().map(PathBuf::from));
        if let Some(path) = output {
            export_trace(&trace, &path)?;
            info!(path = %path.display(), "模拟历程已保存");
        }

        Ok(())
    }

    /// 执行 batch 命令
    pub async fn run_batch(&self, headline: &str, options: &BatchOptions) -> Result<()> {
        let run_id = Uuid::new_v4();
        let report = self
            .batch(headline, options)
            .instrument(info_span!("batch", %run_id))
            .await?;

        match options.format {
            OutputFormat::Table => print!("{}", render::batch_table(&report, &self.catalog)),
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(&report).context("序列化批量报告失败")?
            ),
            OutputFormat::Csv => bail!("batch 命令不支持 CSV 输出，请使用 table 或 json"),
        }

        Ok(())
    }

    /// 执行 label 命令
    pub fn run_label(&self, input: &Path, output: Option<&Path>) -> Result<LabelStats> {
        let reader = fs::File::open(input)
            .with_context(|| format!("打开输入文件失败: {}", input.display()))?;
        let labeler = KeywordLabeler::new(self.classifier.keywords().clone());

        let stats = match output {
            Some(path) => {
                let file = fs::File::create(path)
                    .with_context(|| format!("创建输出文件失败: {}", path.display()))?;
                let stats = labeler.label_csv(reader, file)?;
                info!(path = %path.display(), rows = stats.rows, "标注结果已保存");
                stats
            }
            None => labeler.label_csv(reader, io::stdout().lock())?,
        };

        Ok(stats)
    }

    /// 执行 graph 命令
    pub fn run_graph(&self, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Table => print!("{}", render::graph_table(&self.catalog)),
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(&render::graph_view(&self.catalog))
                    .context("序列化触发图失败")?
            ),
            OutputFormat::Csv => bail!("graph 命令不支持 CSV 输出，请使用 table 或 json"),
        }
        Ok(())
    }

    // ========================================================================
    // 辅助方法
    // ========================================================================

    /// 预测起始模块，未指定的参数使用配置值
    pub fn predict(
        &self,
        headline: &str,
        threshold: Option<f64>,
        top_only: Option<bool>,
    ) -> Result<Vec<SeedActivation>> {
        let threshold = threshold.unwrap_or(self.config.classifier.threshold);
        let top_only = top_only.unwrap_or(self.config.classifier.top_only);
        let seeds = predict_modules(&self.classifier, headline, threshold, top_only)?;
        Ok(seeds)
    }

    /// 执行一次模拟，未指定种子时使用系统熵源
    pub fn simulate(
        &self,
        seeds: &[SeedActivation],
        seed: Option<u64>,
        follow_probability: Option<f64>,
    ) -> Result<Trace> {
        let simulator = self.simulator(follow_probability)?;
        let trace = match seed {
            Some(seed) => simulator.run(seeds, &mut RngSource::seeded(seed))?,
            None => simulator.run(seeds, &mut RngSource::from_entropy())?,
        };
        Ok(trace)
    }

    /// 执行批量模拟并返回报告
    pub async fn batch(&self, headline: &str, options: &BatchOptions) -> Result<BatchReport> {
        let seeds = self.predict(headline, options.threshold, options.top_only)?;
        let runs = options.runs.unwrap_or(self.config.batch.runs);
        let base_seed = options.seed.unwrap_or(self.config.batch.base_seed);

        let mut runner = BatchRunner::new(self.simulator(options.follow_probability)?);
        if let Some(workers) = options.workers.or(self.config.batch.workers) {
            runner = runner.with_workers(workers);
        }

        let report = runner.run(&seeds, runs, base_seed).await?;
        Ok(report)
    }

    fn simulator(&self, follow_probability: Option<f64>) -> Result<CascadeSimulator> {
        let mut config = SimulationConfig::new(
            follow_probability.unwrap_or(self.config.simulation.follow_probability),
        );
        if let Some(max_steps) = self.config.simulation.max_steps {
            config = config.with_max_steps(max_steps);
        }
        CascadeSimulator::from_catalog(&self.catalog, config).context("创建模拟器失败")
    }
}

/// 导出模拟历程，`.json` 扩展名写 JSON，其余写 CSV
pub fn export_trace(trace: &Trace, path: &Path) -> Result<()> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("创建输出目录失败: {}", parent.display()))?;
    }

    let mut file = fs::File::create(path)
        .with_context(|| format!("创建输出文件失败: {}", path.display()))?;
    if is_json {
        file.write_all(trace.to_json_pretty()?.as_bytes())
            .context("写入文件失败")?;
    } else {
        trace.write_csv(&mut file).context("写入文件失败")?;
    }
    Ok(())
}
