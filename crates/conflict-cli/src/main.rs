//! conflict-sim 命令行入口

use anyhow::Context;
use clap::Parser;
use conflict_cli::cli::{BatchOptions, Cli, CommandRunner, Commands, SimulateOptions};
use conflict_shared::{AppConfig, observability};

const SERVICE_NAME: &str = "conflict-sim";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    AppConfig::load_dotenv().context("加载 .env 失败")?;
    let mut config = AppConfig::load(SERVICE_NAME).context("加载配置失败")?;

    // 命令行日志级别优先于配置；RUST_LOG 仍然优先于两者
    config.observability = config
        .observability
        .with_log_level(cli.log_level.as_deref());
    observability::init(&config.observability)?;

    tracing::debug!(
        environment = %config.environment,
        follow_probability = config.simulation.follow_probability,
        "配置加载完成"
    );

    let runner = CommandRunner::new(config, cli.graph)?;

    match cli.command {
        Commands::Predict {
            headline,
            selection,
        } => {
            runner.run_predict(&headline, &selection)?;
        }
        Commands::Simulate {
            headline,
            selection,
            seed,
            follow_probability,
            format,
            output,
        } => {
            let options = SimulateOptions {
                threshold: selection.threshold,
                top_only: selection.top_only_override(),
                seed,
                follow_probability,
                format,
                output,
            };
            runner.run_simulate(&headline, &options)?;
        }
        Commands::Batch {
            headline,
            runs,
            seed,
            workers,
            selection,
            follow_probability,
            format,
        } => {
            let options = BatchOptions {
                runs,
                seed,
                workers,
                threshold: selection.threshold,
                top_only: selection.top_only_override(),
                follow_probability,
                format,
            };
            runner.run_batch(&headline, &options).await?;
        }
        Commands::Label { input, output } => {
            let stats = runner.run_label(&input, output.as_deref())?;
            eprintln!(
                "标注完成: 共 {} 条，已标注 {} 条，未识别 {} 条",
                stats.rows, stats.labeled, stats.unknown
            );
        }
        Commands::Graph { format } => {
            runner.run_graph(format)?;
        }
    }

    Ok(())
}
