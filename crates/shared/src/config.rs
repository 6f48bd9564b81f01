//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::observability::ObservabilityConfig;

/// 级联模拟配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// 模块被触发后，其后继模块真的成为候选的机率
    pub follow_probability: f64,
    /// 单次模拟允许的最大出队次数，None 表示不限制
    pub max_steps: Option<usize>,
    /// 触发图定义文件（toml/yaml/json），None 时使用内置触发图
    pub graph_path: Option<String>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            follow_probability: 0.85,
            max_steps: None,
            graph_path: None,
        }
    }
}

/// 分类器配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// 模块预测门槛，机率低于此值的模块不作为起始模块
    pub threshold: f64,
    /// 只保留机率最高的模块
    pub top_only: bool,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            threshold: 0.4,
            top_only: false,
        }
    }
}

/// 蒙特卡罗批量模拟配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    pub runs: usize,
    pub base_seed: u64,
    /// 工作线程数，None 时按 CPU 核数决定
    pub workers: Option<usize>,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            runs: 1000,
            base_seed: 42,
            workers: None,
        }
    }
}

/// 输出配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OutputSettings {
    /// 模拟历程 CSV 的默认保存路径
    pub trace_path: Option<String>,
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub simulation: SimulationSettings,
    pub classifier: ClassifierSettings,
    pub batch: BatchSettings,
    pub output: OutputSettings,
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "conflict-sim".to_string(),
            environment: "development".to_string(),
            simulation: SimulationSettings::default(),
            classifier: ClassifierSettings::default(),
            batch: BatchSettings::default(),
            output: OutputSettings::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（CONFLICT_ 前缀，双下划线分隔层级，如
    ///    CONFLICT_SIMULATION__FOLLOW_PROBABILITY -> simulation.follow_probability）
    pub fn load(service_name: &str) -> Result<Self> {
        let env = std::env::var("CONFLICT_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let config = Self::load_from(Path::new(&config_dir), &env, service_name)?;
        config.validate()?;
        Ok(config)
    }

    /// 从指定目录加载配置（不做校验）
    pub fn load_from(
        config_dir: &Path,
        env: &str,
        service_name: &str,
    ) -> std::result::Result<Self, ConfigError> {
        Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
            .add_source(
                File::from(config_dir.join(format!("{}.toml", service_name))).required(false),
            )
            .add_source(
                Environment::with_prefix("CONFLICT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// 加载工作目录下的 .env 文件，文件不存在时忽略
    pub fn load_dotenv() -> Result<()> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(()),
            Err(e) if e.not_found() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// 校验配置取值范围
    ///
    /// 机率类配置超出 [0, 1] 时直接报错，不做截断
    pub fn validate(&self) -> Result<()> {
        check_unit_interval(
            "simulation.follow_probability",
            self.simulation.follow_probability,
        )?;
        check_unit_interval("classifier.threshold", self.classifier.threshold)?;

        if self.simulation.max_steps == Some(0) {
            return Err(AppError::invalid("simulation.max_steps", "必须大于 0"));
        }
        if self.batch.runs == 0 {
            return Err(AppError::invalid("batch.runs", "必须大于 0"));
        }
        if self.batch.workers == Some(0) {
            return Err(AppError::invalid("batch.workers", "必须大于 0"));
        }

        Ok(())
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn check_unit_interval(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AppError::invalid(
            field,
            format!("必须在 [0, 1] 区间内，实际为 {}", value),
        ))
    }
}
