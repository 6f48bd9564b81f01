//! 触发图与模块延迟表
//!
//! 两者都是启动时加载的只读配置。查不到的模块视为没有后继、延迟为 1，
//! 缺失不是错误。

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GraphError;
use crate::models::ModuleId;

/// 未声明延迟的模块使用的默认延迟
pub const DEFAULT_DELAY: u32 = 1;

/// 触发图
///
/// 模块 -> 按声明顺序排列的后继模块。允许出现环，
/// 模拟时由已访问集合保证每个模块至多触发一次。
#[derive(Debug, Clone, Default)]
pub struct TriggerGraph {
    successors: HashMap<ModuleId, Vec<ModuleId>>,
    /// 模块声明顺序
    order: Vec<ModuleId>,
}

impl TriggerGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从邻接表构建，重复声明的模块以最后一次为准
    pub fn from_adjacency<I, K, V, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<ModuleId>,
        V: IntoIterator<Item = S>,
        S: Into<ModuleId>,
    {
        let mut graph = Self::new();
        for (module, successors) in entries {
            graph.insert(module.into(), successors.into_iter().map(Into::into).collect());
        }
        graph
    }

    /// 内置参考触发图
    ///
    /// R2 飞弹攻击 -> C1 以色列反击 -> (R4 代理武装介入 -> R3 海峡封锁, C2 停火调停)
    pub fn builtin() -> Self {
        Self::from_adjacency([
            ("R2", vec!["C1"]),
            ("C1", vec!["R4", "C2"]),
            ("R4", vec!["R3"]),
            ("R3", vec![]),
            ("C2", vec![]),
        ])
    }

    fn insert(&mut self, module: ModuleId, successors: Vec<ModuleId>) {
        if !self.successors.contains_key(&module) {
            self.order.push(module.clone());
        }
        self.successors.insert(module, successors);
    }

    /// 获取某模块的后继（按声明顺序），未声明的模块返回空
    pub fn successors(&self, module: &str) -> &[ModuleId] {
        self.successors
            .get(module)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// 图中声明的模块，按声明顺序
    pub fn modules(&self) -> &[ModuleId] {
        &self.order
    }

    pub fn contains(&self, module: &str) -> bool {
        self.successors.contains_key(module)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.successors.values().map(Vec::len).sum()
    }
}

/// 模块延迟表
///
/// 目前只是附带的元数据，不影响模拟历程中的 time。
#[derive(Debug, Clone, Default)]
pub struct DelayTable {
    delays: HashMap<ModuleId, u32>,
}

impl DelayTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 (模块, 延迟) 构建，延迟必须为正整数
    pub fn from_entries<I, K>(entries: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (K, u32)>,
        K: Into<ModuleId>,
    {
        let mut table = Self::new();
        for (module, delay) in entries {
            let module = module.into();
            if delay == 0 {
                return Err(GraphError::InvalidDelay {
                    module: module.to_string(),
                    delay,
                });
            }
            table.delays.insert(module, delay);
        }
        Ok(table)
    }

    /// 内置参考延迟表
    pub fn builtin() -> Self {
        let delays = [("R2", 1), ("C1", 1), ("R4", 2), ("R3", 2), ("C2", 1)]
            .into_iter()
            .map(|(module, delay)| (ModuleId::from(module), delay))
            .collect();
        Self { delays }
    }

    /// 获取模块延迟，未声明时为 1
    pub fn delay_of(&self, module: &str) -> u32 {
        self.delays.get(module).copied().unwrap_or(DEFAULT_DELAY)
    }

    pub fn len(&self) -> usize {
        self.delays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }
}

/// 触发图定义文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Toml,
    Yaml,
    Json,
}

impl DefinitionFormat {
    /// 根据文件扩展名判断格式
    pub fn from_path(path: &Path) -> Result<Self, GraphError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(GraphError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// 触发图定义中的单个模块
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDefinition {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u32>,
    /// 后继模块，顺序即模拟时的入队顺序
    #[serde(default)]
    pub triggers: Vec<String>,
}

/// 触发图定义文件
///
/// ```toml
/// [[modules]]
/// id = "R2"
/// label = "伊朗飞弹攻击"
/// delay = 1
/// triggers = ["C1"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDefinition {
    pub modules: Vec<ModuleDefinition>,
}

impl GraphDefinition {
    /// 从文件加载，格式由扩展名决定
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let path = path.as_ref();
        let format = DefinitionFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), ?format, "加载触发图定义");
        Self::parse(&content, format)
    }

    pub fn parse(content: &str, format: DefinitionFormat) -> Result<Self, GraphError> {
        match format {
            DefinitionFormat::Toml => {
                toml::from_str(content).map_err(|e| GraphError::Parse(e.to_string()))
            }
            DefinitionFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| GraphError::Parse(e.to_string()))
            }
            DefinitionFormat::Json => {
                serde_json::from_str(content).map_err(|e| GraphError::Parse(e.to_string()))
            }
        }
    }

    /// 校验并构建模块目录
    ///
    /// 校验规则：
    /// - 模块 ID 非空且不重复
    /// - 声明的延迟必须为正整数
    /// - 后继引用未声明的模块是允许的（视为终端模块），仅记录警告
    pub fn build(&self) -> Result<ModuleCatalog, GraphError> {
        let mut seen = HashSet::new();
        for module in &self.modules {
            if module.id.trim().is_empty() {
                return Err(GraphError::EmptyModuleId);
            }
            if !seen.insert(module.id.as_str()) {
                return Err(GraphError::DuplicateModule(module.id.clone()));
            }
        }

        for module in &self.modules {
            for successor in &module.triggers {
                if !seen.contains(successor.as_str()) {
                    warn!(
                        module = %module.id,
                        successor = %successor,
                        "后继模块未在触发图中声明，视为终端模块"
                    );
                }
            }
        }

        let graph = TriggerGraph::from_adjacency(
            self.modules
                .iter()
                .map(|m| (m.id.as_str(), m.triggers.iter().map(String::as_str))),
        );
        let delays = DelayTable::from_entries(
            self.modules
                .iter()
                .filter_map(|m| m.delay.map(|d| (m.id.as_str(), d))),
        )?;
        let labels = self
            .modules
            .iter()
            .filter_map(|m| m.label.clone().map(|l| (ModuleId::from(m.id.as_str()), l)))
            .collect();

        Ok(ModuleCatalog {
            graph,
            delays,
            labels,
        })
    }
}

/// 模块目录：触发图、延迟表与模块说明
#[derive(Debug, Clone, Default)]
pub struct ModuleCatalog {
    pub graph: TriggerGraph,
    pub delays: DelayTable,
    labels: HashMap<ModuleId, String>,
}

impl ModuleCatalog {
    /// 内置参考目录
    pub fn builtin() -> Self {
        let labels = [
            ("R2", "伊朗飞弹攻击"),
            ("C1", "以色列反击"),
            ("R4", "代理武装介入"),
            ("R3", "荷莫兹海峡封锁"),
            ("C2", "停火与外交调停"),
        ]
        .into_iter()
        .map(|(id, label)| (ModuleId::from(id), label.to_string()))
        .collect();

        Self {
            graph: TriggerGraph::builtin(),
            delays: DelayTable::builtin(),
            labels,
        }
    }

    /// 从定义文件加载
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        GraphDefinition::from_path(path)?.build()
    }

    pub fn label_of(&self, module: &str) -> Option<&str> {
        self.labels.get(module).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_graph_structure() {
        let graph = TriggerGraph::builtin();

        assert_eq!(graph.len(), 5);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.successors("C1"), &[ModuleId::from("R4"), ModuleId::from("C2")]);
        assert!(graph.successors("R3").is_empty());
        assert_eq!(
            graph.modules().iter().map(ModuleId::as_str).collect::<Vec<_>>(),
            vec!["R2", "C1", "R4", "R3", "C2"]
        );
    }

    #[test]
    fn test_unknown_module_has_no_successors() {
        let graph = TriggerGraph::builtin();
        assert!(graph.successors("X9").is_empty());
        assert!(!graph.contains("X9"));
    }

    #[test]
    fn test_builtin_delays() {
        let delays = DelayTable::builtin();
        assert_eq!(delays.delay_of("R4"), 2);
        assert_eq!(delays.delay_of("R3"), 2);
        assert_eq!(delays.delay_of("C2"), 1);
        assert_eq!(delays.delay_of("UNKNOWN"), DEFAULT_DELAY);
    }

    #[test]
    fn test_zero_delay_rejected() {
        let err = DelayTable::from_entries([("A", 0)]).unwrap_err();
        assert!(matches!(err, GraphError::InvalidDelay { delay: 0, .. }));
    }

    #[test]
    fn test_redeclared_module_keeps_position() {
        let graph = TriggerGraph::from_adjacency([
            ("A", vec!["B"]),
            ("B", vec![]),
            ("A", vec!["C"]),
        ]);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.modules()[0].as_str(), "A");
        assert_eq!(graph.successors("A"), &[ModuleId::from("C")]);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DefinitionFormat::from_path(Path::new("graph.TOML")).unwrap(),
            DefinitionFormat::Toml
        );
        assert_eq!(
            DefinitionFormat::from_path(Path::new("graph.yml")).unwrap(),
            DefinitionFormat::Yaml
        );
        assert!(DefinitionFormat::from_path(Path::new("graph.ini")).is_err());
        assert!(DefinitionFormat::from_path(Path::new("graph")).is_err());
    }

    #[test]
    fn test_builtin_catalog_labels() {
        let catalog = ModuleCatalog::builtin();
        assert_eq!(catalog.label_of("R3"), Some("荷莫兹海峡封锁"));
        assert_eq!(catalog.label_of("X9"), None);
    }
}
