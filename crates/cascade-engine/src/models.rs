//! 级联模拟领域模型

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 起始模块的来源标记
pub const MODEL_SENTINEL: &str = "Model";

/// 冲突模块代码（如 "R2" 飞弹攻击、"C2" 停火）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ModuleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for ModuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// 起始激活：分类器输出的 (模块, 机率)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedActivation {
    pub module: ModuleId,
    pub probability: f64,
}

impl SeedActivation {
    pub fn new(module: impl Into<ModuleId>, probability: f64) -> Self {
        Self {
            module: module.into(),
            probability,
        }
    }
}

/// 触发来源
///
/// 序列化为字符串：起始模块为 "Model"，级联触发为来源模块代码。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TriggerSource {
    /// 由分类器直接给出的起始模块
    Model,
    /// 由另一模块级联触发
    Module(ModuleId),
}

impl TriggerSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Model => MODEL_SENTINEL,
            Self::Module(module) => module.as_str(),
        }
    }

    pub fn is_model(&self) -> bool {
        matches!(self, Self::Model)
    }

    pub fn module(&self) -> Option<&ModuleId> {
        match self {
            Self::Model => None,
            Self::Module(module) => Some(module),
        }
    }
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TriggerSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TriggerSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == MODEL_SENTINEL {
            Ok(Self::Model)
        } else {
            Ok(Self::Module(ModuleId(raw)))
        }
    }
}

/// 触发事件：模拟历程中的一行
///
/// 字段顺序即 CSV 列顺序：module, triggered_by, probability, time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub module: ModuleId,
    pub triggered_by: TriggerSource,
    /// 沿触发路径累乘后的机率，保留 4 位小数
    pub probability: f64,
    /// 发现阶段，从 0 开始，每接受一个模块加一
    pub time: usize,
}

/// 模拟历程：按出队并接受的顺序排列的触发事件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace {
    events: Vec<TriggerEvent>,
}

impl Trace {
    pub fn new(events: Vec<TriggerEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[TriggerEvent] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TriggerEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// 查找某模块的触发事件
    pub fn get(&self, module: &str) -> Option<&TriggerEvent> {
        self.events.iter().find(|e| e.module.as_str() == module)
    }

    pub fn contains(&self, module: &str) -> bool {
        self.get(module).is_some()
    }

    /// 触发的模块代码，按发现顺序
    pub fn modules(&self) -> Vec<&ModuleId> {
        self.events.iter().map(|e| &e.module).collect()
    }

    /// 历经的阶段数（最大 time + 1），空历程为 0
    pub fn stage_count(&self) -> usize {
        self.events.last().map(|e| e.time + 1).unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a TriggerEvent;
    type IntoIter = std::slice::Iter<'a, TriggerEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// 机率保留 4 位小数
///
/// 按浮点数的精确值取整：0.9 * 0.85 * 0.85 实际存储为 0.650249...，结果为 0.6502。
pub fn round_probability(probability: f64) -> f64 {
    format!("{probability:.4}").parse().unwrap_or(probability)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(module: &str, source: TriggerSource, probability: f64, time: usize) -> TriggerEvent {
        TriggerEvent {
            module: module.into(),
            triggered_by: source,
            probability,
            time,
        }
    }

    #[test]
    fn test_round_probability() {
        assert_eq!(round_probability(0.765), 0.765);
        assert_eq!(round_probability(0.123_46), 0.1235);
        assert_eq!(round_probability(0.123_44), 0.1234);
        assert_eq!(round_probability(1.0), 1.0);
        assert_eq!(round_probability(0.0), 0.0);
    }

    #[test]
    fn test_round_probability_uses_exact_binary_value() {
        // 0.9 * 0.85 * 0.85 存储为 0.6502499999...，不是中点
        assert_eq!(round_probability(0.9 * 0.85 * 0.85), 0.6502);
        assert_eq!(round_probability(0.9 * 0.85 * 0.85 * 0.85), 0.5527);
    }

    #[test]
    fn test_trigger_source_serializes_as_string() {
        let model = serde_json::to_string(&TriggerSource::Model).unwrap();
        assert_eq!(model, "\"Model\"");

        let module = serde_json::to_string(&TriggerSource::Module("R2".into())).unwrap();
        assert_eq!(module, "\"R2\"");

        let parsed: TriggerSource = serde_json::from_str("\"C1\"").unwrap();
        assert_eq!(parsed, TriggerSource::Module("C1".into()));
        let parsed: TriggerSource = serde_json::from_str("\"Model\"").unwrap();
        assert!(parsed.is_model());
    }

    #[test]
    fn test_trace_queries() {
        let trace = Trace::new(vec![
            event("R2", TriggerSource::Model, 0.9, 0),
            event("C1", TriggerSource::Module("R2".into()), 0.765, 1),
        ]);

        assert_eq!(trace.len(), 2);
        assert_eq!(trace.stage_count(), 2);
        assert!(trace.contains("C1"));
        assert!(!trace.contains("R3"));
        assert_eq!(
            trace.get("C1").and_then(|e| e.triggered_by.module()),
            Some(&ModuleId::from("R2"))
        );
        assert_eq!(trace.modules(), vec![&ModuleId::from("R2"), &ModuleId::from("C1")]);
    }

    #[test]
    fn test_empty_trace() {
        let trace = Trace::default();
        assert!(trace.is_empty());
        assert_eq!(trace.stage_count(), 0);
        assert_eq!(serde_json::to_string(&trace).unwrap(), "[]");
    }
}
