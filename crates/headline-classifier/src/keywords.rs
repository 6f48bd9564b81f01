//! 模块关键词对照表

use cascade_engine::ModuleId;
use serde::{Deserialize, Serialize};

/// 单个模块的关键词
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRule {
    pub module: ModuleId,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new<I, S>(module: impl Into<ModuleId>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            module: module.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    /// 标题中命中的不同关键词数（不区分大小写的子串匹配）
    fn hits(&self, lowered_title: &str) -> usize {
        self.keywords
            .iter()
            .filter(|kw| !kw.is_empty() && lowered_title.contains(&kw.to_lowercase()))
            .count()
    }
}

/// 模块关键词对照表，规则顺序即输出顺序
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordMap {
    pub rules: Vec<KeywordRule>,
}

impl KeywordMap {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    /// 内置对照表（中英文关键词）
    pub fn builtin() -> Self {
        Self::new(vec![
            KeywordRule::new("R2", ["伊朗", "Iran", "飛彈", "missile", "導彈", "襲擊"]),
            KeywordRule::new("C1", ["以色列", "Israel", "反擊", "strike back", "空襲"]),
            KeywordRule::new("R4", ["真主黨", "Hezbollah", "proxy", "黎巴嫩", "武裝組織"]),
            KeywordRule::new("R3", ["荷莫茲", "Hormuz", "海峽", "油輪", "封鎖", "naval"]),
            KeywordRule::new("C2", ["停火", "ceasefire", "和談", "peace talks", "外交", "調停"]),
        ])
    }

    /// 各模块的关键词命中数，按规则顺序
    pub fn hits(&self, title: &str) -> Vec<(&ModuleId, usize)> {
        let lowered = title.to_lowercase();
        self.rules
            .iter()
            .map(|rule| (&rule.module, rule.hits(&lowered)))
            .collect()
    }
}
