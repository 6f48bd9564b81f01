//! 标题 -> 模块机率
//!
//! `ModuleClassifier` 只负责打分；过滤、取整与排序统一在 `predict_modules` 中完成，
//! 输出直接作为级联模拟的起始模块。

use cascade_engine::models::round_probability;
use cascade_engine::{ModuleId, SeedActivation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClassifierError, Result};
use crate::keywords::KeywordMap;

/// 单个模块的预测机率
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleScore {
    pub module: ModuleId,
    pub probability: f64,
}

impl ModuleScore {
    pub fn new(module: impl Into<ModuleId>, probability: f64) -> Self {
        Self {
            module: module.into(),
            probability,
        }
    }
}

/// 模块分类器
///
/// 返回每个已知模块的机率，顺序即模块的固定顺序。
#[cfg_attr(test, mockall::automock)]
pub trait ModuleClassifier {
    fn predict_proba(&self, headline: &str) -> Vec<ModuleScore>;
}

/// 关键词分类器
///
/// 模块机率 = 该模块命中的关键词数 / 全部模块命中总数；无命中时全部为 0。
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    keywords: KeywordMap,
}

impl KeywordClassifier {
    pub fn new(keywords: KeywordMap) -> Self {
        Self { keywords }
    }

    pub fn builtin() -> Self {
        Self::new(KeywordMap::builtin())
    }

    pub fn keywords(&self) -> &KeywordMap {
        &self.keywords
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ModuleClassifier for KeywordClassifier {
    fn predict_proba(&self, headline: &str) -> Vec<ModuleScore> {
        let hits = self.keywords.hits(headline);
        let total: usize = hits.iter().map(|(_, n)| n).sum();

        hits.into_iter()
            .map(|(module, n)| {
                let probability = if total == 0 {
                    0.0
                } else {
                    n as f64 / total as f64
                };
                ModuleScore::new(module.clone(), probability)
            })
            .collect()
    }
}

/// 预测起始模块
///
/// 保留机率 >= `threshold` 的模块（以未取整的值比较），机率取 4 位小数，
/// 按机率降序稳定排序；`top_only` 时只保留第一名。
pub fn predict_modules<C>(
    classifier: &C,
    headline: &str,
    threshold: f64,
    top_only: bool,
) -> Result<Vec<SeedActivation>>
where
    C: ModuleClassifier + ?Sized,
{
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(ClassifierError::InvalidThreshold(threshold));
    }

    let mut seeds: Vec<SeedActivation> = classifier
        .predict_proba(headline)
        .into_iter()
        .filter(|score| score.probability >= threshold)
        .map(|score| SeedActivation::new(score.module, round_probability(score.probability)))
        .collect();

    seeds.sort_by(|a, b| b.probability.total_cmp(&a.probability));

    if top_only {
        seeds.truncate(1);
    }

    debug!(
        headline,
        threshold,
        top_only,
        selected = seeds.len(),
        "标题分类完成"
    );

    Ok(seeds)
}
