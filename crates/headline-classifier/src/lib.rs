//! 新闻标题模块分类
//!
//! 为级联模拟提供起始模块：
//! - `ModuleClassifier` - 标题 -> 各模块机率，可替换为任意模型
//! - `KeywordClassifier` - 基于关键词命中数的内置分类器
//! - `predict_modules` - 按门槛过滤、保留 4 位小数并按机率降序排列
//! - `KeywordLabeler` - 批量为新闻标题打模块标签

pub mod classifier;
pub mod error;
pub mod keywords;
pub mod labeler;

pub use classifier::{KeywordClassifier, ModuleClassifier, ModuleScore, predict_modules};
pub use error::{ClassifierError, Result};
pub use keywords::{KeywordMap, KeywordRule};
pub use labeler::{KeywordLabeler, LabelStats, UNKNOWN_LABEL};
