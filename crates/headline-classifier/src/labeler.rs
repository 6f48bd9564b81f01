//! 新闻标题关键词标注
//!
//! 为训练资料批量打模块标签：命中任一关键词的模块都会被标上，
//! 全部未命中时标为 `UNK`。

use std::io::{Read, Write};

use tracing::{debug, info};

use crate::error::{ClassifierError, Result};
use crate::keywords::KeywordMap;

/// 未命中任何关键词时的标签
pub const UNKNOWN_LABEL: &str = "UNK";

const TITLE_COLUMN: &str = "title";
const LABEL_SEPARATOR: &str = ";";

/// 批量标注统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelStats {
    pub rows: usize,
    pub labeled: usize,
    pub unknown: usize,
}

#[derive(Debug, Clone)]
pub struct KeywordLabeler {
    keywords: KeywordMap,
}

impl KeywordLabeler {
    pub fn new(keywords: KeywordMap) -> Self {
        Self { keywords }
    }

    pub fn builtin() -> Self {
        Self::new(KeywordMap::builtin())
    }

    /// 标注单条标题，按关键词表顺序返回模块代码
    pub fn label(&self, title: &str) -> Vec<String> {
        let labels: Vec<String> = self
            .keywords
            .hits(title)
            .into_iter()
            .filter(|(_, n)| *n > 0)
            .map(|(module, _)| module.to_string())
            .collect();

        if labels.is_empty() {
            vec![UNKNOWN_LABEL.to_string()]
        } else {
            labels
        }
    }

    /// 读取含 `title` 列的 CSV，输出 `title,modules` 两列
    pub fn label_csv<R: Read, W: Write>(&self, input: R, output: W) -> Result<LabelStats> {
        let mut reader = csv::Reader::from_reader(input);
        let title_index = reader
            .headers()?
            .iter()
            .position(|h| h.trim() == TITLE_COLUMN)
            .ok_or_else(|| ClassifierError::MissingColumn(TITLE_COLUMN.to_string()))?;

        let mut writer = csv::Writer::from_writer(output);
        writer.write_record([TITLE_COLUMN, "modules"])?;

        let mut stats = LabelStats::default();
        for record in reader.records() {
            let record = record?;
            let title = record.get(title_index).unwrap_or_default();
            let labels = self.label(title);

            stats.rows += 1;
            if labels.len() == 1 && labels[0] == UNKNOWN_LABEL {
                stats.unknown += 1;
            } else {
                stats.labeled += 1;
            }

            debug!(title, labels = ?labels, "标题已标注");
            writer.write_record([title, labels.join(LABEL_SEPARATOR).as_str()])?;
        }
        writer.flush()?;

        info!(
            rows = stats.rows,
            labeled = stats.labeled,
            unknown = stats.unknown,
            "关键词标注完成"
        );
        Ok(stats)
    }
}

impl Default for KeywordLabeler {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_multiple_modules() {
        let labeler = KeywordLabeler::builtin();
        let labels = labeler.label("Israel strikes back after Iran missile barrage");
        assert_eq!(labels, vec!["R2", "C1"]);
    }

    #[test]
    fn test_label_unknown() {
        let labeler = KeywordLabeler::builtin();
        assert_eq!(labeler.label("Stock markets close higher"), vec![UNKNOWN_LABEL]);
    }

    #[test]
    fn test_label_csv() {
        let labeler = KeywordLabeler::builtin();
        let input = "id,title\n1,Ceasefire talks resume in Cairo\n2,Weather is mild\n";
        let mut output = Vec::new();

        let stats = labeler.label_csv(input.as_bytes(), &mut output).unwrap();

        assert_eq!(
            stats,
            LabelStats {
                rows: 2,
                labeled: 1,
                unknown: 1
            }
        );
        let written = String::from_utf8(output).unwrap();
        assert_eq!(
            written,
            "title,modules\nCeasefire talks resume in Cairo,C2\nWeather is mild,UNK\n"
        );
    }

    #[test]
    fn test_label_csv_joins_with_semicolon() {
        let labeler = KeywordLabeler::builtin();
        let input = "title\nHezbollah fires on naval convoy near Hormuz\n";
        let mut output = Vec::new();

        labeler.label_csv(input.as_bytes(), &mut output).unwrap();

        let written = String::from_utf8(output).unwrap();
        assert!(written.ends_with("Hezbollah fires on naval convoy near Hormuz,R4;R3\n"));
    }

    #[test]
    fn test_label_csv_missing_title_column() {
        let labeler = KeywordLabeler::builtin();
        let err = labeler
            .label_csv("headline\nfoo\n".as_bytes(), Vec::new())
            .unwrap_err();
        assert!(matches!(err, ClassifierError::MissingColumn(col) if col == "title"));
    }
}
