//! 模拟历程导出
//!
//! 表格形式每个事件一行，列为 module, triggered_by, probability, time。

use std::io::Write;

use crate::error::Result;
use crate::models::Trace;

/// CSV 表头
pub const CSV_HEADER: [&str; 4] = ["module", "triggered_by", "probability", "time"];

impl Trace {
    /// 写出 CSV，空历程也会写出表头
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        csv_writer.write_record(CSV_HEADER)?;
        for event in self {
            csv_writer.serialize(event)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{Trace, TriggerEvent, TriggerSource};

    fn sample_trace() -> Trace {
        Trace::new(vec![
            TriggerEvent {
                module: "R2".into(),
                triggered_by: TriggerSource::Model,
                probability: 0.9,
                time: 0,
            },
            TriggerEvent {
                module: "C1".into(),
                triggered_by: TriggerSource::Module("R2".into()),
                probability: 0.765,
                time: 1,
            },
        ])
    }

    #[test]
    fn test_csv_export() {
        let csv = sample_trace().to_csv_string().unwrap();
        assert_eq!(
            csv,
            "module,triggered_by,probability,time\nR2,Model,0.9,0\nC1,R2,0.765,1\n"
        );
    }

    #[test]
    fn test_empty_trace_writes_header_only() {
        let csv = Trace::default().to_csv_string().unwrap();
        assert_eq!(csv, "module,triggered_by,probability,time\n");
    }

    #[test]
    fn test_json_export() {
        let json = sample_trace().to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["module"], "R2");
        assert_eq!(value[0]["triggered_by"], "Model");
        assert_eq!(value[1]["triggered_by"], "R2");
        assert_eq!(value[1]["time"], 1);
    }
}
