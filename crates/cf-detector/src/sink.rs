//! Where scored records go

use std::io::Write;

use cf_core::Result;
use serde::Serialize;

use crate::record::AnomalyRecord;

/// A consumer of scored records
pub trait EventSink {
    /// Deliver one record under `tag`
    fn emit(&mut self, tag: &str, record: &AnomalyRecord) -> Result<()>;

    /// Push buffered records out; the default does nothing
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Serialize)]
struct TaggedRecord<'a> {
    tag: &'a str,
    record: &'a AnomalyRecord,
}

/// Writes one `{"tag": .., "record": {..}}` JSON object per line
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Lines written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn emit(&mut self, tag: &str, record: &AnomalyRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &TaggedRecord { tag, record })
            .map_err(|e| anyhow::Error::new(e).context("serializing record"))?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps every record in memory, in emission order
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub events: Vec<(String, AnomalyRecord)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records emitted under `tag`
    pub fn records_for<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a AnomalyRecord> + 'a {
        self.events
            .iter()
            .filter(move |(t, _)| t == tag)
            .map(|(_, r)| r)
    }
}

impl EventSink for MemorySink {
    fn emit(&mut self, tag: &str, record: &AnomalyRecord) -> Result<()> {
        self.events.push((tag.to_string(), record.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(time: i64) -> AnomalyRecord {
        AnomalyRecord {
            metric: "cpu".into(),
            raw_value: 1.0,
            outlier_metric_name: "changefinder.outlier.web".into(),
            score_outlier: 0.1,
            change_metric_name: "changefinder.change.web".into(),
            score_change: 0.2,
            score_sst: None,
            time,
        }
    }

    #[test]
    fn test_json_lines_layout() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.emit("cf.web", &record(1)).unwrap();
        sink.emit("cf.web", &record(2)).unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.written(), 2);

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["tag"], "cf.web");
        assert_eq!(first["record"]["time"], 1);
        assert_eq!(first["record"]["metric"], "cpu");
    }

    #[test]
    fn test_memory_sink_filters_by_tag() {
        let mut sink = MemorySink::new();
        sink.emit("a", &record(1)).unwrap();
        sink.emit("b", &record(2)).unwrap();
        sink.emit("a", &record(3)).unwrap();
        let times: Vec<i64> = sink.records_for("a").map(|r| r.time).collect();
        assert_eq!(times, vec![1, 3]);
    }
}
