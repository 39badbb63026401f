//! Where samples come from

use std::io;
use std::path::Path;

use cf_core::{Error, Result};
use serde::Deserialize;

use crate::record::RawSample;

/// A provider of time series samples
pub trait SampleSource {
    /// Samples of `query` with `start <= time < end`, both bounds in epoch seconds
    ///
    /// Implementations should return samples in ascending time order, though
    /// callers sort again before use.
    fn get_series(&self, start: i64, end: i64, query: &str) -> Result<Vec<RawSample>>;
}

/// Row layout of the CSV source: `metric,time,value,scope`
#[derive(Debug, Deserialize)]
struct CsvRow {
    metric: String,
    time: i64,
    value: Option<f64>,
    #[serde(default)]
    scope: Option<String>,
}

/// Samples loaded from a CSV file with a `metric,time,value,scope` header
///
/// `time` is in epoch milliseconds and an empty `value` is a missing
/// observation. Malformed rows are reported as [`Error::Upstream`].
#[derive(Debug, Clone, Default)]
pub struct CsvSampleSource {
    samples: Vec<RawSample>,
}

impl CsvSampleSource {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(io::BufReader::new(file))
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut samples = Vec::new();
        for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
            // header is line 1
            let row = row.map_err(|e| Error::Upstream(format!("row {}: {e}", line + 2)))?;
            if row.value.is_some_and(|v| !v.is_finite()) {
                return Err(Error::Upstream(format!(
                    "row {}: non-finite value for {}",
                    line + 2,
                    row.metric
                )));
            }
            samples.push(RawSample {
                metric: row.metric,
                time: row.time,
                raw_value: row.value,
                scope: row.scope.unwrap_or_default(),
            });
        }
        Ok(Self { samples })
    }

    pub fn from_samples(samples: Vec<RawSample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Distinct metric names, sorted
    pub fn metrics(&self) -> Vec<String> {
        let mut names: Vec<String> = self.samples.iter().map(|s| s.metric.clone()).collect();
        names.sort();
        names.dedup();
        names
    }
}

impl SampleSource for CsvSampleSource {
    fn get_series(&self, start: i64, end: i64, query: &str) -> Result<Vec<RawSample>> {
        let mut series: Vec<RawSample> = self
            .samples
            .iter()
            .filter(|s| s.metric == query && (start..end).contains(&s.time_secs()))
            .cloned()
            .collect();
        series.sort_by_key(|s| s.time);
        Ok(series)
    }
}
