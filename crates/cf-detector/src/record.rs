//! Samples flowing in from a source and records flowing out to a sink

use serde::{Deserialize, Serialize};

/// One observation of a monitored series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Name of the metric this sample belongs to
    pub metric: String,
    /// Epoch milliseconds
    pub time: i64,
    /// Missing observations are fed to the pipeline as 0.0
    pub raw_value: Option<f64>,
    #[serde(default)]
    pub scope: String,
}

impl RawSample {
    pub fn new(metric: impl Into<String>, time: i64, raw_value: Option<f64>) -> Self {
        Self {
            metric: metric.into(),
            time,
            raw_value,
            scope: String::new(),
        }
    }

    /// Value handed to the detectors
    pub fn value(&self) -> f64 {
        self.raw_value.unwrap_or(0.0)
    }

    /// Whole seconds since the epoch
    pub fn time_secs(&self) -> i64 {
        self.time.div_euclid(1000)
    }
}

/// Scores of one processed sample, ready for an [`EventSink`](crate::EventSink)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    /// Source metric
    pub metric: String,
    pub raw_value: f64,
    pub outlier_metric_name: String,
    pub score_outlier: f64,
    pub change_metric_name: String,
    pub score_change: f64,
    /// SST score, present when the series has an SST window configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_sst: Option<f64>,
    /// Epoch seconds
    pub time: i64,
}

/// Metric name carrying the outlier score of series `name`
pub fn outlier_metric_name(name: &str) -> String {
    format!("changefinder.outlier.{name}")
}

/// Metric name carrying the change score of series `name`
pub fn change_metric_name(name: &str) -> String {
    format!("changefinder.change.{name}")
}
