//! Running ChangeFinder over monitored series
//!
//! Glue between the detectors of `cf-changepoint` and the outside world:
//! a [`SampleSource`] supplies samples per series, a [`Detector`] feeds them
//! through one pipeline per configured series, and an [`EventSink`] receives
//! one [`AnomalyRecord`] per processed sample.
//!
//! ```rust
//! use cf_detector::{CsvSampleSource, Detector, DetectorConfig, MemorySink};
//!
//! let data = "metric,time,value,scope\ncpu,1000,1.0,\ncpu,2000,,\ncpu,3000,3.0,\n";
//! let source = CsvSampleSource::from_reader(data.as_bytes()).unwrap();
//! let config: DetectorConfig = r#"{ "series": { "web": { "query": "cpu", "k": 1 } } }"#
//!     .parse()
//!     .unwrap();
//!
//! let mut detector = Detector::new(&config, source, 0).unwrap();
//! let mut sink = MemorySink::new();
//! assert_eq!(detector.query(0, 10, &mut sink).unwrap(), 3);
//! assert_eq!(sink.events[0].0, "changefinder.web");
//! ```

pub mod config;
pub mod detector;
pub mod logging;
pub mod record;
pub mod sink;
pub mod source;
pub mod time;

pub use config::{DetectorConfig, SeriesConfig, SstConfig};
pub use detector::{select_order, select_orders, Detector, SeriesDetector, DEFAULT_MAX_K};
pub use logging::{init_logging, LogFormat};
pub use record::{change_metric_name, outlier_metric_name, AnomalyRecord, RawSample};
pub use sink::{EventSink, JsonLinesSink, MemorySink};
pub use source::{CsvSampleSource, SampleSource};
pub use time::{parse_time, TimeRange, MAX_RANGE_SECS};
