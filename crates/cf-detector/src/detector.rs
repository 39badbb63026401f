//! Per-series pipelines fed from a [`SampleSource`] and drained into an [`EventSink`]

use std::collections::BTreeMap;

use cf_changepoint::{ChangeFinder, ConfigurableDetector, ModelSelector, OrderSelection, Sst};
use cf_core::{Error, Result};
use tracing::{debug, info, instrument, warn};

use crate::config::{DetectorConfig, SeriesConfig};
use crate::record::{change_metric_name, outlier_metric_name, AnomalyRecord, RawSample};
use crate::sink::EventSink;
use crate::source::SampleSource;
use crate::time::TimeRange;

/// Highest AR order tried when a series leaves `k` unset
pub const DEFAULT_MAX_K: usize = 50;

/// Pick the AR order of `query` from the samples in `range`
pub fn select_order<S: SampleSource + ?Sized>(
    source: &S,
    query: &str,
    range: TimeRange,
    selector: &ModelSelector,
) -> Result<OrderSelection> {
    let samples = source.get_series(range.start, range.end, query)?;
    let values: Vec<f64> = samples.iter().map(RawSample::value).collect();
    selector.select(&values)
}

/// [`select_order`] for every configured series
pub fn select_orders<S: SampleSource + ?Sized>(
    config: &DetectorConfig,
    source: &S,
    range: TimeRange,
    selector: &ModelSelector,
) -> Result<BTreeMap<String, OrderSelection>> {
    config
        .series
        .iter()
        .map(|(name, series)| {
            let selection = select_order(source, &series.query, range, selector)?;
            Ok((name.clone(), selection))
        })
        .collect()
}

/// State of one monitored series
#[derive(Debug, Clone)]
pub struct SeriesDetector {
    name: String,
    query: String,
    finder: ChangeFinder,
    sst: Option<Sst>,
    outlier_metric: String,
    change_metric: String,
    last_time: Option<i64>,
}

impl SeriesDetector {
    pub fn new(name: &str, config: &SeriesConfig, k: usize) -> Result<Self> {
        let finder = ChangeFinder::new(config.parameters(k)?)?;
        let sst = config.sst_parameters().map(Sst::new).transpose()?;
        Ok(Self {
            name: name.to_string(),
            query: config.query.clone(),
            finder,
            sst,
            outlier_metric: outlier_metric_name(name),
            change_metric: change_metric_name(name),
            last_time: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn finder(&self) -> &ChangeFinder {
        &self.finder
    }

    /// AR order of both pipeline stages
    pub fn order(&self) -> usize {
        self.finder.parameters().k
    }

    /// Time of the newest sample fed so far, in epoch milliseconds
    pub fn last_time(&self) -> Option<i64> {
        self.last_time
    }

    /// Score a batch of samples, one record per accepted sample
    ///
    /// Samples are sorted by time first. Samples not newer than the last one
    /// already fed are dropped. SST, when configured, scans only the
    /// current batch, so samples too close to either end get no SST score.
    /// A batch holding a non-finite value is rejected whole and leaves the
    /// pipeline untouched.
    pub fn process(&mut self, mut samples: Vec<RawSample>) -> Result<Vec<AnomalyRecord>> {
        samples.sort_by_key(|s| s.time);

        if let Some(last) = self.last_time {
            let before = samples.len();
            samples.retain(|s| s.time > last);
            let dropped = before - samples.len();
            if dropped > 0 {
                warn!(series = %self.name, dropped, last_time = last, "dropped out-of-order samples");
            }
        }

        self.check_batch(&samples)?;
        let values: Vec<f64> = samples.iter().map(RawSample::value).collect();
        let sst_scores = self.sst_scores(&values)?;

        let mut records = Vec::with_capacity(samples.len());
        for (i, sample) in samples.iter().enumerate() {
            let score = self.finder.update(values[i])?;
            records.push(AnomalyRecord {
                metric: sample.metric.clone(),
                raw_value: values[i],
                outlier_metric_name: self.outlier_metric.clone(),
                score_outlier: score.outlier,
                change_metric_name: self.change_metric.clone(),
                score_change: score.change,
                score_sst: sst_scores.as_ref().and_then(|s| s[i]),
                time: sample.time_secs(),
            });
        }

        if let Some(last) = samples.last() {
            self.last_time = Some(last.time);
        }
        Ok(records)
    }

    fn check_batch(&self, samples: &[RawSample]) -> Result<()> {
        match samples.iter().find(|s| !s.value().is_finite()) {
            Some(bad) => Err(Error::Upstream(format!(
                "series {}: non-finite value at {} ms",
                self.name, bad.time
            ))),
            None => Ok(()),
        }
    }

    fn sst_scores(&mut self, values: &[f64]) -> Result<Option<Vec<Option<f64>>>> {
        let Some(sst) = self.sst.as_mut() else {
            return Ok(None);
        };
        let w = sst.parameters().window;
        let needed = 3 * w + 2;
        if values.len() < needed {
            debug!(series = %self.name, samples = values.len(), needed, "batch too short for SST");
            return Ok(Some(vec![None; values.len()]));
        }
        let scores = sst.scan(values)?;
        let scored = (2 * w + 1)..(values.len() - w);
        Ok(Some(
            scores
                .into_iter()
                .enumerate()
                .map(|(t, s)| scored.contains(&t).then_some(s))
                .collect(),
        ))
    }
}

/// Every configured series behind one sample source
#[derive(Debug)]
pub struct Detector<S> {
    source: S,
    tag_prefix: String,
    series: Vec<SeriesDetector>,
}

impl<S: SampleSource> Detector<S> {
    /// Build one pipeline per series
    ///
    /// Series without a configured `k` get the AIC-optimal order over the
    /// day before `now` (epoch seconds).
    pub fn new(config: &DetectorConfig, source: S, now: i64) -> Result<Self> {
        config.validate()?;
        let selector = ModelSelector::new(DEFAULT_MAX_K)?;

        let mut series = Vec::with_capacity(config.series.len());
        for (name, series_config) in &config.series {
            let k = match series_config.k {
                Some(k) => k,
                None => {
                    let selection = select_order(
                        &source,
                        &series_config.query,
                        TimeRange::last_day(now),
                        &selector,
                    )?;
                    info!(series = %name, k = selection.order, aic = selection.aic, "selected AR order");
                    selection.order
                }
            };
            series.push(SeriesDetector::new(name, series_config, k)?);
        }

        Ok(Self {
            source,
            tag_prefix: config.tag_prefix.clone(),
            series,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn series(&self) -> &[SeriesDetector] {
        &self.series
    }

    /// Tag records of `series` are emitted under
    pub fn tag(&self, series: &str) -> String {
        format!("{}.{series}", self.tag_prefix)
    }

    /// Pull `[start, end)` (epoch seconds) of every series, score it and emit the records
    ///
    /// Returns the number of records emitted. Records of one series are
    /// emitted together, series in name order. Every batch is checked before
    /// any is scored, so a bad sample in one series leaves all pipelines as
    /// they were.
    #[instrument(skip(self, sink), fields(series = self.series.len()))]
    pub fn query(&mut self, start: i64, end: i64, sink: &mut dyn EventSink) -> Result<usize> {
        let batches = self
            .series
            .iter()
            .map(|s| self.source.get_series(start, end, &s.query))
            .collect::<Result<Vec<_>>>()?;
        for (series, batch) in self.series.iter().zip(&batches) {
            series.check_batch(batch)?;
        }

        let results = self.process_batches(batches)?;

        let mut emitted = 0;
        for (series, records) in self.series.iter().zip(results) {
            let tag = self.tag(&series.name);
            for record in &records {
                sink.emit(&tag, record)?;
            }
            emitted += records.len();
        }
        sink.flush()?;
        debug!(emitted, "query complete");
        Ok(emitted)
    }

    #[cfg(feature = "parallel")]
    fn process_batches(&mut self, batches: Vec<Vec<RawSample>>) -> Result<Vec<Vec<AnomalyRecord>>> {
        use rayon::prelude::*;

        self.series
            .par_iter_mut()
            .zip(batches)
            .map(|(series, batch)| series.process(batch))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn process_batches(&mut self, batches: Vec<Vec<RawSample>>) -> Result<Vec<Vec<AnomalyRecord>>> {
        self.series
            .iter_mut()
            .zip(batches)
            .map(|(series, batch)| series.process(batch))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use crate::source::CsvSampleSource;

    fn source(values: &[(i64, Option<f64>)]) -> CsvSampleSource {
        CsvSampleSource::from_samples(
            values
                .iter()
                .map(|&(t, v)| RawSample::new("cpu", t, v))
                .collect(),
        )
    }

    fn config(k: Option<usize>) -> DetectorConfig {
        let mut series = SeriesConfig::new("cpu");
        series.k = k;
        series.r = Some(0.3);
        DetectorConfig::default().with_series("web", series)
    }

    #[test]
    fn test_records_follow_time_order_and_nulls_become_zero() {
        let source = source(&[(3000, Some(3.0)), (1000, Some(1.0)), (2000, None)]);
        let mut detector = Detector::new(&config(Some(1)), source, 0).unwrap();
        let mut sink = MemorySink::new();

        let emitted = detector.query(0, 10, &mut sink).unwrap();
        assert_eq!(emitted, 3);

        let records: Vec<&AnomalyRecord> = sink.records_for("changefinder.web").collect();
        let times: Vec<i64> = records.iter().map(|r| r.time).collect();
        assert_eq!(times, vec![1, 2, 3]);
        assert_eq!(records[1].raw_value, 0.0);
        assert_eq!(records[0].outlier_metric_name, "changefinder.outlier.web");
        assert_eq!(records[0].change_metric_name, "changefinder.change.web");
        assert!(records.iter().all(|r| r.score_sst.is_none()));
    }

    #[test]
    fn test_replayed_samples_are_dropped() {
        let source = source(&[(1000, Some(1.0)), (2000, Some(2.0)), (3000, Some(3.0))]);
        let mut detector = Detector::new(&config(Some(1)), source, 0).unwrap();
        let mut sink = MemorySink::new();

        assert_eq!(detector.query(0, 3, &mut sink).unwrap(), 2);
        // overlapping window: only the 3s sample is new
        assert_eq!(detector.query(0, 4, &mut sink).unwrap(), 1);
        assert_eq!(detector.series()[0].last_time(), Some(3000));
    }

    #[test]
    fn test_non_finite_batch_leaves_pipeline_untouched() {
        let samples = [(1000, Some(1.0)), (2000, Some(2.0)), (3000, Some(f64::NAN))];
        let mut detector = Detector::new(&config(Some(1)), source(&samples), 0).unwrap();
        let mut sink = MemorySink::new();

        let err = detector.query(0, 10, &mut sink).unwrap_err();
        assert!(matches!(err, Error::Upstream(_)), "{err}");
        assert!(sink.events.is_empty());
        assert_eq!(detector.series()[0].last_time(), None);

        // the clean prefix scores as it would on a fresh pipeline
        assert_eq!(detector.query(0, 3, &mut sink).unwrap(), 2);
        assert_eq!(detector.series()[0].last_time(), Some(2000));
        let mut fresh = Detector::new(&config(Some(1)), source(&samples), 0).unwrap();
        let mut expected = MemorySink::new();
        fresh.query(0, 3, &mut expected).unwrap();
        assert_eq!(sink.events, expected.events);
    }

    #[test]
    fn test_bad_batch_in_one_series_blocks_every_series() {
        let samples = vec![
            RawSample::new("cpu", 1000, Some(1.0)),
            RawSample::new("mem", 1000, Some(f64::INFINITY)),
        ];
        let mut mem = SeriesConfig::new("mem");
        mem.k = Some(1);
        let config = config(Some(1)).with_series("db", mem);
        let mut detector =
            Detector::new(&config, CsvSampleSource::from_samples(samples), 0).unwrap();
        let mut sink = MemorySink::new();

        assert!(detector.query(0, 10, &mut sink).is_err());
        assert!(detector.series().iter().all(|s| s.last_time().is_none()));
    }

    #[test]
    fn test_missing_k_is_selected_from_the_previous_day() {
        let now = 200_000;
        let samples: Vec<(i64, Option<f64>)> = (0..200)
            .map(|i| {
                let t = (now - 50_000 + i * 60) * 1000;
                (t, Some(((i % 7) as f64).sin()))
            })
            .collect();
        let detector = Detector::new(&config(None), source(&samples), now).unwrap();
        let k = detector.series()[0].order();
        assert!((1..=DEFAULT_MAX_K).contains(&k));
    }

    #[test]
    fn test_missing_k_without_history_fails() {
        let err = Detector::new(&config(None), source(&[]), 100_000).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_sst_scores_only_inside_scanned_range() {
        let mut series = SeriesConfig::new("cpu");
        series.k = Some(1);
        series.sst = Some(crate::config::SstConfig {
            window: 3,
            rank: 1,
            method: Default::default(),
        });
        let config = DetectorConfig::default().with_series("web", series);

        let samples: Vec<(i64, Option<f64>)> = (0..20)
            .map(|i| (i * 1000, Some(if i < 10 { 0.0 } else { 5.0 } + (i as f64).sin())))
            .collect();
        let mut detector = Detector::new(&config, source(&samples), 0).unwrap();
        let mut sink = MemorySink::new();
        detector.query(0, 100, &mut sink).unwrap();

        let sst: Vec<Option<f64>> = sink.records_for("changefinder.web").map(|r| r.score_sst).collect();
        assert_eq!(sst.len(), 20);
        // scored range is [2w + 1, n - w) = [7, 17)
        assert!(sst[..7].iter().all(Option::is_none));
        assert!(sst[7..17].iter().all(Option::is_some));
        assert!(sst[17..].iter().all(Option::is_none));
        assert!(sst[7..17].iter().flatten().all(|s| (0.0..=1.0).contains(s)));
    }
}
