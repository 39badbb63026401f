use approx::assert_relative_eq;
use cf_changepoint::ChangeFinder;
use cf_detector::{
    AnomalyRecord, CsvSampleSource, Detector, DetectorConfig, EventSink, JsonLinesSink,
    MemorySink, RawSample, SampleSource,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

const START_MS: i64 = 1_700_000_000_000;

/// CSV with one sample per minute: `cpu` shifts level at sample 50, `mem` is constant
fn csv_data(n: usize) -> String {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let noise = Normal::new(0.0, 1.0).unwrap();
    let mut out = String::from("metric,time,value,scope\n");
    for i in 0..n {
        let time = START_MS + i as i64 * 60_000;
        let level = if i < 50 { 0.0 } else { 10.0 };
        out.push_str(&format!("cpu,{time},{},host:a\n", level + noise.sample(&mut rng)));
        out.push_str(&format!("mem,{time},4.0,host:a\n"));
    }
    out
}

fn config() -> DetectorConfig {
    r#"{
        "series": {
            "web": { "query": "cpu", "r": 0.5, "r_change": 0.5, "k": 1, "T1": 7, "T2": 7 },
            "db": { "query": "mem", "r": 0.5, "k": 1 }
        }
    }"#
    .parse()
    .unwrap()
}

fn range_secs(n: usize) -> (i64, i64) {
    let start = START_MS / 1000;
    (start, start + n as i64 * 60)
}

#[test]
fn test_records_match_a_directly_fed_pipeline() {
    let data = csv_data(100);
    let source = CsvSampleSource::from_reader(data.as_bytes()).unwrap();
    let (start, end) = range_secs(100);
    let values: Vec<f64> = source
        .get_series(start, end, "cpu")
        .unwrap()
        .iter()
        .map(RawSample::value)
        .collect();

    let config = config();
    let mut detector = Detector::new(&config, source, start).unwrap();
    let mut sink = MemorySink::new();
    assert_eq!(detector.query(start, end, &mut sink).unwrap(), 200);

    let params = config.series["web"].parameters(1).unwrap();
    let mut finder = ChangeFinder::new(params).unwrap();
    let records: Vec<&AnomalyRecord> = sink.records_for("changefinder.web").collect();
    assert_eq!(records.len(), 100);
    for (record, &x) in records.iter().zip(&values) {
        let expected = finder.update(x).unwrap();
        assert_relative_eq!(record.raw_value, x);
        assert_relative_eq!(record.score_outlier, expected.outlier);
        assert_relative_eq!(record.score_change, expected.change);
    }
}

#[test]
fn test_level_shift_raises_outlier_score() {
    let data = csv_data(100);
    let source = CsvSampleSource::from_reader(data.as_bytes()).unwrap();
    let (start, end) = range_secs(100);
    let mut detector = Detector::new(&config(), source, start).unwrap();
    let mut sink = MemorySink::new();
    detector.query(start, end, &mut sink).unwrap();

    let outlier: Vec<f64> = sink
        .records_for("changefinder.web")
        .map(|r| r.score_outlier)
        .collect();
    let baseline = outlier[20..50].iter().sum::<f64>() / 30.0;
    assert!(
        outlier[50] > baseline,
        "first shifted sample {} vs baseline mean {baseline}",
        outlier[50]
    );

    let constant: Vec<f64> = sink
        .records_for("changefinder.db")
        .map(|r| r.score_change)
        .collect();
    assert!(constant[60..].iter().all(|&s| s.abs() < 1e-9));
}

#[test]
fn test_split_queries_equal_one_query() {
    let data = csv_data(80);
    let (start, end) = range_secs(80);
    let mid = start + 40 * 60;

    let mut whole = Detector::new(
        &config(),
        CsvSampleSource::from_reader(data.as_bytes()).unwrap(),
        start,
    )
    .unwrap();
    let mut one = MemorySink::new();
    whole.query(start, end, &mut one).unwrap();

    let mut split = Detector::new(
        &config(),
        CsvSampleSource::from_reader(data.as_bytes()).unwrap(),
        start,
    )
    .unwrap();
    let mut two = MemorySink::new();
    split.query(start, mid, &mut two).unwrap();
    split.query(mid, end, &mut two).unwrap();

    for tag in ["changefinder.web", "changefinder.db"] {
        let a: Vec<&AnomalyRecord> = one.records_for(tag).collect();
        let b: Vec<&AnomalyRecord> = two.records_for(tag).collect();
        assert_eq!(a, b);
    }
}

#[test]
fn test_json_lines_output() {
    let data = csv_data(10);
    let (start, end) = range_secs(10);
    let mut detector = Detector::new(
        &config(),
        CsvSampleSource::from_reader(data.as_bytes()).unwrap(),
        start,
    )
    .unwrap();

    let mut sink = JsonLinesSink::new(Vec::new());
    detector.query(start, end, &mut sink).unwrap();
    sink.flush().unwrap();
    let text = String::from_utf8(sink.into_inner()).unwrap();

    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 20);
    // series are emitted in name order
    assert_eq!(lines[0]["tag"], "changefinder.db");
    assert_eq!(lines[10]["tag"], "changefinder.web");
    assert_eq!(lines[10]["record"]["metric"], "cpu");
    assert_eq!(lines[10]["record"]["time"], start);
    assert_eq!(
        lines[10]["record"]["change_metric_name"],
        "changefinder.change.web"
    );
}
