use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cf_changepoint::{ArSolver, ModelSelector, SimpleDetector, Sst, SstParameters};
use cf_detector::{
    init_logging, select_orders, CsvSampleSource, Detector, DetectorConfig, JsonLinesSink,
    LogFormat, SampleSource, TimeRange, DEFAULT_MAX_K,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(name = "cf")]
#[command(author, version, about = "Outlier and change-point scores for metric series", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Write logs to stderr as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info", env = "CF_LOG_LEVEL")]
    log_level: String,
}

#[derive(Subcommand)]
enum Command {
    /// Pick the AR order of every configured series by AIC
    Select {
        #[command(flatten)]
        inputs: Inputs,

        #[command(flatten)]
        range: RangeArgs,

        /// Highest AR order to try
        #[arg(long, default_value_t = DEFAULT_MAX_K)]
        max_k: usize,

        #[arg(long, value_enum, default_value_t = SolverArg::Levinson)]
        solver: SolverArg,
    },
    /// Score a time range and write one JSON record per sample to stdout
    Replay {
        #[command(flatten)]
        inputs: Inputs,

        #[command(flatten)]
        range: RangeArgs,
    },
    /// Singular Spectrum Transformation scores of one metric
    Sst {
        /// CSV file with metric,time,value,scope rows
        #[arg(long)]
        data: PathBuf,

        #[arg(long)]
        metric: String,

        #[arg(long)]
        window: usize,

        #[arg(long, default_value_t = 1)]
        rank: usize,

        /// Use the Lanczos approximation instead of a full SVD
        #[arg(long)]
        iterative: bool,

        /// Report samples scoring above this value
        #[arg(long)]
        threshold: Option<f64>,
    },
}

#[derive(Args)]
struct Inputs {
    /// JSON detector configuration
    #[arg(long)]
    config: PathBuf,

    /// CSV file with metric,time,value,scope rows
    #[arg(long)]
    data: PathBuf,
}

#[derive(Args)]
struct RangeArgs {
    /// Range start, `YYYY-MM-DD HH:MM`
    #[arg(long)]
    start: String,

    /// Range end, `YYYY-MM-DD HH:MM`; at most one day after start
    #[arg(long)]
    end: String,

    /// Hours east of UTC that start and end are given in
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    utc_offset: i32,
}

impl RangeArgs {
    fn range(&self) -> Result<TimeRange> {
        Ok(TimeRange::parse(&self.start, &self.end, self.utc_offset)?)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SolverArg {
    Levinson,
    Toeplitz,
    Burg,
}

impl From<SolverArg> for ArSolver {
    fn from(arg: SolverArg) -> Self {
        match arg {
            SolverArg::Levinson => ArSolver::Levinson,
            SolverArg::Toeplitz => ArSolver::Toeplitz,
            SolverArg::Burg => ArSolver::Burg,
        }
    }
}

#[derive(Serialize)]
struct SstLine {
    index: usize,
    time: i64,
    value: f64,
    score: f64,
}

fn load(inputs: &Inputs) -> Result<(DetectorConfig, CsvSampleSource)> {
    let config = DetectorConfig::from_path(&inputs.config)
        .with_context(|| format!("loading {}", inputs.config.display()))?;
    let source = CsvSampleSource::from_path(&inputs.data)
        .with_context(|| format!("reading {}", inputs.data.display()))?;
    info!(series = config.series.len(), samples = source.len(), "inputs loaded");
    Ok((config, source))
}

fn select(inputs: &Inputs, range: TimeRange, max_k: usize, solver: ArSolver) -> Result<()> {
    let (config, source) = load(inputs)?;
    let selector = ModelSelector::new(max_k)?.with_solver(solver);
    let selections = select_orders(&config, &source, range, &selector)?;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &selections)?;
    writeln!(stdout)?;
    Ok(())
}

fn replay(inputs: &Inputs, range: TimeRange) -> Result<()> {
    let (config, source) = load(inputs)?;
    // unset orders are chosen from the day before the replayed range
    let mut detector = Detector::new(&config, source, range.start)?;

    let mut sink = JsonLinesSink::new(std::io::stdout().lock());
    let emitted = detector.query(range.start, range.end, &mut sink)?;
    info!(emitted, start = range.start, end = range.end, "replay complete");
    Ok(())
}

fn sst(data: &Path, metric: &str, params: SstParameters, threshold: Option<f64>) -> Result<()> {
    let source = CsvSampleSource::from_path(data)
        .with_context(|| format!("reading {}", data.display()))?;
    let samples = source.get_series(i64::MIN, i64::MAX, metric)?;
    let values: Vec<f64> = samples.iter().map(|s| s.value()).collect();

    let mut sst = Sst::new(params)?;
    if let Some(threshold) = threshold {
        sst = sst.with_threshold(threshold);
    }
    let result = sst.detect_simple(&values)?;

    let mut stdout = std::io::stdout().lock();
    for (index, (sample, &score)) in samples.iter().zip(result.statistics()).enumerate() {
        let line = SstLine {
            index,
            time: sample.time_secs(),
            value: sample.value(),
            score,
        };
        serde_json::to_writer(&mut stdout, &line)?;
        writeln!(stdout)?;
    }

    for point in result.changepoints() {
        info!(index = point.index, score = point.score, "change point");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Human
    };
    init_logging(format, &cli.log_level)?;

    match cli.command {
        Command::Select {
            inputs,
            range,
            max_k,
            solver,
        } => select(&inputs, range.range()?, max_k, solver.into()),
        Command::Replay { inputs, range } => replay(&inputs, range.range()?),
        Command::Sst {
            data,
            metric,
            window,
            rank,
            iterative,
            threshold,
        } => {
            let mut params = SstParameters::new(window, rank);
            if iterative {
                params = params.iterative();
            }
            sst(&data, &metric, params, threshold)
        }
    }
}
