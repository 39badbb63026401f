//! Types used for change-point detection results

use std::fmt;

/// A sample flagged by a detector
#[derive(Debug, Clone, PartialEq)]
pub struct ChangePoint {
    /// Index in the time series of the flagged sample
    pub index: usize,
    /// Score that triggered the detection
    pub score: f64,
    /// Which stage or algorithm raised it
    pub change_type: Option<ChangeType>,
}

impl ChangePoint {
    /// Create a new change point
    pub fn new(index: usize, score: f64) -> Self {
        Self {
            index,
            score,
            change_type: None,
        }
    }

    /// Create a new change point with a specified change type
    pub fn with_type(index: usize, score: f64, change_type: ChangeType) -> Self {
        Self {
            index,
            score,
            change_type: Some(change_type),
        }
    }
}

impl fmt::Display for ChangePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.change_type {
            Some(change_type) => write!(
                f,
                "ChangePoint {{ index: {}, score: {:.3}, type: {} }}",
                self.index, self.score, change_type
            ),
            None => write!(
                f,
                "ChangePoint {{ index: {}, score: {:.3} }}",
                self.index, self.score
            ),
        }
    }
}

/// Kinds of events the detectors report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    /// Single surprising sample (ChangeFinder stage 1)
    Outlier,
    /// Persistent structural change (ChangeFinder stage 2)
    StructuralChange,
    /// Subspace change between trajectory matrices (SST)
    SubspaceChange,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeType::Outlier => write!(f, "Outlier"),
            ChangeType::StructuralChange => write!(f, "Structural Change"),
            ChangeType::SubspaceChange => write!(f, "Subspace Change"),
        }
    }
}

/// Result of running a detector over a whole series
#[derive(Debug, Clone)]
pub struct ChangePointResult {
    /// Detected change points, ascending by index
    changepoints: Vec<ChangePoint>,
    /// Algorithm used for detection
    algorithm: String,
    /// Total number of data points analyzed
    sample_size: usize,
    /// Per-sample score series
    statistics: Vec<f64>,
}

impl ChangePointResult {
    pub fn new(
        changepoints: Vec<ChangePoint>,
        algorithm: String,
        sample_size: usize,
        statistics: Vec<f64>,
    ) -> Self {
        Self {
            changepoints,
            algorithm,
            sample_size,
            statistics,
        }
    }

    pub fn changepoints(&self) -> &[ChangePoint] {
        &self.changepoints
    }

    pub fn count(&self) -> usize {
        self.changepoints.len()
    }

    pub fn has_changepoints(&self) -> bool {
        !self.changepoints.is_empty()
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Score of every sample; 0 where the detector was still warming up
    pub fn statistics(&self) -> &[f64] {
        &self.statistics
    }

    /// The change point with the highest score
    pub fn strongest(&self) -> Option<&ChangePoint> {
        self.changepoints
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }
}

impl fmt::Display for ChangePointResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ChangePoint Detection Result:")?;
        writeln!(f, "  Algorithm: {}", self.algorithm)?;
        writeln!(f, "  Sample size: {}", self.sample_size)?;
        writeln!(f, "  Changepoints detected: {}", self.count())?;

        if !self.changepoints.is_empty() {
            writeln!(f, "  Detected changepoints:")?;
            for cp in &self.changepoints {
                writeln!(f, "    {}", cp)?;
            }
        }

        Ok(())
    }
}

/// Turn a score series into change points
///
/// Every index whose score exceeds `threshold` is a candidate. A candidate
/// directly following another one (within one sample) is merged into it,
/// keeping the index and score of the strongest member of the run.
pub fn threshold_changepoints(
    scores: &[f64],
    threshold: f64,
    change_type: ChangeType,
) -> Vec<ChangePoint> {
    let mut changepoints: Vec<ChangePoint> = Vec::new();
    let mut last_hit: Option<usize> = None;

    for (index, &score) in scores.iter().enumerate() {
        if score <= threshold {
            continue;
        }
        let extends_run = matches!(last_hit, Some(prev) if index - prev <= 1);
        last_hit = Some(index);

        match changepoints.last_mut() {
            Some(current) if extends_run => {
                if score > current.score {
                    current.index = index;
                    current.score = score;
                }
            }
            _ => changepoints.push(ChangePoint::with_type(index, score, change_type)),
        }
    }

    changepoints
}
