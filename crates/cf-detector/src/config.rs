//! JSON configuration of the monitored series

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use cf_changepoint::{ArSolver, ChangeFinderParameters, ScoreKind, SstMethod, SstParameters};
use cf_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// SST window attached to a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SstConfig {
    #[serde(alias = "w")]
    pub window: usize,
    pub rank: usize,
    #[serde(default)]
    pub method: SstMethod,
}

/// One monitored series
///
/// Unset numeric fields fall back to [`ChangeFinderParameters::default`],
/// except `r_change` which defaults to `r / 2`. An unset `k` is chosen by
/// AIC over the day preceding detector start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeriesConfig {
    /// Metric name looked up in the sample source
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r_change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<usize>,
    #[serde(default, alias = "T1", skip_serializing_if = "Option::is_none")]
    pub t1: Option<usize>,
    #[serde(default, alias = "T2", skip_serializing_if = "Option::is_none")]
    pub t2: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<ArSolver>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sst: Option<SstConfig>,
}

impl SeriesConfig {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            r: None,
            r_change: None,
            k: None,
            t1: None,
            t2: None,
            score: None,
            solver: None,
            sst: None,
        }
    }

    /// Pipeline parameters with AR order `k`
    pub fn parameters(&self, k: usize) -> Result<ChangeFinderParameters> {
        let defaults = ChangeFinderParameters::default();
        let r = self.r.unwrap_or(defaults.r);
        let params = ChangeFinderParameters {
            r,
            r_change: self.r_change.unwrap_or(r / 2.0),
            k,
            t1: self.t1.unwrap_or(defaults.t1),
            t2: self.t2.unwrap_or(defaults.t2),
            score: self.score.unwrap_or(defaults.score),
            solver: self.solver.unwrap_or(defaults.solver),
            ..defaults
        };
        params.validate()?;
        Ok(params)
    }

    pub fn sst_parameters(&self) -> Option<SstParameters> {
        self.sst.as_ref().map(|sst| SstParameters {
            method: sst.method,
            ..SstParameters::new(sst.window, sst.rank)
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(Error::Configuration("query must not be empty".to_string()));
        }
        self.parameters(self.k.unwrap_or(1))?;
        if let Some(sst) = self.sst_parameters() {
            sst.validate()?;
        }
        Ok(())
    }
}

fn default_tag_prefix() -> String {
    "changefinder".to_string()
}

/// All monitored series and the tag prefix of their records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectorConfig {
    /// Series keyed by the name used in output metric names
    pub series: BTreeMap<String, SeriesConfig>,
    /// Prefix of the tag records are emitted under
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            series: BTreeMap::new(),
            tag_prefix: default_tag_prefix(),
        }
    }
}

impl DetectorConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        text.parse()
            .map_err(|e: Error| Error::Configuration(format!("{}: {e}", path.display())))
    }

    pub fn with_series(mut self, name: impl Into<String>, series: SeriesConfig) -> Self {
        self.series.insert(name.into(), series);
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, series) in &self.series {
            if name.is_empty() {
                return Err(Error::Configuration("series name must not be empty".to_string()));
            }
            series
                .validate()
                .map_err(|e| Error::Configuration(format!("series {name}: {e}")))?;
        }
        Ok(())
    }
}

impl FromStr for DetectorConfig {
    type Err = Error;

    /// Parse and validate a JSON document
    fn from_str(s: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(s).map_err(|e| Error::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
