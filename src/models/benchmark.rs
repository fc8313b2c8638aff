//! Benchmark and score table models

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::SCORES_SUBPATH;
use crate::error::{AppError, AppResult};

/// The four benchmarks of the allocator suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Benchmark {
    #[serde(rename = "cache-scratch")]
    CacheScratch,
    #[serde(rename = "cache-thrash")]
    CacheThrash,
    #[serde(rename = "larson")]
    Larson,
    #[serde(rename = "threadtest")]
    ThreadTest,
}

/// Grading category a benchmark's scalability score contributes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalabilityCategory {
    /// Raw multi-threaded speedup
    MultiThreaded,
    /// Resistance to false sharing
    FalseSharing,
}

impl Benchmark {
    /// All benchmarks, in the order their score files are read
    pub const ALL: [Benchmark; 4] = [
        Benchmark::CacheScratch,
        Benchmark::CacheThrash,
        Benchmark::Larson,
        Benchmark::ThreadTest,
    ];

    /// Directory name used by the benchmark driver
    pub fn name(&self) -> &'static str {
        match self {
            Benchmark::CacheScratch => "cache-scratch",
            Benchmark::CacheThrash => "cache-thrash",
            Benchmark::Larson => "larson",
            Benchmark::ThreadTest => "threadtest",
        }
    }

    /// Score file path relative to the benchmark directory
    pub fn scores_path(&self) -> PathBuf {
        PathBuf::from(self.name()).join(SCORES_SUBPATH)
    }

    pub fn category(&self) -> ScalabilityCategory {
        match self {
            Benchmark::CacheScratch | Benchmark::CacheThrash => ScalabilityCategory::FalseSharing,
            Benchmark::Larson | Benchmark::ThreadTest => ScalabilityCategory::MultiThreaded,
        }
    }
}

impl std::fmt::Display for Benchmark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Metric name to value mapping parsed from one score file.
///
/// No schema is enforced here; required metrics are checked by [`ScoreTable::require`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreTable(BTreeMap<String, f64>);

impl ScoreTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, metric: &str) -> Option<f64> {
        self.0.get(metric).copied()
    }

    /// Look up a metric the grade cannot be computed without
    pub fn require(&self, benchmark: Benchmark, metric: &'static str) -> AppResult<f64> {
        self.get(metric)
            .ok_or(AppError::RequiredMetricMissing { benchmark, metric })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for ScoreTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Score tables for the whole suite.
///
/// Only ever built when all four score files were read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuiteScores {
    pub cache_scratch: ScoreTable,
    pub cache_thrash: ScoreTable,
    pub larson: ScoreTable,
    pub threadtest: ScoreTable,
}

impl SuiteScores {
    pub fn table(&self, benchmark: Benchmark) -> &ScoreTable {
        match benchmark {
            Benchmark::CacheScratch => &self.cache_scratch,
            Benchmark::CacheThrash => &self.cache_thrash,
            Benchmark::Larson => &self.larson,
            Benchmark::ThreadTest => &self.threadtest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_path() {
        assert_eq!(
            Benchmark::CacheScratch.scores_path(),
            PathBuf::from("cache-scratch/Results/alloc/scores")
        );
        assert_eq!(
            Benchmark::ThreadTest.scores_path(),
            PathBuf::from("threadtest/Results/alloc/scores")
        );
    }

    #[test]
    fn test_categories() {
        assert_eq!(Benchmark::Larson.category(), ScalabilityCategory::MultiThreaded);
        assert_eq!(Benchmark::ThreadTest.category(), ScalabilityCategory::MultiThreaded);
        assert_eq!(Benchmark::CacheScratch.category(), ScalabilityCategory::FalseSharing);
        assert_eq!(Benchmark::CacheThrash.category(), ScalabilityCategory::FalseSharing);
    }

    #[test]
    fn test_require_metric() {
        let table: ScoreTable = [("sequential speed".to_string(), 0.8)].into_iter().collect();
        assert_eq!(
            table.require(Benchmark::Larson, "sequential speed").unwrap(),
            0.8
        );

        let err = table
            .require(Benchmark::Larson, "scalability score")
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::RequiredMetricMissing {
                benchmark: Benchmark::Larson,
                metric: "scalability score"
            }
        ));
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&Benchmark::ThreadTest).unwrap(),
            "\"threadtest\""
        );
        assert_eq!(
            serde_json::to_string(&Benchmark::CacheScratch).unwrap(),
            "\"cache-scratch\""
        );
    }
}
