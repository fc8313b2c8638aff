//! Grade result models

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::Benchmark;

/// Final performance grade and its weighted breakdown.
///
/// All values are percentages in [0, 100], unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeResult {
    /// Weighted total
    #[serde(rename = "final")]
    pub total: f64,
    /// Capped sequential speed score
    pub sequential: f64,
    /// Capped multi-threaded speedup score
    pub multi_threaded: f64,
    /// Capped false sharing avoidance score
    pub false_sharing: f64,
}

/// What the grading pipeline produced for this run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GradeOutcome {
    Graded(GradeResult),
    /// A score file could not be read; no partial grade is computed
    MissingScoreFile { benchmark: Benchmark, path: PathBuf },
    /// A score file was read but lacks a metric the grade depends on
    MissingMetric {
        benchmark: Benchmark,
        metric: String,
    },
}

impl GradeOutcome {
    pub fn grade(&self) -> Option<&GradeResult> {
        match self {
            GradeOutcome::Graded(grade) => Some(grade),
            _ => None,
        }
    }

    /// Fold a score-stage error into the report path.
    ///
    /// Returns the error back for anything that is not a score problem.
    pub fn from_score_error(err: AppError) -> Result<Self, AppError> {
        match err {
            AppError::MissingScoreFile {
                benchmark, path, ..
            } => Ok(GradeOutcome::MissingScoreFile { benchmark, path }),
            AppError::RequiredMetricMissing { benchmark, metric } => {
                Ok(GradeOutcome::MissingMetric {
                    benchmark,
                    metric: metric.to_string(),
                })
            }
            other => Err(other),
        }
    }
}
