//! Grade calculation
//!
//! Mark breakdown, each relative to libc malloc:
//! - 15% single threaded performance (`sequential speed` of all four benchmarks)
//! - 65% multi-threaded performance (`scalability score` of larson and threadtest)
//! - 20% false sharing avoidance (`scalability score` of cache-scratch and cache-thrash)
//!
//! Each average is divided by its threshold and capped at full marks.

use crate::config::ThresholdConfig;
use crate::constants::{metrics, weights};
use crate::error::AppResult;
use crate::models::{Benchmark, GradeResult, ScalabilityCategory, SuiteScores};

/// Turns the suite's score tables into a weighted grade
#[derive(Debug, Clone)]
pub struct GradeCalculator {
    thresholds: ThresholdConfig,
}

impl GradeCalculator {
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self { thresholds }
    }

    /// Compute the grade. A missing required metric is an error, never a zero.
    pub fn compute(&self, scores: &SuiteScores) -> AppResult<GradeResult> {
        let sequential_speed_avg = mean_of(scores, &Benchmark::ALL, metrics::SEQUENTIAL_SPEED)?;
        let multi_threaded_speedup_avg = mean_of(
            scores,
            &benchmarks_in(ScalabilityCategory::MultiThreaded),
            metrics::SCALABILITY_SCORE,
        )?;
        let false_sharing_avoidance_avg = mean_of(
            scores,
            &benchmarks_in(ScalabilityCategory::FalseSharing),
            metrics::SCALABILITY_SCORE,
        )?;

        let sequential = capped(sequential_speed_avg / self.thresholds.sequential_speed);
        let multi_threaded =
            capped(multi_threaded_speedup_avg / self.thresholds.multi_threaded_speedup);
        let false_sharing =
            capped(false_sharing_avoidance_avg / self.thresholds.false_sharing_avoidance);

        let total = (sequential * weights::SEQUENTIAL
            + multi_threaded * weights::MULTI_THREADED
            + false_sharing * weights::FALSE_SHARING)
            * 100.0;

        tracing::debug!(
            sequential_speed_avg,
            multi_threaded_speedup_avg,
            false_sharing_avoidance_avg,
            total,
            "Computed performance grade"
        );

        Ok(GradeResult {
            total,
            sequential: sequential * 100.0,
            multi_threaded: multi_threaded * 100.0,
            false_sharing: false_sharing * 100.0,
        })
    }
}

impl Default for GradeCalculator {
    fn default() -> Self {
        Self::new(ThresholdConfig::default())
    }
}

/// Benchmarks whose scalability score feeds `category`, in read order
fn benchmarks_in(category: ScalabilityCategory) -> Vec<Benchmark> {
    Benchmark::ALL
        .into_iter()
        .filter(|b| b.category() == category)
        .collect()
}

fn mean_of(
    scores: &SuiteScores,
    benchmarks: &[Benchmark],
    metric: &'static str,
) -> AppResult<f64> {
    let mut sum = 0.0;
    for &benchmark in benchmarks {
        sum += scores.table(benchmark).require(benchmark, metric)?;
    }
    Ok(sum / benchmarks.len() as f64)
}

/// Exceeding the threshold earns no bonus; a negative score earns nothing
fn capped(score: f64) -> f64 {
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::ScoreTable;

    fn table(sequential: f64, scalability: f64) -> ScoreTable {
        [
            (metrics::SEQUENTIAL_SPEED.to_string(), sequential),
            (metrics::SCALABILITY_SCORE.to_string(), scalability),
        ]
        .into_iter()
        .collect()
    }

    fn suite(seq: f64, multi: f64, false_sharing: f64) -> SuiteScores {
        SuiteScores {
            cache_scratch: table(seq, false_sharing),
            cache_thrash: table(seq, false_sharing),
            larson: table(seq, multi),
            threadtest: table(seq, multi),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_full_marks() {
        let grade = GradeCalculator::default().compute(&suite(1.0, 1.0, 1.0)).unwrap();
        assert_close(grade.total, 100.0);
        assert_close(grade.sequential, 100.0);
        assert_close(grade.multi_threaded, 100.0);
        assert_close(grade.false_sharing, 100.0);
    }

    #[test]
    fn test_weighted_partial_scores() {
        let grade = GradeCalculator::default().compute(&suite(0.5, 0.5, 0.4)).unwrap();
        assert_close(grade.total, 48.0);
        assert_close(grade.sequential, 50.0);
        assert_close(grade.multi_threaded, 50.0);
        assert_close(grade.false_sharing, 40.0);
    }

    #[test]
    fn test_scores_above_threshold_are_capped() {
        let grade = GradeCalculator::default().compute(&suite(3.0, 0.2, 7.5)).unwrap();
        assert_close(grade.sequential, 100.0);
        assert_close(grade.false_sharing, 100.0);
        assert_close(grade.multi_threaded, 20.0);
        assert_close(grade.total, 15.0 + 0.2 * 65.0 + 20.0);
    }

    #[test]
    fn test_averages_mix_benchmarks() {
        let scores = SuiteScores {
            cache_scratch: table(0.2, 0.1),
            cache_thrash: table(0.4, 0.3),
            larson: table(0.6, 0.8),
            threadtest: table(0.8, 0.4),
        };
        let grade = GradeCalculator::default().compute(&scores).unwrap();
        assert_close(grade.sequential, 50.0);
        assert_close(grade.multi_threaded, 60.0);
        assert_close(grade.false_sharing, 20.0);
        assert_close(grade.total, (0.5 * 0.15 + 0.6 * 0.65 + 0.2 * 0.2) * 100.0);
    }

    #[test]
    fn test_thresholds_normalize() {
        let calculator = GradeCalculator::new(ThresholdConfig {
            sequential_speed: 2.0,
            multi_threaded_speedup: 4.0,
            false_sharing_avoidance: 0.5,
        });
        let grade = calculator.compute(&suite(1.0, 2.0, 0.25)).unwrap();
        assert_close(grade.sequential, 50.0);
        assert_close(grade.multi_threaded, 50.0);
        assert_close(grade.false_sharing, 50.0);
        assert_close(grade.total, 50.0);
    }

    #[test]
    fn test_negative_scores_floor_at_zero() {
        let grade = GradeCalculator::default().compute(&suite(-1.0, -0.5, 0.0)).unwrap();
        assert_close(grade.total, 0.0);
        assert_close(grade.sequential, 0.0);
    }

    #[test]
    fn test_missing_metric_is_an_error() {
        let mut scores = suite(1.0, 1.0, 1.0);
        scores.threadtest = [(metrics::SEQUENTIAL_SPEED.to_string(), 1.0)]
            .into_iter()
            .collect();

        let err = GradeCalculator::default().compute(&scores).unwrap_err();
        assert!(matches!(
            err,
            AppError::RequiredMetricMissing {
                benchmark: Benchmark::ThreadTest,
                metric: "scalability score"
            }
        ));
    }

    #[test]
    fn test_empty_table_reports_sequential_speed_first() {
        let mut scores = suite(1.0, 1.0, 1.0);
        scores.cache_thrash = ScoreTable::new();

        let err = GradeCalculator::default().compute(&scores).unwrap_err();
        assert!(matches!(
            err,
            AppError::RequiredMetricMissing {
                benchmark: Benchmark::CacheThrash,
                metric: "sequential speed"
            }
        ));
    }

    #[test]
    fn test_grade_bounds() {
        for &(s, m, f) in &[(0.0, 0.0, 0.0), (0.3, 2.0, 0.9), (10.0, 10.0, 10.0), (0.99, 0.01, 0.5)] {
            let grade = GradeCalculator::default().compute(&suite(s, m, f)).unwrap();
            assert!((0.0..=100.0).contains(&grade.total));
            assert!(grade.sequential <= 100.0);
            assert!(grade.multi_threaded <= 100.0);
            assert!(grade.false_sharing <= 100.0);
        }
    }
}
