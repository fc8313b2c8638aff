//! Grading service - runs the benchmark suite and grades what it left behind

use std::path::Path;

use crate::{
    benchmark::{read_suite_scores, BenchmarkRun, CapturedOutput, GradeCalculator},
    config::Config,
    error::AppResult,
    models::GradeOutcome,
};

/// Everything a single grading invocation produced
#[derive(Debug, Clone)]
pub struct GradingRun {
    /// `None` when the driver could not be started at all
    pub captured: Option<CapturedOutput>,
    pub outcome: GradeOutcome,
}

/// Grading service tying runner, score reader and calculator together
pub struct GradingService {
    config: Config,
    calculator: GradeCalculator,
}

impl GradingService {
    pub fn new(config: Config) -> Self {
        let calculator = GradeCalculator::new(config.thresholds);
        Self { config, calculator }
    }

    /// Run the benchmark driver, then grade the score files it wrote.
    ///
    /// Driver failures, timeouts and launch errors are logged and never stop
    /// the score files from being read.
    pub async fn run(&self) -> AppResult<GradingRun> {
        let captured = match BenchmarkRun::from_config(&self.config.benchmark)
            .execute()
            .await
        {
            Ok(captured) => {
                for line in &captured.lines {
                    tracing::debug!(target: "alloc_grader::driver", "{}", line);
                }
                Some(captured)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    code = e.error_code(),
                    "Benchmark driver did not run"
                );
                None
            }
        };

        let outcome = self.grade(&self.config.benchmark.benchmark_dir).await?;

        Ok(GradingRun { captured, outcome })
    }

    /// Grade the score files below `root` without running anything
    pub async fn grade(&self, root: &Path) -> AppResult<GradeOutcome> {
        let graded = match read_suite_scores(root).await {
            Ok(scores) => self.calculator.compute(&scores),
            Err(e) => Err(e),
        };

        match graded {
            Ok(grade) => {
                tracing::info!(
                    total = grade.total,
                    sequential = grade.sequential,
                    multi_threaded = grade.multi_threaded,
                    false_sharing = grade.false_sharing,
                    "Performance grade computed"
                );
                Ok(GradeOutcome::Graded(grade))
            }
            Err(e) => {
                tracing::warn!(error = %e, code = e.error_code(), "No grade computed");
                GradeOutcome::from_score_error(e)
            }
        }
    }
}
