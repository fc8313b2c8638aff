//! Benchmark execution and scoring
//!
//! The grading pipeline is strictly linear:
//!
//! 1. **Runner** (`runner.rs`): launches the benchmark driver with a hard
//!    deadline and captures its stdout.
//! 2. **Scores** (`scores.rs`): reads the four `Results/alloc/scores` files
//!    the driver leaves behind.
//! 3. **Grader** (`grader.rs`): reduces the score tables to a weighted,
//!    threshold-normalized grade.

pub mod grader;
pub mod runner;
pub mod scores;

pub use grader::GradeCalculator;
pub use runner::{BenchmarkRun, CapturedOutput, RunState};
pub use scores::{parse_line, parse_scores, read_scores, read_suite_scores};
