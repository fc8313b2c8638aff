//! Application-wide constants
//!
//! This module contains all constant values used throughout the grader.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// BENCHMARK DRIVER DEFAULTS
// =============================================================================

/// Default benchmark driver executable, relative to the benchmark directory
pub const DEFAULT_BENCHMARK_DRIVER: &str = "./runall.pl";

/// Default benchmark directory (working directory and score root)
pub const DEFAULT_BENCHMARK_DIR: &str = ".";

/// Default positional argument handed to the driver
pub const DEFAULT_BENCHMARK_ARG: &str = ".";

/// Hard wall-clock ceiling for the whole benchmark run (30 minutes)
pub const DEFAULT_BENCHMARK_TIMEOUT_SECONDS: u64 = 60 * 30;

/// Largest timeout or kill grace accepted from the environment (7 days)
pub const MAX_CONFIGURED_SECONDS: u64 = 60 * 60 * 24 * 7;

/// Time between SIGTERM and SIGKILL when the deadline expires
pub const DEFAULT_KILL_GRACE_SECONDS: u64 = 5;

/// How long to keep reading stdout once the driver is gone
pub const STDOUT_DRAIN_GRACE_MS: u64 = 500;

// =============================================================================
// SCORE FILES
// =============================================================================

/// Score file location below each benchmark directory
pub const SCORES_SUBPATH: &str = "Results/alloc/scores";

/// Delimiter between metric name and value in a score file
pub const SCORE_DELIMITER: &str = " = ";

/// Metric names the grade depends on
pub mod metrics {
    pub const SEQUENTIAL_SPEED: &str = "sequential speed";
    pub const SCALABILITY_SCORE: &str = "scalability score";
}

// =============================================================================
// GRADING POLICY
// =============================================================================

/// Grade weights. Must sum to 1.0.
pub mod weights {
    /// Single threaded performance with respect to libc malloc
    pub const SEQUENTIAL: f64 = 0.15;
    /// Multi-threaded performance (larson, threadtest)
    pub const MULTI_THREADED: f64 = 0.65;
    /// False sharing avoidance (cache-scratch, cache-thrash)
    pub const FALSE_SHARING: f64 = 0.2;
}

/// Default calibration threshold for every category
pub const DEFAULT_THRESHOLD: f64 = 1.0;

// =============================================================================
// REPORT TEXT
// =============================================================================

/// Separator appended to captured output and printed after a report
pub const SEPARATOR_LINE: &str = "*********************************";

/// Printed when any of the four score files could not be read
pub const NO_SCORE_FILE_MESSAGE: &str =
    "No score file found due to benchmark failing to run on the student's implementation";

/// Default log filter
pub const DEFAULT_RUST_LOG: &str = "info";
