//! Custom error types and handling
//!
//! Only `DriverSpawn` and `DriverWait` come from the benchmark process itself;
//! a non-zero exit or a timeout is a [`RunState`](crate::benchmark::RunState),
//! not an error.

use std::path::PathBuf;

use crate::models::Benchmark;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Benchmark driver errors
    #[error("Failed to launch benchmark driver {command}: {source}")]
    DriverSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for benchmark driver: {0}")]
    DriverWait(#[source] std::io::Error),

    #[error("Benchmark driver stdout was not captured")]
    StdoutUnavailable,

    // Score errors
    #[error("Score file for {benchmark} could not be read at {}: {source}", .path.display())]
    MissingScoreFile {
        benchmark: Benchmark,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Score file for {benchmark} is missing required metric '{metric}'")]
    RequiredMetricMissing {
        benchmark: Benchmark,
        metric: &'static str,
    },

    // Report export errors
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DriverSpawn { .. } => "DRIVER_SPAWN_ERROR",
            Self::DriverWait(_) => "DRIVER_WAIT_ERROR",
            Self::StdoutUnavailable => "STDOUT_UNAVAILABLE",
            Self::MissingScoreFile { .. } => "MISSING_SCORE_FILE",
            Self::RequiredMetricMissing { .. } => "REQUIRED_METRIC_MISSING",
            Self::Io(_) => "FILE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
