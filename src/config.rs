//! Grader configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the benchmark run starts.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BENCHMARK_ARG, DEFAULT_BENCHMARK_DIR, DEFAULT_BENCHMARK_DRIVER,
    DEFAULT_BENCHMARK_TIMEOUT_SECONDS, DEFAULT_KILL_GRACE_SECONDS, DEFAULT_RUST_LOG,
    DEFAULT_THRESHOLD, MAX_CONFIGURED_SECONDS,
};

/// Main grader configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub benchmark: BenchmarkConfig,
    pub thresholds: ThresholdConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

/// Benchmark driver invocation
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Driver executable
    pub driver: PathBuf,
    /// Working directory of the driver; score files are read below it
    pub benchmark_dir: PathBuf,
    /// Single positional argument passed to the driver
    pub driver_arg: String,
    /// Hard deadline for the whole run
    pub timeout: Duration,
    /// Wait between SIGTERM and SIGKILL after the deadline
    pub kill_grace: Duration,
}

/// Calibration points derived from a reference solution.
///
/// A raw average equal to its threshold earns full marks for that category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdConfig {
    pub sequential_speed: f64,
    pub multi_threaded_speedup: f64,
    pub false_sharing_avoidance: f64,
}

/// Report output configuration
#[derive(Debug, Clone, Default)]
pub struct ReportConfig {
    /// Print the captured driver output before the grade
    pub echo_output: bool,
    /// Optional machine-readable copy of the grade
    pub json_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub rust_log: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            benchmark: BenchmarkConfig::from_lookup(&lookup)?,
            thresholds: ThresholdConfig::from_lookup(&lookup)?,
            report: ReportConfig::from_lookup(&lookup)?,
            logging: LoggingConfig::from_lookup(&lookup),
        })
    }
}

impl BenchmarkConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_seconds = seconds(
            lookup,
            "BENCHMARK_TIMEOUT_SECONDS",
            DEFAULT_BENCHMARK_TIMEOUT_SECONDS,
        )?;
        if timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "BENCHMARK_TIMEOUT_SECONDS".to_string(),
            ));
        }

        Ok(Self {
            driver: PathBuf::from(
                lookup("BENCHMARK_DRIVER").unwrap_or_else(|| DEFAULT_BENCHMARK_DRIVER.to_string()),
            ),
            benchmark_dir: PathBuf::from(
                lookup("BENCHMARK_DIR").unwrap_or_else(|| DEFAULT_BENCHMARK_DIR.to_string()),
            ),
            driver_arg: lookup("BENCHMARK_ARG").unwrap_or_else(|| DEFAULT_BENCHMARK_ARG.to_string()),
            timeout: Duration::from_secs(timeout_seconds),
            kill_grace: Duration::from_secs(seconds(
                lookup,
                "BENCHMARK_KILL_GRACE_SECONDS",
                DEFAULT_KILL_GRACE_SECONDS,
            )?),
        })
    }
}

impl ThresholdConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            sequential_speed: threshold(lookup, "THRESHOLD_SEQUENTIAL_SPEED")?,
            multi_threaded_speedup: threshold(lookup, "THRESHOLD_MULTITHREADED_SPEEDUP")?,
            false_sharing_avoidance: threshold(lookup, "THRESHOLD_FALSE_SHARING_AVOIDANCE")?,
        })
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            sequential_speed: DEFAULT_THRESHOLD,
            multi_threaded_speedup: DEFAULT_THRESHOLD,
            false_sharing_avoidance: DEFAULT_THRESHOLD,
        }
    }
}

impl ReportConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let echo_output = match lookup("GRADER_ECHO_OUTPUT") {
            Some(raw) => parse_flag(&raw)
                .ok_or_else(|| ConfigError::InvalidValue("GRADER_ECHO_OUTPUT".to_string()))?,
            None => false,
        };

        Ok(Self {
            echo_output,
            json_path: lookup("GRADE_REPORT_JSON")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

impl LoggingConfig {
    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_RUST_LOG.to_string()),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// A whole number of seconds no larger than `MAX_CONFIGURED_SECONDS`
fn seconds<F>(lookup: &F, key: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value: u64 = parse_or(lookup, key, default)?;
    if value > MAX_CONFIGURED_SECONDS {
        return Err(ConfigError::InvalidValue(key.to_string()));
    }
    Ok(value)
}

fn threshold<F>(lookup: &F, key: &str) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value: f64 = parse_or(lookup, key, DEFAULT_THRESHOLD)?;
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidValue(key.to_string()));
    }
    Ok(value)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
