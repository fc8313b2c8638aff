//! alloc-grader - Allocator Benchmark Grading Harness
//!
//! This library grades a memory allocator by running the allocator benchmark
//! suite (cache-scratch, cache-thrash, larson, threadtest) and reducing the
//! score files it produces into a single performance grade.
//!
//! # Features
//!
//! - Bounded benchmark run with process-group termination on timeout
//! - Forgiving `metric = value` score file parsing
//! - Weighted, threshold-normalized grade with a per-category breakdown
//! - Fixed text report plus an optional JSON export
//!
//! # Architecture
//!
//! The grading pipeline is strictly linear:
//! - **Runner**: launches the benchmark driver and captures its output
//! - **Scores**: reads the four score tables as one unit
//! - **Grader**: turns score tables into a [`GradeResult`](models::GradeResult)
//! - **Report**: prints the grade or the reason there is none

pub mod benchmark;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod report;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use services::GradingService;
