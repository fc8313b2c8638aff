//! Business logic services

pub mod grading_service;

pub use grading_service::{GradingRun, GradingService};
