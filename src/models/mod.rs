//! Domain models
//!
//! This module contains the score tables and grade types passed between pipeline stages.

pub mod benchmark;
pub mod grade;

pub use benchmark::*;
pub use grade::*;
