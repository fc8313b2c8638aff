//! Utility functions

pub mod time;

pub use time::{format_duration, format_elapsed, now_utc};
