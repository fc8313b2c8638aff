//! Grade report output
//!
//! The text report on stdout is the harness's only contract with whoever
//! collects marks, so its wording is fixed. A JSON copy can be written on
//! the side.

use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::benchmark::{CapturedOutput, RunState};
use crate::constants::{NO_SCORE_FILE_MESSAGE, SEPARATOR_LINE};
use crate::error::AppResult;
use crate::models::GradeOutcome;
use crate::services::GradingRun;
use crate::utils::time::now_utc;

/// Format a percentage the way the report has always shown it: shortest
/// round-trip digits, always with a decimal point (`100.0`, `62.5`).
/// Magnitudes below `1e-4` switch to a signed two-digit exponent (`1e-05`).
pub fn format_percentage(value: f64) -> String {
    let magnitude = value.abs();
    if value.is_finite() && magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return exponent_form(value);
    }

    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}

fn exponent_form(value: f64) -> String {
    let text = format!("{value:e}");
    match text.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            Err(_) => text,
        },
        None => text,
    }
}

/// Write the human-readable report for `outcome`
pub fn emit<W: Write>(outcome: &GradeOutcome, out: &mut W) -> io::Result<()> {
    match outcome {
        GradeOutcome::Graded(grade) => {
            writeln!(
                out,
                "Student's solution obtained {}% of the total performance portion score",
                format_percentage(grade.total)
            )?;
            writeln!(
                out,
                "\tSequential Performance Pts: {}%",
                format_percentage(grade.sequential)
            )?;
            writeln!(
                out,
                "\tMultiThreaded Performance Pts: {}%",
                format_percentage(grade.multi_threaded)
            )?;
            writeln!(
                out,
                "\tFalse Sharing Pts: {}%",
                format_percentage(grade.false_sharing)
            )?;
            writeln!(out, "{}", SEPARATOR_LINE)?;
        }
        GradeOutcome::MissingScoreFile { .. } => {
            writeln!(out, "{}", NO_SCORE_FILE_MESSAGE)?;
        }
        GradeOutcome::MissingMetric { benchmark, metric } => {
            writeln!(
                out,
                "Score file for {} is missing required metric '{}'; no grade could be computed",
                benchmark, metric
            )?;
        }
    }
    out.flush()
}

/// Write the captured driver output, separator and timeout notice included
pub fn echo_captured<W: Write>(captured: &CapturedOutput, out: &mut W) -> io::Result<()> {
    for line in &captured.lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// Machine-readable copy of a grading run
#[derive(Debug, Serialize)]
pub struct GradeExport<'a> {
    pub graded_at: DateTime<Utc>,
    /// `None` when the driver never started
    pub run_state: Option<RunState>,
    pub elapsed_seconds: Option<f64>,
    pub outcome: &'a GradeOutcome,
}

impl<'a> GradeExport<'a> {
    pub fn new(run: &'a GradingRun) -> Self {
        Self {
            graded_at: now_utc(),
            run_state: run.captured.as_ref().map(|c| c.state),
            elapsed_seconds: run.captured.as_ref().map(|c| c.elapsed.as_secs_f64()),
            outcome: &run.outcome,
        }
    }
}

/// Write the JSON export of `run` to `path`
pub async fn export_json(path: &Path, run: &GradingRun) -> AppResult<()> {
    let body = serde_json::to_vec_pretty(&GradeExport::new(run))?;
    tokio::fs::write(path, body).await?;
    tracing::info!(path = %path.display(), "Wrote JSON grade report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    use crate::models::{Benchmark, GradeResult};

    fn render(outcome: &GradeOutcome) -> String {
        let mut buf = Vec::new();
        emit(outcome, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(100.0), "100.0");
        assert_eq!(format_percentage(48.0), "48.0");
        assert_eq!(format_percentage(0.0), "0.0");
        assert_eq!(format_percentage(62.5), "62.5");
        assert_eq!(format_percentage(48.00000000000001), "48.00000000000001");
        assert_eq!(format_percentage(0.0001), "0.0001");
        assert_eq!(format_percentage(0.00001), "1e-05");
        assert_eq!(format_percentage(0.000015), "1.5e-05");
        assert_eq!(format_percentage(1e-300), "1e-300");
    }

    #[test]
    fn test_graded_report() {
        let report = render(&GradeOutcome::Graded(GradeResult {
            total: 48.0,
            sequential: 50.0,
            multi_threaded: 62.5,
            false_sharing: 40.0,
        }));
        assert_eq!(
            report,
            "Student's solution obtained 48.0% of the total performance portion score\n\
             \tSequential Performance Pts: 50.0%\n\
             \tMultiThreaded Performance Pts: 62.5%\n\
             \tFalse Sharing Pts: 40.0%\n\
             *********************************\n"
        );
    }

    #[test]
    fn test_missing_file_report_has_no_grade() {
        let report = render(&GradeOutcome::MissingScoreFile {
            benchmark: Benchmark::Larson,
            path: PathBuf::from("larson/Results/alloc/scores"),
        });
        assert_eq!(report, format!("{}\n", NO_SCORE_FILE_MESSAGE));
        assert!(!report.contains("Student's solution obtained"));
    }

    #[test]
    fn test_missing_metric_report() {
        let report = render(&GradeOutcome::MissingMetric {
            benchmark: Benchmark::CacheScratch,
            metric: "scalability score".to_string(),
        });
        assert_eq!(
            report,
            "Score file for cache-scratch is missing required metric 'scalability score'; no grade could be computed\n"
        );
    }

    #[test]
    fn test_echo_captured() {
        let captured = CapturedOutput {
            state: RunState::TimedOut,
            lines: vec![
                "partial".to_string(),
                SEPARATOR_LINE.to_string(),
                "Killed after 30min".to_string(),
            ],
            elapsed: Duration::from_secs(1800),
        };
        let mut buf = Vec::new();
        echo_captured(&captured, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            format!("partial\n{}\nKilled after 30min\n", SEPARATOR_LINE)
        );
    }

    #[tokio::test]
    async fn test_export_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grade.json");
        let run = GradingRun {
            captured: None,
            outcome: GradeOutcome::Graded(GradeResult {
                total: 100.0,
                sequential: 100.0,
                multi_threaded: 100.0,
                false_sharing: 100.0,
            }),
        };

        export_json(&path, &run).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(value["outcome"]["status"], "graded");
        assert_eq!(value["outcome"]["final"], 100.0);
        assert!(value["run_state"].is_null());
        assert!(value["graded_at"].is_string());
    }
}
