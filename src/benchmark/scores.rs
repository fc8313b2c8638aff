//! Score file reading
//!
//! Score files hold one `metric = value` pair per line. Anything else the
//! driver writes there (headers, blank lines, text values) is skipped line
//! by line without failing the file.

use std::path::Path;

use tokio::fs;

use crate::constants::SCORE_DELIMITER;
use crate::error::{AppError, AppResult};
use crate::models::{Benchmark, ScoreTable, SuiteScores};

/// Parse one score line into a `(metric, value)` pair.
///
/// The value is the second `" = "`-separated field. Lines without one, or
/// whose value is not a finite number, yield `None`.
pub fn parse_line(line: &str) -> Option<(String, f64)> {
    let mut fields = line.trim().split(SCORE_DELIMITER);
    let key = fields.next()?;
    let value: f64 = fields.next()?.trim().parse().ok()?;

    if !value.is_finite() {
        return None;
    }
    Some((key.to_string(), value))
}

/// Build a score table from a whole file's contents. Later duplicates win.
pub fn parse_scores(content: &str) -> ScoreTable {
    content
        .lines()
        .filter_map(|line| {
            let parsed = parse_line(line);
            if parsed.is_none() && !line.trim().is_empty() {
                tracing::trace!(line = %line, "Skipping malformed score line");
            }
            parsed
        })
        .collect()
}

/// Read the score table of one benchmark below `root`
pub async fn read_scores(root: &Path, benchmark: Benchmark) -> AppResult<ScoreTable> {
    let path = root.join(benchmark.scores_path());

    let raw = fs::read(&path)
        .await
        .map_err(|source| AppError::MissingScoreFile {
            benchmark,
            path: path.clone(),
            source,
        })?;

    let table = parse_scores(&String::from_utf8_lossy(&raw));
    tracing::debug!(
        benchmark = %benchmark,
        path = %path.display(),
        metrics = table.len(),
        "Loaded score file"
    );

    Ok(table)
}

/// Read all four score tables as one unit.
///
/// The first unreadable file aborts the whole read; a grade is never built
/// from a partial suite.
pub async fn read_suite_scores(root: &Path) -> AppResult<SuiteScores> {
    Ok(SuiteScores {
        cache_scratch: read_scores(root, Benchmark::CacheScratch).await?,
        cache_thrash: read_scores(root, Benchmark::CacheThrash).await?,
        larson: read_scores(root, Benchmark::Larson).await?,
        threadtest: read_scores(root, Benchmark::ThreadTest).await?,
    })
}
