//! Benchmark driver execution under a hard wall-clock deadline
//!
//! The driver runs in its own process group and its stdout is read while we
//! wait, so whatever it printed before crashing or being killed is kept.
//! Neither a non-zero exit nor a timeout is an error: both end in a
//! [`RunState`] and grading carries on with whatever score files exist.

use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tokio::time::{sleep_until, timeout, timeout_at, Instant};

use crate::config::BenchmarkConfig;
use crate::constants::{
    DEFAULT_KILL_GRACE_SECONDS, MAX_CONFIGURED_SECONDS, SEPARATOR_LINE, STDOUT_DRAIN_GRACE_MS,
};
use crate::error::{AppError, AppResult};
use crate::utils::time::{format_duration, format_elapsed};

const READ_CHUNK: usize = 8192;

/// Lifecycle of a benchmark run: `Running` moves to exactly one terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    /// Driver still executing
    Running,
    /// Exited with status 0
    Completed,
    /// Non-zero exit, or killed by a signal we did not send
    Failed {
        exit_code: Option<i32>,
        signal: Option<i32>,
    },
    /// Deadline expired and the process group was terminated
    TimedOut,
}

impl RunState {
    /// Get short code for the state
    pub fn code(&self) -> &'static str {
        match self {
            RunState::Running => "RUNNING",
            RunState::Completed => "COMPLETED",
            RunState::Failed { .. } => "FAILED",
            RunState::TimedOut => "TIMED_OUT",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunState::Running)
    }

    /// Transition taken when the driver exits on its own
    pub fn on_exit(self, status: ExitStatus) -> Self {
        match self {
            RunState::Running if status.success() => RunState::Completed,
            RunState::Running => RunState::Failed {
                exit_code: status.code(),
                signal: status.signal(),
            },
            terminal => terminal,
        }
    }

    /// Transition taken when the deadline fires first
    pub fn on_deadline(self) -> Self {
        match self {
            RunState::Running => RunState::TimedOut,
            terminal => terminal,
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// stdout of a finished run, split into lines
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub state: RunState,
    /// Trimmed driver stdout, then the separator, then the timeout notice if any
    pub lines: Vec<String>,
    pub elapsed: Duration,
}

impl CapturedOutput {
    fn from_stdout(state: RunState, raw: &[u8], deadline: Duration, elapsed: Duration) -> Self {
        let text = String::from_utf8_lossy(raw);
        let mut lines: Vec<String> = text.trim().lines().map(str::to_string).collect();
        lines.push(SEPARATOR_LINE.to_string());
        if state == RunState::TimedOut {
            lines.push(timeout_notice(deadline));
        }

        Self {
            state,
            lines,
            elapsed,
        }
    }

    pub fn timed_out(&self) -> bool {
        self.state == RunState::TimedOut
    }
}

/// Notice appended to the captured output of a killed run.
///
/// Whole minutes read `30min`; anything else falls back to `format_duration`.
pub fn timeout_notice(deadline: Duration) -> String {
    let secs = deadline.as_secs();
    if secs >= 60 && secs % 60 == 0 && deadline.subsec_nanos() == 0 {
        format!("Killed after {}min", secs / 60)
    } else {
        format!("Killed after {}", format_duration(deadline))
    }
}

/// A single invocation of the benchmark driver
#[derive(Debug, Clone)]
pub struct BenchmarkRun {
    command: PathBuf,
    working_dir: PathBuf,
    argument: String,
    timeout: Duration,
    kill_grace: Duration,
}

impl BenchmarkRun {
    pub fn new(
        command: impl Into<PathBuf>,
        working_dir: impl Into<PathBuf>,
        argument: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            working_dir: working_dir.into(),
            argument: argument.into(),
            timeout,
            kill_grace: Duration::from_secs(DEFAULT_KILL_GRACE_SECONDS),
        }
    }

    /// Build the run described by the benchmark configuration
    pub fn from_config(config: &BenchmarkConfig) -> Self {
        Self::new(
            config.driver.clone(),
            config.benchmark_dir.clone(),
            config.driver_arg.clone(),
            config.timeout,
        )
        .with_kill_grace(config.kill_grace)
    }

    pub fn with_kill_grace(mut self, kill_grace: Duration) -> Self {
        self.kill_grace = kill_grace;
        self
    }

    /// Instant at which the run is cut off; an unrepresentable timeout is capped
    fn deadline_from(&self, started: Instant) -> Instant {
        started.checked_add(self.timeout).unwrap_or_else(|| {
            started + Duration::from_secs(MAX_CONFIGURED_SECONDS)
        })
    }

    /// Driver path as spawned.
    ///
    /// A relative path with a directory part (`./runall.pl`) is taken relative
    /// to the working directory; a bare name is looked up on `PATH`.
    fn program(&self) -> PathBuf {
        if self.command.is_relative() && self.command.components().count() > 1 {
            let joined = self.working_dir.join(&self.command);
            std::path::absolute(&joined).unwrap_or(joined)
        } else {
            self.command.clone()
        }
    }

    /// Run the driver to completion, failure or deadline.
    ///
    /// Only a failure to start or to wait on the driver is an error.
    pub async fn execute(&self) -> AppResult<CapturedOutput> {
        let program = self.program();
        tracing::info!(
            driver = %program.display(),
            dir = %self.working_dir.display(),
            timeout = %format_duration(self.timeout),
            "Launching benchmark driver"
        );

        let started = Instant::now();
        let deadline = self.deadline_from(started);

        let mut child = Command::new(&program)
            .arg(&self.argument)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .process_group(0)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AppError::DriverSpawn {
                command: program.display().to_string(),
                source,
            })?;

        let mut stdout = child.stdout.take().ok_or(AppError::StdoutUnavailable)?;
        let mut captured = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        let mut stdout_open = true;
        let mut state = RunState::Running;

        while !state.is_terminal() {
            tokio::select! {
                read = stdout.read(&mut chunk), if stdout_open => match read {
                    Ok(0) => stdout_open = false,
                    Ok(n) => captured.extend_from_slice(&chunk[..n]),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read benchmark driver stdout");
                        stdout_open = false;
                    }
                },
                status = child.wait() => {
                    state = state.on_exit(status.map_err(AppError::DriverWait)?);
                }
                _ = sleep_until(deadline) => {
                    state = state.on_deadline();
                }
            }
        }

        if state == RunState::TimedOut {
            tracing::warn!(
                timeout = %format_duration(self.timeout),
                "Benchmark driver exceeded its deadline, terminating"
            );
            self.terminate(&mut child).await;
        }

        if stdout_open {
            drain(&mut stdout, &mut captured).await;
        }

        let elapsed = started.elapsed();
        match state {
            RunState::Completed => {
                tracing::info!(elapsed = %format_elapsed(elapsed), "Benchmark driver completed");
            }
            RunState::Failed { exit_code, signal } => {
                tracing::warn!(
                    exit_code = ?exit_code,
                    signal = ?signal,
                    elapsed = %format_elapsed(elapsed),
                    "Benchmark driver failed, grading whatever score files exist"
                );
            }
            RunState::TimedOut => {
                tracing::warn!(
                    elapsed = %format_elapsed(elapsed),
                    "Benchmark driver killed, grading whatever score files exist"
                );
            }
            RunState::Running => {}
        }

        Ok(CapturedOutput::from_stdout(
            state,
            &captured,
            self.timeout,
            elapsed,
        ))
    }

    /// SIGTERM the driver's process group, then SIGKILL after the grace period
    async fn terminate(&self, child: &mut Child) {
        let Some(pid) = child.id() else {
            return;
        };
        let group = Pid::from_raw(pid as i32);

        if let Err(e) = killpg(group, Signal::SIGTERM) {
            tracing::debug!(error = %e, "SIGTERM to driver process group failed");
        }

        if timeout(self.kill_grace, child.wait()).await.is_err() {
            tracing::warn!(
                grace = %format_duration(self.kill_grace),
                "Benchmark driver ignored SIGTERM, sending SIGKILL"
            );
        }

        // benchmarks started by the driver share its group and can outlive it
        if let Err(e) = killpg(group, Signal::SIGKILL) {
            tracing::debug!(error = %e, "SIGKILL to driver process group failed");
        }
        if let Err(e) = child.kill().await {
            tracing::debug!(error = %e, "Driver kill returned an error");
        }
    }
}

/// Read what is left in the pipe once the driver is gone
async fn drain(stdout: &mut ChildStdout, captured: &mut Vec<u8>) {
    let deadline = Instant::now() + Duration::from_millis(STDOUT_DRAIN_GRACE_MS);
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        match timeout_at(deadline, stdout.read(&mut chunk)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => captured.extend_from_slice(&chunk[..n]),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Failed to read remaining driver stdout");
                break;
            }
            Err(_) => {
                tracing::debug!("Driver stdout still held open by another process");
                break;
            }
        }
    }
}
