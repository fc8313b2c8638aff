//! alloc-grader - Application Entry Point
//!
//! Runs the benchmark suite once and prints the performance grade.
//! Takes no flags; see `Config` for the environment it reads.

use std::io::Write;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alloc_grader::{config::Config, report, services::GradingService};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Logs go to stderr; stdout carries only the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.rust_log.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting allocator grading run");

    let service = GradingService::new(config.clone());
    let run = service.run().await?;

    {
        let mut out = std::io::stdout().lock();
        if config.report.echo_output {
            if let Some(captured) = &run.captured {
                report::echo_captured(captured, &mut out)?;
            }
        }
        report::emit(&run.outcome, &mut out)?;
        out.flush()?;
    }

    if let Some(path) = &config.report.json_path {
        if let Err(e) = report::export_json(path, &run).await {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to write JSON grade report"
            );
        }
    }

    Ok(())
}
