#![deny(warnings)]
#![warn(clippy::pedantic)]

use anyhow::{bail, Result};
use clap::Parser;
use std::time::Duration;
use tracing::info;

use loadbench::{monitor_pipeline, MemoryReporter, PipelineRunner};

/// Synthetic load pipeline for exercising an external resource monitor.
#[derive(Debug, Parser)]
#[command(name = "loadbench", version)]
struct Args {
    /// Run each load variant for this many seconds.
    #[arg(long, default_value_t = 120)]
    step_secs: u64,

    /// Print the per-variant resource budget manifest as JSON and exit.
    #[arg(long)]
    print_budgets: bool,

    /// Seconds between resident/virtual memory reports.
    #[arg(long, default_value_t = 5)]
    report_interval_secs: u64,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let pipeline = monitor_pipeline();
    if args.print_budgets {
        println!("{}", serde_json::to_string_pretty(&pipeline.budget_manifest())?);
        return Ok(());
    }
    info!(step_secs = args.step_secs, "starting load pipeline");
    let reporter = MemoryReporter::spawn(Duration::from_secs(args.report_interval_secs));
    let runner = PipelineRunner::new(pipeline, Duration::from_secs(args.step_secs))?;
    let report = runner.run().await;
    reporter.stop();
    let failed = report.failed().len();
    info!(
        completed = report.outcomes.len() - failed,
        failed, "load pipeline finished"
    );
    if !report.success() {
        bail!("{failed} of {} variants failed", report.outcomes.len());
    }
    Ok(())
}
