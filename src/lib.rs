pub mod command;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod pool;
pub mod store;
pub mod timing;

use std::sync::Arc;

use chrono::Local;
use tracing::info;

use crate::config::{Args, Config};
use crate::logging::LogConfig;
use crate::pool::RunSummary;
use crate::store::{Connector, RedisConnector};
use crate::timing::Elapsed;

/// Installs logging, then runs against the Redis store named by `args`.
pub async fn run(args: Args) -> anyhow::Result<()> {
    LogConfig::new(args.log_format).init()?;
    run_with(args, |config| Ok(RedisConnector::new(config)?)).await
}

/// Validates `args`, builds the connector from the validated config, drives
/// the workers and prints the summary. `connect` is only called once
/// validation has passed.
pub async fn run_with<K, F>(args: Args, connect: F) -> anyhow::Result<()>
where
    K: Connector,
    F: FnOnce(&Config) -> anyhow::Result<K>,
{
    let config = Arc::new(args.validate(Local::now())?);
    info!(batch = %config.batch, params = %config, "begin");

    let connector = Arc::new(connect(&config)?);
    let summary = pool::run(Arc::clone(&config), connector).await;

    info!(
        batch = %config.batch,
        params = %config,
        elapsed = %Elapsed(summary.elapsed),
        "end"
    );
    print_summary(&config.batch, &summary);

    summary.check(config.on_connect_error)?;
    Ok(())
}

fn print_summary(batch: &str, summary: &RunSummary) {
    println!("\n==============================");
    println!("🔥 FINAL RESULTS ({})", batch);
    for r in &summary.reports {
        let status = match &r.outcome {
            Ok(()) => "ok".to_string(),
            Err(e) => e.to_string(),
        };
        println!(
            "   worker {:>3}: {} ops in {:.2}s ({})",
            r.worker,
            r.total_ops(),
            r.elapsed.as_secs_f64(),
            status
        );
    }
    println!("✅ Total Ops:    {}", summary.total_ops());
    println!("⏱️  Duration:     {:.2}s", summary.elapsed.as_secs_f64());
    println!("🚀 Throughput:   {:.0} ops/sec", summary.throughput());
    if summary.connect_failures() + summary.command_failures() > 0 {
        println!(
            "❌ Failed workers: {} connect, {} command",
            summary.connect_failures(),
            summary.command_failures()
        );
    }
    println!("==============================\n");
}
