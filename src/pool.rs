//! Worker pool and completion barrier.
//!
//! Every worker is a tokio task owning one connection. The aggregator waits
//! on all join handles before the run is summarized.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task;
use tracing::{error, info};

use crate::command::Command;
use crate::config::{Config, ConnectFailure};
use crate::error::{RunError, WorkerError};
use crate::executor;
use crate::store::Connector;
use crate::timing::{throughput, Elapsed};

#[derive(Debug)]
pub struct WorkerReport {
    pub worker: usize,
    /// Writes performed per command, in execution order. A failed command
    /// is listed with the writes it completed before the error.
    pub ops: Vec<(Command, u64)>,
    pub elapsed: Duration,
    pub outcome: Result<(), WorkerError>,
}

impl WorkerReport {
    pub fn total_ops(&self) -> u64 {
        self.ops.iter().map(|(_, n)| n).sum()
    }
}

#[derive(Debug)]
pub struct RunSummary {
    /// One report per worker, ordered by worker index.
    pub reports: Vec<WorkerReport>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn total_ops(&self) -> u64 {
        self.reports.iter().map(WorkerReport::total_ops).sum()
    }

    pub fn throughput(&self) -> f64 {
        throughput(self.total_ops(), self.elapsed)
    }

    pub fn connect_failures(&self) -> usize {
        self.failures().filter(|e| e.is_connect()).count()
    }

    pub fn command_failures(&self) -> usize {
        self.failures().filter(|e| !e.is_connect()).count()
    }

    fn failures(&self) -> impl Iterator<Item = &WorkerError> {
        self.reports.iter().filter_map(|r| r.outcome.as_ref().err())
    }

    /// Applies the connect-failure policy. Command errors never fail a run.
    pub fn check(&self, policy: ConnectFailure) -> Result<(), RunError> {
        let failed = self.connect_failures();
        match policy {
            ConnectFailure::Abort if failed > 0 => Err(RunError::Connect {
                failed,
                total: self.reports.len(),
            }),
            _ => Ok(()),
        }
    }
}

/// Spawns `config.parallel` workers and waits for all of them.
pub async fn run<K: Connector>(config: Arc<Config>, connector: Arc<K>) -> RunSummary {
    let started = Instant::now();
    let mut tasks = Vec::with_capacity(config.parallel);

    for worker in 0..config.parallel {
        let config = Arc::clone(&config);
        let connector = Arc::clone(&connector);
        tasks.push(task::spawn(async move {
            run_worker(worker, &config, connector.as_ref()).await
        }));
    }

    let mut reports = Vec::with_capacity(tasks.len());
    for (worker, t) in tasks.into_iter().enumerate() {
        match t.await {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!(batch = %config.batch, worker, error = %e, "worker task aborted");
                reports.push(WorkerReport {
                    worker,
                    ops: Vec::new(),
                    elapsed: started.elapsed(),
                    outcome: Err(WorkerError::Join {
                        worker,
                        reason: e.to_string(),
                    }),
                });
            }
        }
    }

    RunSummary {
        reports,
        elapsed: started.elapsed(),
    }
}

async fn run_worker<K: Connector>(worker: usize, config: &Config, connector: &K) -> WorkerReport {
    let started = Instant::now();
    let mut ops = Vec::with_capacity(config.commands.len());

    let outcome = drive(worker, config, connector, &mut ops).await;
    let elapsed = started.elapsed();

    match &outcome {
        Ok(()) => info!(
            batch = %config.batch,
            worker,
            elapsed = %Elapsed(elapsed),
            "worker done"
        ),
        Err(e) => error!(
            batch = %config.batch,
            worker,
            elapsed = %Elapsed(elapsed),
            error = %e,
            "worker failed"
        ),
    }

    WorkerReport {
        worker,
        ops,
        elapsed,
        outcome,
    }
}

async fn drive<K: Connector>(
    worker: usize,
    config: &Config,
    connector: &K,
    ops: &mut Vec<(Command, u64)>,
) -> Result<(), WorkerError> {
    let mut conn = connector
        .connect(worker)
        .await
        .map_err(|source| WorkerError::Connect { worker, source })?;
    info!(batch = %config.batch, worker, "connected");

    // Commands run back to back on the same connection, never interleaved.
    for &command in &config.commands {
        match executor::execute(command, worker, config, &mut conn).await {
            Ok(n) => ops.push((command, n)),
            Err(source) => {
                ops.push((command, source.completed));
                return Err(WorkerError::Command { worker, source });
            }
        }
    }
    Ok(())
}
