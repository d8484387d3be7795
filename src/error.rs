use redis::RedisError;
use thiserror::Error;

use crate::command::Command;

/// A write rejected by the store, with how far the executor got.
#[derive(Debug, Error)]
#[error("{command} failed at iteration {iteration} after {completed} writes: {source}")]
pub struct CommandError {
    pub command: Command,
    pub iteration: u64,
    pub completed: u64,
    #[source]
    pub source: RedisError,
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("worker {worker} failed to connect: {source}")]
    Connect {
        worker: usize,
        #[source]
        source: RedisError,
    },
    #[error("worker {worker}: {source}")]
    Command {
        worker: usize,
        #[source]
        source: CommandError,
    },
    #[error("worker {worker} did not finish: {reason}")]
    Join { worker: usize, reason: String },
}

impl WorkerError {
    pub fn is_connect(&self) -> bool {
        matches!(self, WorkerError::Connect { .. })
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("{failed} of {total} workers could not connect")]
    Connect { failed: usize, total: usize },
}
