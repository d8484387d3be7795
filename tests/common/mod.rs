//! In-memory store shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Local;
use clap::Parser;
use redis::{ErrorKind, RedisResult};

use write_bench::command::Command;
use write_bench::config::{Args, Config};
use write_bench::pool;
use write_bench::store::{Connection, Connector, WriteOp};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Write {
    pub worker: usize,
    pub command: Command,
    pub key: String,
}

#[derive(Default)]
pub struct Recorder {
    pub connects: AtomicUsize,
    pub writes: Mutex<Vec<Write>>,
    pub refuse: HashSet<usize>,
    /// worker -> number of successful writes before every later write fails
    pub fail_after: HashMap<usize, u64>,
}

pub struct MemoryConnector(pub Arc<Recorder>);

pub struct MemoryConnection {
    worker: usize,
    done: u64,
    recorder: Arc<Recorder>,
}

#[async_trait]
impl Connector for MemoryConnector {
    type Conn = MemoryConnection;

    async fn connect(&self, worker: usize) -> RedisResult<MemoryConnection> {
        self.0.connects.fetch_add(1, Ordering::SeqCst);
        if self.0.refuse.contains(&worker) {
            return Err((ErrorKind::IoError, "connection refused").into());
        }
        Ok(MemoryConnection {
            worker,
            done: 0,
            recorder: Arc::clone(&self.0),
        })
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn write(&mut self, op: &WriteOp<'_>) -> RedisResult<()> {
        if let Some(&limit) = self.recorder.fail_after.get(&self.worker) {
            if self.done >= limit {
                return Err((ErrorKind::ResponseError, "simulated failure").into());
            }
        }
        self.done += 1;
        self.recorder.writes.lock().unwrap().push(Write {
            worker: self.worker,
            command: op.command,
            key: op.key.to_string(),
        });
        Ok(())
    }
}

pub fn config(extra: &[&str]) -> Arc<Config> {
    let argv = ["write-bench", "--prefix", "bench"]
        .into_iter()
        .chain(extra.iter().copied());
    Arc::new(
        Args::try_parse_from(argv)
            .unwrap()
            .validate(Local::now())
            .unwrap(),
    )
}

pub async fn run_pool(config: &Arc<Config>, recorder: Recorder) -> (Arc<Recorder>, pool::RunSummary) {
    let recorder = Arc::new(recorder);
    let connector = Arc::new(MemoryConnector(Arc::clone(&recorder)));
    let summary = pool::run(Arc::clone(config), connector).await;
    (recorder, summary)
}
