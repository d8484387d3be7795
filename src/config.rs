use std::fmt;

use chrono::{DateTime, Local};
use clap::{ArgAction, Parser, ValueEnum};
use thiserror::Error;
use uuid::Uuid;

use crate::command::{Command, UnknownCommand};

pub const MAX_PARALLEL: i64 = 100;
/// Largest value a Redis string can hold (512 MiB).
pub const MAX_VALUE_LEN: i64 = 512 * 1024 * 1024;

/// What the run does once a worker fails to open its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConnectFailure {
    /// Report the run as failed and exit non-zero.
    Abort,
    /// Keep the surviving workers' results and exit normally.
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None, disable_help_flag = true)]
pub struct Args {
    #[arg(short = 'h', long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(short, long, default_value_t = 6379, allow_negative_numbers = true)]
    pub port: i64,

    #[arg(
        short,
        long,
        env = "WRITE_BENCH_AUTH",
        default_value = "",
        hide_env_values = true
    )]
    pub auth: String,

    /// Key prefix, defaults to `<timestamp>_<random>_`
    #[arg(long)]
    pub prefix: Option<String>,

    /// Comma-separated list of SET, HSET, LPUSH, SADD, ZADD
    #[arg(short, long, default_value = "SET")]
    pub commands: String,

    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub parallel: i64,

    /// Writes per command per worker
    #[arg(short, long, default_value_t = 10_000, allow_negative_numbers = true)]
    pub num: i64,

    #[arg(long = "len", default_value_t = 32, allow_negative_numbers = true)]
    pub value_len: i64,

    /// First iteration index for SET and HSET keys
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub key_from: i64,

    #[arg(long, default_value_t = 50_000, allow_negative_numbers = true)]
    pub progress_every: i64,

    #[arg(long, value_enum, default_value_t = ConnectFailure::Abort)]
    pub on_connect_error: ConnectFailure,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("host should not be empty")]
    EmptyHost,
    #[error("port should be in 1..=65535, got {0}")]
    Port(i64),
    #[error(transparent)]
    Command(#[from] UnknownCommand),
    #[error("parallel should be in 1..=100, got {0}")]
    Parallel(i64),
    #[error("num should be > 0, got {0}")]
    Num(i64),
    #[error("len should be in 1..=536870912, got {0}")]
    ValueLen(i64),
    #[error("key-from should be > 0, got {0}")]
    KeyFrom(i64),
    #[error("progress-every should be > 0, got {0}")]
    ProgressEvery(i64),
}

/// Validated run parameters, shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub auth: Option<String>,
    pub key_prefix: String,
    pub commands: Vec<Command>,
    pub parallel: usize,
    pub num: u64,
    pub key_from: u64,
    pub progress_every: u64,
    pub on_connect_error: ConnectFailure,
    /// Filler written by every operation.
    pub value: String,
    /// Label carried by every log line of this run.
    pub batch: String,
}

impl Args {
    /// Checks every parameter before anything touches the network.
    pub fn validate(self, started: DateTime<Local>) -> Result<Config, ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        let port = u16::try_from(self.port)
            .ok()
            .filter(|p| *p > 0)
            .ok_or(ConfigError::Port(self.port))?;
        let commands = self
            .commands
            .split(',')
            .map(str::parse)
            .collect::<Result<Vec<Command>, _>>()?;
        if !(1..=MAX_PARALLEL).contains(&self.parallel) {
            return Err(ConfigError::Parallel(self.parallel));
        }
        let num = positive(self.num).ok_or(ConfigError::Num(self.num))?;
        let value_len = usize::try_from(self.value_len)
            .ok()
            .filter(|l| *l > 0 && self.value_len <= MAX_VALUE_LEN)
            .ok_or(ConfigError::ValueLen(self.value_len))?;
        let key_from = positive(self.key_from).ok_or(ConfigError::KeyFrom(self.key_from))?;
        let progress_every =
            positive(self.progress_every).ok_or(ConfigError::ProgressEvery(self.progress_every))?;

        let key_prefix = self.prefix.unwrap_or_else(|| default_prefix(started));
        let batch = format!("{}=={}", started.format("%Y-%m-%d-%H:%M:%S"), key_prefix);

        Ok(Config {
            host: self.host,
            port,
            auth: Some(self.auth).filter(|a| !a.is_empty()),
            key_prefix,
            commands,
            parallel: self.parallel as usize,
            num,
            key_from,
            progress_every,
            on_connect_error: self.on_connect_error,
            value: "x".repeat(value_len),
            batch,
        })
    }
}

fn positive(v: i64) -> Option<u64> {
    u64::try_from(v).ok().filter(|v| *v > 0)
}

fn default_prefix(started: DateTime<Local>) -> String {
    let id = Uuid::new_v4().to_string();
    format!("{}_{}_", started.format("%Y%m%d%H%M%S"), &id[..5])
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let commands: Vec<&str> = self.commands.iter().map(|c| c.name()).collect();
        write!(
            f,
            "batch={} || host={} || port={} || keyPrefix={} || commands={} || parallel={} || num={} || len={} || keyFrom={}",
            self.batch,
            self.host,
            self.port,
            self.key_prefix,
            commands.join(","),
            self.parallel,
            self.num,
            self.value.len(),
            self.key_from,
        )
    }
}
