//! Connection seam between the workers and the target store.
//!
//! Workers only see [`Connector`] and [`Connection`]; the production pair
//! wraps `redis::Client`, tests plug in an in-memory recorder.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo, RedisResult};

use crate::command::Command;
use crate::config::Config;

/// One write as issued by an executor.
#[derive(Debug, Clone, Copy)]
pub struct WriteOp<'a> {
    pub command: Command,
    pub key: &'a str,
    pub iteration: u64,
    pub value: &'a str,
}

/// Opens one dedicated connection per worker.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Conn: Connection;

    async fn connect(&self, worker: usize) -> RedisResult<Self::Conn>;
}

#[async_trait]
pub trait Connection: Send {
    async fn write(&mut self, op: &WriteOp<'_>) -> RedisResult<()>;
}

pub struct RedisConnector {
    client: redis::Client,
}

impl RedisConnector {
    pub fn new(config: &Config) -> RedisResult<Self> {
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(config.host.clone(), config.port),
            redis: RedisConnectionInfo {
                password: config.auth.clone(),
                ..Default::default()
            },
        };
        Ok(Self {
            client: redis::Client::open(info)?,
        })
    }
}

#[async_trait]
impl Connector for RedisConnector {
    type Conn = RedisConnection;

    async fn connect(&self, _worker: usize) -> RedisResult<RedisConnection> {
        // Each call dials a fresh socket, never shared between workers.
        let con = self.client.get_multiplexed_async_connection().await?;
        Ok(RedisConnection { con })
    }
}

pub struct RedisConnection {
    con: MultiplexedConnection,
}

#[async_trait]
impl Connection for RedisConnection {
    async fn write(&mut self, op: &WriteOp<'_>) -> RedisResult<()> {
        let cmd = op.command.to_cmd(op.key, op.iteration, op.value);
        let _: redis::Value = cmd.query_async(&mut self.con).await?;
        Ok(())
    }
}
