use std::time::Instant;

use tracing::{error, info};

use crate::command::Command;
use crate::config::Config;
use crate::error::CommandError;
use crate::store::{Connection, WriteOp};
use crate::timing::Elapsed;

/// Issues `config.num` writes of one command kind on `conn`, stopping at the
/// first failure. Returns the number of writes performed.
pub async fn execute<C: Connection>(
    command: Command,
    worker: usize,
    config: &Config,
    conn: &mut C,
) -> Result<u64, CommandError> {
    let started = Instant::now();
    let mut completed = 0;

    for iteration in command.iterations(config.num, config.key_from) {
        let key = command.key(&config.key_prefix, worker, iteration);
        let op = WriteOp {
            command,
            key: &key,
            iteration,
            value: &config.value,
        };

        if let Err(source) = conn.write(&op).await {
            error!(
                batch = %config.batch,
                worker,
                %command,
                iteration,
                completed,
                error = %source,
                "write failed"
            );
            return Err(CommandError {
                command,
                iteration,
                completed,
                source,
            });
        }
        completed += 1;

        if iteration % config.progress_every == 0 {
            info!(
                batch = %config.batch,
                worker,
                %command,
                iteration,
                %key,
                elapsed = %Elapsed(started.elapsed()),
                "progress"
            );
        }
    }

    info!(
        batch = %config.batch,
        worker,
        %command,
        num = completed,
        elapsed = %Elapsed(started.elapsed()),
        "command done"
    );
    Ok(completed)
}
