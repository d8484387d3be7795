use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use thiserror::Error;

/// A write command the driver knows how to issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Set,
    HSet,
    LPush,
    SAdd,
    ZAdd,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown command `{0}`, expected one of {supported}", supported = supported_names())]
pub struct UnknownCommand(pub String);

fn supported_names() -> String {
    let names: Vec<&str> = Command::ALL.iter().map(|c| c.name()).collect();
    names.join(", ")
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::Set,
        Command::HSet,
        Command::LPush,
        Command::SAdd,
        Command::ZAdd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::Set => "SET",
            Command::HSet => "HSET",
            Command::LPush => "LPUSH",
            Command::SAdd => "SADD",
            Command::ZAdd => "ZADD",
        }
    }

    /// Trailing component of every key this command writes.
    pub fn key_suffix(self) -> &'static str {
        match self {
            Command::Set => "set",
            Command::HSet => "hset",
            Command::LPush => "lpush",
            Command::SAdd => "sadd",
            Command::ZAdd => "zadd",
        }
    }

    /// Iteration indices for `num` writes. SET and HSET are shifted by
    /// `key_from`; the collection commands always count from zero.
    pub fn iterations(self, num: u64, key_from: u64) -> Range<u64> {
        match self {
            Command::Set | Command::HSet => key_from..key_from + num,
            Command::LPush | Command::SAdd | Command::ZAdd => 0..num,
        }
    }

    pub fn key(self, prefix: &str, worker: usize, iteration: u64) -> String {
        format!("{}_{}_{}_{}", prefix, worker, iteration, self.key_suffix())
    }

    /// Builds the store command for one write.
    pub fn to_cmd(self, key: &str, iteration: u64, value: &str) -> redis::Cmd {
        let mut cmd = redis::cmd(self.name());
        match self {
            Command::Set => {
                cmd.arg(key).arg(value);
            }
            Command::HSet => {
                cmd.arg(key).arg(iteration).arg(value);
            }
            Command::LPush | Command::SAdd => {
                cmd.arg(key).arg(value).arg(1).arg(2).arg(3);
            }
            Command::ZAdd => {
                cmd.arg(key).arg(1).arg(value);
            }
        }
        cmd
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SET" => Ok(Command::Set),
            "HSET" => Ok(Command::HSet),
            "LPUSH" => Ok(Command::LPush),
            "SADD" => Ok(Command::SAdd),
            "ZADD" => Ok(Command::ZAdd),
            _ => Err(UnknownCommand(s.to_string())),
        }
    }
}
