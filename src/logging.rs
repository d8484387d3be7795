//! Tracing subscriber setup.

use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LogFormat;

pub struct LogConfig {
    /// Default level when RUST_LOG is unset
    pub level: Level,
    pub format: LogFormat,
}

impl LogConfig {
    pub fn new(format: LogFormat) -> Self {
        Self {
            level: Level::INFO,
            format,
        }
    }

    /// Installs the global subscriber, writing to stderr.
    pub fn init(self) -> anyhow::Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_string()));

        tracing_subscriber::registry()
            .with(filter)
            .with(self.layer(std::io::stderr))
            .try_init()?;
        Ok(())
    }

    /// Formatting layer for the configured format, writing to `writer`.
    pub fn layer<S, W>(&self, writer: W) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        match self.format {
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(false)
                .boxed(),
            LogFormat::Text => fmt::layer()
                .with_writer(writer)
                .with_target(false)
                .boxed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(format: LogFormat) -> String {
        let buffer = Buffer::default();
        let sink = buffer.clone();
        let subscriber = tracing_subscriber::registry()
            .with(LogConfig::new(format).layer(move || sink.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(worker = 3, command = "SET", "worker done");
        });

        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn json_lines_carry_fields() {
        let out = capture(LogFormat::Json);
        let line = out.trim();

        assert!(line.starts_with('{') && line.ends_with('}'));
        assert!(line.contains(r#""level":"INFO""#));
        assert!(line.contains(r#""message":"worker done""#));
        assert!(line.contains(r#""worker":3"#));
        assert!(line.contains(r#""command":"SET""#));
        assert!(!line.contains("write_bench::logging"));
    }

    #[test]
    fn text_lines_carry_message() {
        let out = capture(LogFormat::Text);
        assert!(out.contains("INFO"));
        assert!(out.contains("worker done"));
        assert!(!out.trim_start().starts_with('{'));
    }
}
