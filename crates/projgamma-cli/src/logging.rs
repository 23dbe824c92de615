//! Logging setup.
//!
//! Console output goes to stderr so tables and records printed on stdout
//! stay clean. The filter comes from `PROJGAMMA_LOG`, then `RUST_LOG`, then
//! the `-v` count.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Logging options from the command line.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Number of `-v` flags.
    pub verbosity: u8,
    /// Also write the log to this file.
    pub file: Option<PathBuf>,
}

impl LogConfig {
    /// Filter used when no environment variable is set.
    pub fn default_level(&self) -> &'static str {
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Installs the global subscriber.
///
/// Keep the returned guard alive until exit, it flushes the log file.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_env("PROJGAMMA_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(config.default_level()));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();
    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    match &config.file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let file_layer = fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_ansi(false);
            subscriber.with(file_layer).init();
            Ok(Some(guard))
        }
        None => {
            subscriber.init();
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        let mut config = LogConfig::default();
        assert_eq!(config.default_level(), "info");
        config.verbosity = 1;
        assert_eq!(config.default_level(), "debug");
        config.verbosity = 4;
        assert_eq!(config.default_level(), "trace");
    }
}
