//! Tracing subscriber setup for the terminal driver.
//!
//! `RUST_LOG` always wins. Without it the quiz crates log at `warn`, or at
//! `debug` when `--verbose` is passed.

use std::io;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const QUIZ_TARGETS: [&str; 4] = ["flip", "flip_core", "services", "storage"];

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            with_target: false,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Self {
                level: Level::DEBUG,
                with_target: true,
            }
        } else {
            Self::default()
        }
    }
}

/// Install the global subscriber. Log lines go to stderr so they never mix
/// with the quiz itself on stdout.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(config.with_target)
        .without_time();

    tracing_subscriber::registry()
        .with(build_env_filter(config.level))
        .with(layer)
        .try_init()
        .map_err(io::Error::other)
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.as_str().to_lowercase();
        let directives = QUIZ_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",");
        EnvFilter::new(format!("warn,{directives}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_level_to_debug() {
        assert_eq!(LogConfig::from_verbose(false).level, Level::WARN);
        assert_eq!(LogConfig::from_verbose(true).level, Level::DEBUG);
    }
}
