//! Structured logging setup.
//!
//! Events are emitted with `tracing` throughout the crate and formatted by
//! `tracing-subscriber`, as JSON for production or pretty-printed for
//! development. `RUST_LOG` takes precedence over `KENNEL_LOG_LEVEL`.
//!
//! | Variable | Values | Default |
//! |---|---|---|
//! | `KENNEL_LOG_LEVEL` | trace/debug/info/warn/error | `info` |
//! | `KENNEL_LOG_FORMAT` | json/pretty | `json` |
//! | `KENNEL_LOG_ASYNC` | true/false | `true` |
//! | `KENNEL_LOG_TARGET_FILTER` | comma-separated directives | none |
//! | `KENNEL_LOG_INCLUDE_LOCATION` | true/false | `false` |

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub log_level: String,
    pub format: LogFormat,
    /// Write through a background thread instead of blocking on stdout.
    pub async_logging: bool,
    pub target_filter: Option<String>,
    /// Include file and line in each event.
    pub include_location: bool,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };
        Self {
            log_level: lookup("KENNEL_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            format: LogFormat::parse(&lookup("KENNEL_LOG_FORMAT").unwrap_or_default()),
            async_logging: flag("KENNEL_LOG_ASYNC", true),
            target_filter: lookup("KENNEL_LOG_TARGET_FILTER"),
            include_location: flag("KENNEL_LOG_INCLUDE_LOCATION", false),
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));
        // may_minihttp logs every client disconnect at info.
        filter = filter.add_directive(
            "may_minihttp=warn"
                .parse()
                .context("Invalid may_minihttp directive")?,
        );
        if let Some(targets) = &self.target_filter {
            for directive in targets.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                filter = filter.add_directive(
                    directive
                        .parse()
                        .with_context(|| format!("Invalid log filter directive: {directive}"))?,
                );
            }
        }
        Ok(filter)
    }
}

/// Keeps the background log writer alive. Dropping it flushes pending events.
#[must_use = "dropping the guard stops asynchronous log output"]
pub struct LoggingGuard {
    _worker: Option<WorkerGuard>,
}

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// Fails on an invalid filter directive or when a global subscriber is
/// already installed.
pub fn init_logging_with_config(config: &LogConfig) -> Result<LoggingGuard> {
    let (writer, worker) = if config.async_logging {
        let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(non_blocking), Some(guard))
    } else {
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stdout), None)
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter()?)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(LoggingGuard { _worker: worker })
}
